use std::io::IsTerminal;
use owo_colors::OwoColorize;

use crate::scoring::{AggregateResult, RiskCategory, ScoreResult};

/// Widest vendor name shown in the summary table
const NAME_WIDTH: usize = 40;

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Category label, colored green through red by severity
pub fn format_category(category: RiskCategory, use_colors: bool) -> String {
    let label = category.label();
    if !use_colors {
        return label.to_string();
    }
    match category {
        RiskCategory::VeryLow => label.green().to_string(),
        RiskCategory::Low => label.cyan().to_string(),
        RiskCategory::Moderate => label.yellow().to_string(),
        RiskCategory::High => label.red().to_string(),
        RiskCategory::Severe => label.red().bold().to_string(),
    }
}

/// Truncate a name to `max_width` characters, accounting for Unicode
fn truncate_name(name: &str, max_width: usize) -> String {
    let chars: Vec<char> = name.chars().collect();
    if chars.len() <= max_width {
        name.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

/// One line per vendor: index, VRRS, category, name
pub fn format_summary_table(results: &[AggregateResult], use_colors: bool) -> String {
    if results.is_empty() {
        return "No vendors scored.".to_string();
    }

    results
        .iter()
        .enumerate()
        .map(|(idx, result)| {
            let index_str = format!("{:>2}.", idx + 1);
            let score_str = format!("{:>5.2}", result.vrrs_score);
            // Pad before coloring so escape codes don't break alignment
            let category = format!("{:<13}", result.risk_category.label());
            let name = truncate_name(&result.vendor_name, NAME_WIDTH);

            if use_colors {
                let category = match result.risk_category {
                    RiskCategory::VeryLow => category.green().to_string(),
                    RiskCategory::Low => category.cyan().to_string(),
                    RiskCategory::Moderate => category.yellow().to_string(),
                    RiskCategory::High | RiskCategory::Severe => category.red().to_string(),
                };
                format!("{} {}  {}  {}", index_str.dimmed(), score_str.bold(), category, name)
            } else {
                format!("{} {}  {}  {}", index_str, score_str, category, name)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_dimension(result: &ScoreResult, weight: f64, use_colors: bool) -> String {
    let mut lines = vec![format!(
        "  {:<20} {:>5.2}  (weight {:.2})  {}",
        result.dimension.title(),
        result.score,
        weight,
        format_category(result.category, use_colors)
    )];

    for component in &result.components {
        if component.description.is_empty() {
            lines.push(format!("      {}: {:.2}", component.label, component.score));
        } else {
            lines.push(format!(
                "      {}: {:.2}  {}",
                component.label, component.score, component.description
            ));
        }
    }

    for trend in &result.trends {
        lines.push(format!(
            "      trend {}: {} (slope {:.4}, p {:.3}, {} points)",
            trend.metric,
            trend.classification.as_str(),
            trend.slope,
            trend.p_value,
            trend.data_points
        ));
    }

    lines.join("\n")
}

/// Full multi-line report for one vendor
pub fn format_report(result: &AggregateResult, use_colors: bool) -> String {
    let header = if use_colors {
        format!(
            "{}\n  VRRS: {}  {}",
            result.vendor_name.bold(),
            format!("{:.2}", result.vrrs_score).bold(),
            format_category(result.risk_category, use_colors)
        )
    } else {
        format!(
            "{}\n  VRRS: {:.2}  {}",
            result.vendor_name,
            result.vrrs_score,
            result.risk_category.label()
        )
    };

    let dimensions = result
        .dimensions
        .iter()
        .map(|d| format_dimension(d, result.weights_used.get(d.dimension), use_colors))
        .collect::<Vec<_>>()
        .join("\n");

    let interpretation = result
        .interpretation
        .lines()
        .map(|line| format!("  {}", line.replace("**", "")).trim_end().to_string())
        .collect::<Vec<_>>()
        .join("\n");

    format!("{}\n\n{}\n\n{}", header, dimensions, interpretation)
}

/// Format results as tab-separated values for scripting
/// Columns: vrrs, category, vendor (no headers, no colors)
pub fn format_tsv(results: &[AggregateResult]) -> String {
    results
        .iter()
        .map(|r| format!("{:.2}\t{}\t{}", r.vrrs_score, r.risk_category.label(), r.vendor_name))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Pretty JSON array of results
pub fn format_json(results: &[AggregateResult]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(results)
}
