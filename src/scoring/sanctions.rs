use once_cell::sync::Lazy;
use regex::Regex;

use super::category::{CategoryBands, Dimension};
use super::config::SanctionsConfig;
use super::result::{SanctionEntry, ScoreComponent, ScoreDetail, ScoreResult};
use crate::vendor::VendorRecord;

const SAMPLE_CHARS: usize = 100;

// Applied to lowercased text
static COUNT_PATTERNS: Lazy<[Regex; 3]> = Lazy::new(|| {
    [
        Regex::new(r"([0-9]+)\s+violation").expect("valid regex"),
        Regex::new(r"settle\s+([0-9]+)\s+").expect("valid regex"),
        Regex::new(r"alleged\s+([0-9]+)\s+").expect("valid regex"),
    ]
});

#[derive(Debug, Clone, Default)]
pub struct SanctionsScorer {
    config: SanctionsConfig,
    categories: CategoryBands,
}

impl SanctionsScorer {
    pub fn new(config: SanctionsConfig, categories: CategoryBands) -> Self {
        Self { config, categories }
    }

    /// Number of violations a narrative describes.
    ///
    /// 0 without a violation keyword, otherwise the largest number matched by
    /// any count pattern, or 1 when none matches.
    pub fn extract_violation_count(&self, text: &str) -> u64 {
        let text = text.to_lowercase();
        if !self
            .config
            .keywords
            .iter()
            .any(|keyword| text.contains(&keyword.to_lowercase()))
        {
            return 0;
        }

        COUNT_PATTERNS
            .iter()
            .flat_map(|pattern| pattern.captures_iter(&text))
            .filter_map(|caps| caps.get(1))
            // Only ASCII digits match, so a parse failure means overflow
            .map(|digits| digits.as_str().parse::<u64>().unwrap_or(u64::MAX))
            .max()
            .unwrap_or(1)
    }

    pub fn score(&self, vendor: &VendorRecord) -> ScoreResult {
        self.score_texts(&vendor.sanctions)
    }

    pub fn score_texts(&self, texts: &[String]) -> ScoreResult {
        let mut total: u64 = 0;
        let mut entries = Vec::new();

        for text in texts.iter().filter(|t| !t.trim().is_empty()) {
            let violations = self.extract_violation_count(text);
            total = total.saturating_add(violations);
            if violations > 0 {
                entries.push(SanctionEntry {
                    sample: sample(text),
                    violations,
                });
            }
        }

        let score = self.config.bands.score(total as f64).min(10.0);

        tracing::debug!(total_violations = total, score, "sanctions scored");

        let components = vec![ScoreComponent::new("Violations", Some(total as f64), score, 1.0)
            .describe(format!(
                "Found {} total violations resulting in a score of {}/10",
                total, score
            ))];

        ScoreResult::new(
            Dimension::SanctionsRisk,
            score,
            &self.categories,
            components,
            ScoreDetail::Sanctions {
                total_violations: total,
                entries,
            },
        )
    }
}

fn sample(text: &str) -> String {
    match text.char_indices().nth(SAMPLE_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::category::RiskCategory;

    fn texts(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_extracts_settled_count() {
        let scorer = SanctionsScorer::default();
        assert_eq!(
            scorer.extract_violation_count("Company agreed to settle 40 violations"),
            40
        );
    }

    #[test]
    fn test_numbers_without_keyword_are_ignored() {
        let scorer = SanctionsScorer::default();
        assert_eq!(scorer.extract_violation_count("Paid a $5000 fine in 2019"), 0);
    }

    #[test]
    fn test_keyword_without_number_counts_one() {
        let scorer = SanctionsScorer::default();
        assert_eq!(scorer.extract_violation_count("Cited for VIOLATING export rules"), 1);
    }

    #[test]
    fn test_largest_number_across_patterns_wins() {
        let scorer = SanctionsScorer::default();
        let text = "Alleged 12 counts; found 3 violations of the act";
        assert_eq!(scorer.extract_violation_count(text), 12);
    }

    #[test]
    fn test_oversized_count_saturates() {
        let scorer = SanctionsScorer::default();
        let text = "Agreed to settle 123456789012345678901234567890 violations";
        assert_eq!(scorer.extract_violation_count(text), u64::MAX);

        let result = scorer.score_texts(&texts(&[text, "2 violations"]));
        assert_eq!(result.score, 10.0);
        match result.detail {
            ScoreDetail::Sanctions {
                total_violations, ..
            } => assert_eq!(total_violations, u64::MAX),
            other => panic!("unexpected detail {other:?}"),
        }
    }

    #[test]
    fn test_score_bands() {
        let scorer = SanctionsScorer::default();
        assert_eq!(scorer.score_texts(&[]).score, 0.0);
        assert_eq!(scorer.score_texts(&texts(&["2 violations"])).score, 3.0);
        assert_eq!(scorer.score_texts(&texts(&["2 violations", "3 violations"])).score, 5.0);
        assert_eq!(scorer.score_texts(&texts(&["15 violations"])).score, 7.0);

        let severe = scorer.score_texts(&texts(&["Company agreed to settle 40 violations"]));
        assert_eq!(severe.score, 10.0);
        assert_eq!(severe.category, RiskCategory::Severe);
    }

    #[test]
    fn test_entries_skip_empty_and_clean_texts() {
        let scorer = SanctionsScorer::default();
        let long = format!("{} violation noted", "x".repeat(150));
        let result = scorer.score_texts(&texts(&["", "   ", "No issues found", &long]));
        match result.detail {
            ScoreDetail::Sanctions {
                total_violations,
                entries,
            } => {
                assert_eq!(total_violations, 1);
                assert_eq!(entries.len(), 1);
                assert_eq!(entries[0].sample.chars().count(), SAMPLE_CHARS + 3);
                assert!(entries[0].sample.ends_with("..."));
            }
            other => panic!("unexpected detail {other:?}"),
        }
    }
}
