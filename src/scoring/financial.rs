use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use super::category::{CategoryBands, Dimension};
use super::config::FinancialConfig;
use super::result::{ScoreComponent, ScoreDetail, ScoreResult};
use super::trend::TrendAnalyzer;
use crate::vendor::{value_as_f64, VendorRecord};

/// The five financial ratios scored for stability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
pub enum FinancialMetric {
    #[serde(rename = "Altman_Z")]
    AltmanZ,
    #[serde(rename = "DTE")]
    DebtToEquity,
    #[serde(rename = "DTI")]
    DebtToIncome,
    #[serde(rename = "ROA")]
    ReturnOnAssets,
    #[serde(rename = "ROE")]
    ReturnOnEquity,
}

impl FinancialMetric {
    pub const ALL: [FinancialMetric; 5] = [
        FinancialMetric::AltmanZ,
        FinancialMetric::DebtToEquity,
        FinancialMetric::DebtToIncome,
        FinancialMetric::ReturnOnAssets,
        FinancialMetric::ReturnOnEquity,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            FinancialMetric::AltmanZ => "Altman_Z",
            FinancialMetric::DebtToEquity => "DTE",
            FinancialMetric::DebtToIncome => "DTI",
            FinancialMetric::ReturnOnAssets => "ROA",
            FinancialMetric::ReturnOnEquity => "ROE",
        }
    }

    /// Column name used by spreadsheet exports of historical data.
    pub fn long_name(&self) -> &'static str {
        match self {
            FinancialMetric::AltmanZ => "Altman Z-Score",
            FinancialMetric::DebtToEquity => "Debt-to-Equity Ratio",
            FinancialMetric::DebtToIncome => "Debt-to-Income Ratio",
            FinancialMetric::ReturnOnAssets => "Return on Assets",
            FinancialMetric::ReturnOnEquity => "Return on Equity",
        }
    }

    /// Match either the short key or the long column name.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|m| m.key().eq_ignore_ascii_case(name) || m.long_name().eq_ignore_ascii_case(name))
    }

    /// Current value from the vendor record.
    pub fn value(&self, vendor: &VendorRecord) -> Option<f64> {
        match self {
            FinancialMetric::AltmanZ => vendor.altman_z,
            FinancialMetric::DebtToEquity => vendor.dte,
            FinancialMetric::DebtToIncome => vendor.dti,
            FinancialMetric::ReturnOnAssets => vendor.roa,
            FinancialMetric::ReturnOnEquity => vendor.roe,
        }
    }
}

/// Yearly values per metric, in no particular order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricSeries {
    pub years: Vec<i32>,
    pub values: Vec<f64>,
}

/// Build per-metric series from `historical_financial` (year -> metric -> value).
///
/// Unparsable years, non-object rows, unknown metric names and non-numeric
/// values are skipped individually.
pub fn historical_series(
    history: &BTreeMap<String, Value>,
) -> BTreeMap<FinancialMetric, MetricSeries> {
    let mut series: BTreeMap<FinancialMetric, MetricSeries> = BTreeMap::new();

    for (year_key, row) in history {
        let Ok(year) = year_key.trim().parse::<i32>() else {
            tracing::warn!(year = %year_key, "skipping historical financial row with unparsable year");
            continue;
        };
        let Some(metrics) = row.as_object() else {
            tracing::warn!(year, "skipping historical financial row that is not an object");
            continue;
        };

        for (name, raw) in metrics {
            let Some(metric) = FinancialMetric::from_name(name) else {
                continue;
            };
            match value_as_f64(raw) {
                Some(value) => {
                    let entry = series.entry(metric).or_default();
                    entry.years.push(year);
                    entry.values.push(value);
                }
                None => {
                    tracing::warn!(year, metric = metric.key(), "skipping non-numeric historical value");
                }
            }
        }
    }

    series
}

/// Financial stability: point-in-time ratio bands blended with ratio trends.
#[derive(Debug, Clone, Default)]
pub struct FinancialScorer {
    config: FinancialConfig,
    analyzer: TrendAnalyzer,
    categories: CategoryBands,
}

impl FinancialScorer {
    pub fn new(config: FinancialConfig, analyzer: TrendAnalyzer, categories: CategoryBands) -> Self {
        Self {
            config,
            analyzer,
            categories,
        }
    }

    pub fn score(&self, vendor: &VendorRecord) -> ScoreResult {
        let mut components = Vec::with_capacity(self.config.metrics.len());
        let mut weighted = 0.0;
        let mut weight_sum = 0.0;

        for rule in &self.config.metrics {
            let raw = rule.metric.value(vendor);
            let value = raw.unwrap_or(0.0);
            let score = rule.bands.score(value);
            weighted += score * rule.weight;
            weight_sum += rule.weight;

            let description = match raw {
                Some(_) => format!("{} = {} -> {}", rule.metric.long_name(), value, score),
                None => format!("{} missing, scored as 0 -> {}", rule.metric.long_name(), score),
            };
            components.push(
                ScoreComponent::new(rule.metric.key(), Some(value), score, rule.weight)
                    .describe(description),
            );
        }

        let point_in_time = if weight_sum > 0.0 {
            weighted / weight_sum
        } else {
            0.0
        };

        let series = historical_series(&vendor.historical_financial);
        let has_history = !series.is_empty();
        let mut trends = Vec::new();

        let trend_score = if has_history {
            let mut weighted = 0.0;
            let mut weight_sum = 0.0;
            for rule in &self.config.metrics {
                let data = series.get(&rule.metric).cloned().unwrap_or_default();
                let trend =
                    self.analyzer
                        .analyze(rule.metric.key(), &data.years, &data.values, &rule.trend);
                let clamped = trend
                    .score
                    .clamp(self.config.trend_score_min, self.config.trend_score_max);
                weighted += clamped * rule.weight;
                weight_sum += rule.weight;
                trends.push(trend);
            }
            if weight_sum > 0.0 {
                weighted / weight_sum
            } else {
                self.config.neutral_trend_score
            }
        } else {
            self.config.neutral_trend_score
        };

        let score =
            self.config.point_in_time_weight * point_in_time + self.config.trend_weight * trend_score;

        tracing::debug!(
            vendor = vendor.display_name(),
            point_in_time,
            trend_score,
            score,
            "financial stability scored"
        );

        ScoreResult::new(
            Dimension::FinancialStability,
            score,
            &self.categories,
            components,
            ScoreDetail::Financial {
                point_in_time_score: point_in_time,
                trend_score,
                has_history,
            },
        )
        .with_trends(trends)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::trend::TrendClassification;
    use serde_json::json;

    fn vendor(altman_z: f64, dte: f64, dti: f64, roa: f64, roe: f64) -> VendorRecord {
        VendorRecord {
            altman_z: Some(altman_z),
            dte: Some(dte),
            dti: Some(dti),
            roa: Some(roa),
            roe: Some(roe),
            ..Default::default()
        }
    }

    fn history(value: serde_json::Value) -> BTreeMap<String, Value> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_point_in_time_without_history_uses_neutral_trend() {
        let result = FinancialScorer::default().score(&vendor(10.0, 0.1, 0.1, 0.2, 0.2));
        // 0.3*1 + 0.2*1 + 0.2*1 + 0.15*5 + 0.15*5 = 2.2; 0.8*2.2 + 0.2*5 = 2.76
        assert_eq!(result.score, 2.76);
        match result.detail {
            ScoreDetail::Financial {
                point_in_time_score,
                trend_score,
                has_history,
            } => {
                assert!((point_in_time_score - 2.2).abs() < 1e-9);
                assert_eq!(trend_score, 5.0);
                assert!(!has_history);
            }
            other => panic!("unexpected detail {other:?}"),
        }
        assert!(result.trends.is_empty());
    }

    #[test]
    fn test_distressed_vendor_scores_high() {
        let result = FinancialScorer::default().score(&vendor(1.0, 4.0, 3.5, -0.8, -0.6));
        // Every ratio in its worst band: 10 point-in-time
        assert_eq!(result.score, 9.0);
        assert_eq!(result.category, crate::scoring::RiskCategory::Severe);
    }

    #[test]
    fn test_missing_ratios_default_to_zero() {
        let result = FinancialScorer::default().score(&VendorRecord::default());
        // Altman_Z 0 -> 10, debt ratios 0 -> 1, returns 0 -> 5
        // 3.0 + 0.2 + 0.2 + 0.75 + 0.75 = 4.9; 0.8*4.9 + 1.0 = 4.92
        assert_eq!(result.score, 4.92);
        assert!(result.components[0].description.contains("missing"));
    }

    #[test]
    fn test_improving_history_lowers_score() {
        let mut record = vendor(10.0, 0.1, 0.1, 0.2, 0.2);
        record.historical_financial = history(json!({
            "2020": {"Altman_Z": 6.0, "DTE": 0.4, "DTI": 0.4, "ROA": 0.10, "ROE": 0.10},
            "2021": {"Altman_Z": 7.5, "DTE": 0.3, "DTI": 0.3, "ROA": 0.14, "ROE": 0.14},
            "2022": {"Altman_Z": 9.0, "DTE": 0.2, "DTI": 0.2, "ROA": 0.17, "ROE": 0.17},
            "2023": {"Altman_Z": 10.0, "DTE": 0.1, "DTI": 0.1, "ROA": 0.20, "ROE": 0.20}
        }));

        let result = FinancialScorer::default().score(&record);
        assert_eq!(result.trends.len(), 5);
        assert!(result
            .trends
            .iter()
            .all(|t| t.classification == TrendClassification::Improving));
        // 0.8*2.2 + 0.2*2 = 2.16
        assert_eq!(result.score, 2.16);
    }

    #[test]
    fn test_metrics_without_history_stay_neutral() {
        let mut record = vendor(10.0, 0.1, 0.1, 0.2, 0.2);
        record.historical_financial = history(json!({
            "2022": {"Return on Assets": 0.10},
            "2023": {"Return on Assets": 0.20}
        }));

        let result = FinancialScorer::default().score(&record);
        let roa = result.trends.iter().find(|t| t.metric == "ROA").unwrap();
        assert_eq!(roa.classification, TrendClassification::Improving);
        let dte = result.trends.iter().find(|t| t.metric == "DTE").unwrap();
        assert_eq!(dte.classification, TrendClassification::Stable);
        // trend = 0.15*2 + 0.85*5 = 4.55; 0.8*2.2 + 0.2*4.55 = 2.67
        assert_eq!(result.score, 2.67);
    }

    #[test]
    fn test_historical_series_skips_malformed_entries() {
        let series = historical_series(&history(json!({
            "2021": {"DTE": "1.5", "Unknown": 3, "ROA": "n/a"},
            "FY22": {"DTE": 1.0},
            "2023": "not a row",
            "2024": {"Debt-to-Equity Ratio": 0.5}
        })));

        let dte = &series[&FinancialMetric::DebtToEquity];
        assert_eq!(dte.years, vec![2021, 2024]);
        assert_eq!(dte.values, vec![1.5, 0.5]);
        assert!(!series.contains_key(&FinancialMetric::ReturnOnAssets));
    }

    #[test]
    fn test_metric_names() {
        assert_eq!(FinancialMetric::from_name("altman_z"), Some(FinancialMetric::AltmanZ));
        assert_eq!(
            FinancialMetric::from_name("Return on Equity"),
            Some(FinancialMetric::ReturnOnEquity)
        );
        assert_eq!(FinancialMetric::from_name("EBITDA"), None);
    }
}
