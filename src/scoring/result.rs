use serde::Serialize;

use super::category::{dimension_interpretation, CategoryBands, Dimension, RiskCategory};
use super::trend::{TrendClassification, TrendResult};
use crate::vendor::AwardType;

/// One input's contribution to a dimension score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreComponent {
    pub label: String,                // e.g. "Altman_Z", "Agency Count"
    pub value: Option<f64>,           // Input value as scored, when there is one
    pub score: f64,                   // Band or lookup score for the input
    pub weight: f64,                  // Weight applied in the dimension's sum
    pub description: String,          // e.g. "2 cancellations -> 10"
}

impl ScoreComponent {
    pub fn new(label: impl Into<String>, value: Option<f64>, score: f64, weight: f64) -> Self {
        Self {
            label: label.into(),
            value,
            score,
            weight,
            description: String::new(),
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Score for a single risk dimension.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreResult {
    pub dimension: Dimension,
    pub score: f64,
    pub category: RiskCategory,
    pub interpretation: &'static str,
    pub components: Vec<ScoreComponent>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub trends: Vec<TrendResult>,
    pub detail: ScoreDetail,
}

impl ScoreResult {
    /// Round `score` to 2 decimals and attach its category and interpretation.
    pub fn new(
        dimension: Dimension,
        score: f64,
        bands: &CategoryBands,
        components: Vec<ScoreComponent>,
        detail: ScoreDetail,
    ) -> Self {
        let score = round2(score);
        let category = bands.categorize(score);
        Self {
            dimension,
            score,
            category,
            interpretation: dimension_interpretation(dimension, category),
            components,
            trends: Vec::new(),
            detail,
        }
    }

    pub fn with_trends(mut self, trends: Vec<TrendResult>) -> Self {
        self.trends = trends;
        self
    }
}

/// Dimension-specific intermediate values, kept for reporting.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ScoreDetail {
    Financial {
        point_in_time_score: f64,
        trend_score: f64,
        has_history: bool,
    },
    PastPerformance {
        total_cancellations: i64,
    },
    FederalContract {
        average_award_score: f64,
        awards: Vec<AwardScore>,
        competition_percentage: f64,
        /// Set only when the percentage was recomputed from competition codes
        non_competitive_awards: Option<usize>,
        total_awards: usize,
    },
    ForeignLabor {
        current_year_score: f64,
        trend_score: f64,
        countries: Vec<CountryScore>,
        certified_trend: Option<TrendClassification>,
        denied_withdrawn_trend: Option<TrendClassification>,
    },
    Sanctions {
        total_violations: u64,
        entries: Vec<SanctionEntry>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AwardScore {
    pub award_type: AwardType,
    pub amount: f64,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryScore {
    pub country: String,
    pub multiplier: f64,
    pub job_sensitivity_score: f64,
    pub visa_score: f64,
    pub adjusted_visa_score: f64,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SanctionEntry {
    /// First 100 characters of the narrative
    pub sample: String,
    pub violations: u64,
}

/// Round half away from zero to 2 decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
