use serde::{Deserialize, Serialize};

use super::category::{CategoryBands, Dimension};
use super::config::PastPerformanceConfig;
use super::result::{ScoreComponent, ScoreDetail, ScoreResult};
use crate::vendor::VendorRecord;

/// Cause of a contract cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CancellationCategory {
    NonFulfillment,
    Compliance,
    Administrative,
}

impl CancellationCategory {
    pub fn label(&self) -> &'static str {
        match self {
            CancellationCategory::NonFulfillment => "Non-Fulfillment",
            CancellationCategory::Compliance => "Compliance",
            CancellationCategory::Administrative => "Administrative",
        }
    }

    pub fn count(&self, vendor: &VendorRecord) -> Option<i64> {
        match self {
            CancellationCategory::NonFulfillment => vendor.non_fulfillment,
            CancellationCategory::Compliance => vendor.compliance,
            CancellationCategory::Administrative => vendor.administrative,
        }
    }
}

/// Scores for zero, one, and two-or-more cancellations.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CancellationScores {
    pub none: f64,
    pub single: f64,
    pub repeated: f64,
}

impl CancellationScores {
    pub fn for_count(&self, count: i64) -> f64 {
        match count {
            i64::MIN..=0 => self.none,
            1 => self.single,
            _ => self.repeated,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PastPerformanceScorer {
    config: PastPerformanceConfig,
    categories: CategoryBands,
}

impl PastPerformanceScorer {
    pub fn new(config: PastPerformanceConfig, categories: CategoryBands) -> Self {
        Self { config, categories }
    }

    pub fn score(&self, vendor: &VendorRecord) -> ScoreResult {
        let mut components = Vec::with_capacity(self.config.categories.len());
        let mut score = 0.0;
        let mut total = 0;

        for rule in &self.config.categories {
            let count = rule.category.count(vendor).unwrap_or(0).max(0);
            let category_score = rule.scores.for_count(count);
            score += category_score * rule.weight;
            total += count;

            components.push(
                ScoreComponent::new(
                    rule.category.label(),
                    Some(count as f64),
                    category_score,
                    rule.weight,
                )
                .describe(format!("{} cancellations -> {}", count, category_score)),
            );
        }

        tracing::debug!(vendor = vendor.display_name(), score, "past performance scored");

        ScoreResult::new(
            Dimension::PastPerformance,
            score,
            &self.categories,
            components,
            ScoreDetail::PastPerformance {
                total_cancellations: total,
            },
        )
    }
}
