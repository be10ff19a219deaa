use rayon::prelude::*;
use serde::Serialize;

use super::category::{overall_interpretation, CategoryBands, Dimension, RiskCategory};
use super::config::{RiskWeights, ScoringConfig};
use super::error::ScoringError;
use super::federal_contract::FederalContractScorer;
use super::financial::FinancialScorer;
use super::foreign_labor::ForeignLaborScorer;
use super::past_performance::PastPerformanceScorer;
use super::result::{round2, ScoreResult};
use super::sanctions::SanctionsScorer;
use super::trend::TrendAnalyzer;
use crate::vendor::VendorRecord;

/// Final VRRS for one vendor, with every dimension's result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateResult {
    pub vendor_name: String,
    pub vrrs_score: f64,
    pub risk_category: RiskCategory,
    pub interpretation: String,
    /// Normalized weights, summing to 1.0
    pub weights_used: RiskWeights,
    pub dimensions: Vec<ScoreResult>,
}

impl AggregateResult {
    pub fn dimension(&self, dimension: Dimension) -> Option<&ScoreResult> {
        self.dimensions.iter().find(|d| d.dimension == dimension)
    }
}

/// Runs the five dimension scorers and combines them into the VRRS.
///
/// Holds no per-vendor state, so one aggregator can score any number of
/// records, including from several threads at once.
#[derive(Debug, Clone)]
pub struct RiskAggregator {
    financial: FinancialScorer,
    past_performance: PastPerformanceScorer,
    federal_contract: FederalContractScorer,
    foreign_labor: ForeignLaborScorer,
    sanctions: SanctionsScorer,
    weights: RiskWeights,
    categories: CategoryBands,
}

impl Default for RiskAggregator {
    fn default() -> Self {
        Self::new(&ScoringConfig::default())
    }
}

impl RiskAggregator {
    pub fn new(config: &ScoringConfig) -> Self {
        let analyzer = TrendAnalyzer::new(config.trend);
        let categories = config.categories;

        Self {
            financial: FinancialScorer::new(config.financial.clone(), analyzer, categories),
            past_performance: PastPerformanceScorer::new(config.past_performance.clone(), categories),
            federal_contract: FederalContractScorer::new(config.federal_contract.clone(), categories),
            foreign_labor: ForeignLaborScorer::new(config.foreign_labor.clone(), analyzer, categories),
            sanctions: SanctionsScorer::new(config.sanctions.clone(), categories),
            weights: config.weights,
            categories,
        }
    }

    pub fn score_dimensions(&self, vendor: &VendorRecord) -> Vec<ScoreResult> {
        vec![
            self.financial.score(vendor),
            self.past_performance.score(vendor),
            self.federal_contract.score(vendor),
            self.foreign_labor.score(vendor),
            self.sanctions.score(vendor),
        ]
    }

    /// Score `vendor` on every dimension and combine with `weights`, or the
    /// configured weights when `None`.
    ///
    /// # Errors
    ///
    /// Returns a [`ScoringError`] if the weights cannot be normalized.
    pub fn aggregate(
        &self,
        vendor: &VendorRecord,
        weights: Option<&RiskWeights>,
    ) -> Result<AggregateResult, ScoringError> {
        let weights_used = weights.unwrap_or(&self.weights).normalized()?;
        let dimensions = self.score_dimensions(vendor);

        let weighted: f64 = dimensions
            .iter()
            .map(|result| result.score * weights_used.get(result.dimension))
            .sum();
        let vrrs_score = round2(weighted);
        let risk_category = self.categories.categorize(vrrs_score);

        tracing::debug!(
            vendor = vendor.display_name(),
            vrrs_score,
            category = risk_category.label(),
            "vendor scored"
        );

        Ok(AggregateResult {
            vendor_name: vendor.display_name().to_string(),
            vrrs_score,
            risk_category,
            interpretation: compose_interpretation(risk_category, &dimensions),
            weights_used,
            dimensions,
        })
    }

    /// Score many vendors in parallel. Results keep the input order.
    ///
    /// # Errors
    ///
    /// Fails before scoring anything if the weights cannot be normalized.
    pub fn aggregate_batch(
        &self,
        vendors: &[VendorRecord],
        weights: Option<&RiskWeights>,
    ) -> Result<Vec<AggregateResult>, ScoringError> {
        weights.unwrap_or(&self.weights).normalized()?;
        vendors
            .par_iter()
            .map(|vendor| self.aggregate(vendor, weights))
            .collect()
    }
}

fn compose_interpretation(category: RiskCategory, dimensions: &[ScoreResult]) -> String {
    let mut text = format!(
        "**Overall Risk Assessment:** {}\n\n",
        overall_interpretation(category)
    );
    let lines: Vec<String> = dimensions
        .iter()
        .map(|d| format!("**{}:** {}", d.dimension.title(), d.interpretation))
        .collect();
    text.push_str(&lines.join("\n"));
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vendor::{Award, AwardType, CountryLaborEntry};
    use pretty_assertions::assert_eq;

    fn scenario_vendor() -> VendorRecord {
        VendorRecord {
            name: Some("Scenario Corp".to_string()),
            altman_z: Some(10.0),
            dte: Some(0.1),
            dti: Some(0.1),
            roa: Some(0.2),
            roe: Some(0.2),
            non_fulfillment: Some(0),
            compliance: Some(0),
            administrative: Some(0),
            awards: vec![Award::new(AwardType::PrimeContract, 6_278_000.0)],
            competition_percentage: Some(3.0),
            agency_count: Some(2.0),
            sub_agency_count: Some(3.0),
            countries_data: vec![CountryLaborEntry::new("Canada", 0, 1, 0)],
            visa_certified_count: Some(1.0),
            ..Default::default()
        }
    }

    #[test]
    fn test_scenario_dimension_scores() {
        let result = RiskAggregator::default()
            .aggregate(&scenario_vendor(), None)
            .unwrap();

        let scores: Vec<f64> = result.dimensions.iter().map(|d| d.score).collect();
        assert_eq!(scores, vec![2.76, 1.6, 4.1, 3.25, 0.0]);
        // 0.828 + 0.4 + 0.615 + 0.65 + 0
        assert_eq!(result.vrrs_score, 2.49);
        assert_eq!(result.risk_category, RiskCategory::VeryLow);
        assert_eq!(result.vendor_name, "Scenario Corp");
    }

    #[test]
    fn test_interpretation_lists_every_dimension() {
        let result = RiskAggregator::default()
            .aggregate(&scenario_vendor(), None)
            .unwrap();
        assert!(result
            .interpretation
            .starts_with("**Overall Risk Assessment:** Vendor is financially stable"));
        for dimension in Dimension::ALL {
            assert!(result
                .interpretation
                .contains(&format!("**{}:**", dimension.title())));
        }
        assert_eq!(result.interpretation.lines().count(), 7);
    }

    #[test]
    fn test_custom_weights_are_normalized() {
        let aggregator = RiskAggregator::default();
        let vendor = scenario_vendor();
        let ones = aggregator
            .aggregate(&vendor, Some(&RiskWeights::uniform(1.0)))
            .unwrap();
        let sevens = aggregator
            .aggregate(&vendor, Some(&RiskWeights::uniform(7.0)))
            .unwrap();
        assert_eq!(ones.vrrs_score, sevens.vrrs_score);
        assert!((ones.weights_used.sum() - 1.0).abs() < 1e-12);
        // Plain mean of 2.76, 1.6, 4.1, 3.25, 0
        assert_eq!(ones.vrrs_score, 2.34);
    }

    #[test]
    fn test_zero_weights_error() {
        let err = RiskAggregator::default()
            .aggregate(&scenario_vendor(), Some(&RiskWeights::uniform(0.0)))
            .unwrap_err();
        assert_eq!(err, ScoringError::InvalidWeights { sum: 0.0 });
    }

    #[test]
    fn test_configured_weights_are_used_by_default() {
        let config = ScoringConfig {
            weights: RiskWeights {
                financial_stability: 1.0,
                past_performance: 0.0,
                federal_contract: 0.0,
                foreign_labor_risk: 0.0,
                sanctions_risk: 0.0,
            },
            ..Default::default()
        };
        let result = RiskAggregator::new(&config)
            .aggregate(&scenario_vendor(), None)
            .unwrap();
        assert_eq!(result.vrrs_score, 2.76);
        assert_eq!(result.risk_category, RiskCategory::Low);
    }

    #[test]
    fn test_empty_record_does_not_fail() {
        let result = RiskAggregator::default()
            .aggregate(&VendorRecord::default(), None)
            .unwrap();
        assert_eq!(result.vendor_name, "Unknown Vendor");
        assert_eq!(result.dimensions.len(), 5);
    }

    #[test]
    fn test_batch_matches_single_calls_in_order() {
        let aggregator = RiskAggregator::default();
        let mut second = scenario_vendor();
        second.name = Some("Second".to_string());
        second.non_fulfillment = Some(3);
        let vendors = vec![scenario_vendor(), second, VendorRecord::default()];

        let batch = aggregator.aggregate_batch(&vendors, None).unwrap();
        let single: Vec<AggregateResult> = vendors
            .iter()
            .map(|v| aggregator.aggregate(v, None).unwrap())
            .collect();
        assert_eq!(batch, single);
    }

    #[test]
    fn test_dimension_lookup() {
        let result = RiskAggregator::default()
            .aggregate(&scenario_vendor(), None)
            .unwrap();
        let sanctions = result.dimension(Dimension::SanctionsRisk).unwrap();
        assert_eq!(sanctions.score, 0.0);
        assert_eq!(sanctions.category, RiskCategory::VeryLow);
    }
}
