use serde::{Deserialize, Serialize};
use std::fmt;

/// Risk category for a 0-10 score. Higher scores mean higher risk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
pub enum RiskCategory {
    #[serde(rename = "Very Low Risk")]
    VeryLow,
    #[serde(rename = "Low Risk")]
    Low,
    #[serde(rename = "Moderate Risk")]
    Moderate,
    #[serde(rename = "High Risk")]
    High,
    #[serde(rename = "Severe Risk")]
    Severe,
}

impl RiskCategory {
    pub fn label(&self) -> &'static str {
        match self {
            RiskCategory::VeryLow => "Very Low Risk",
            RiskCategory::Low => "Low Risk",
            RiskCategory::Moderate => "Moderate Risk",
            RiskCategory::High => "High Risk",
            RiskCategory::Severe => "Severe Risk",
        }
    }
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The five scored risk dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    FinancialStability,
    PastPerformance,
    FederalContract,
    ForeignLaborRisk,
    SanctionsRisk,
}

impl Dimension {
    pub const ALL: [Dimension; 5] = [
        Dimension::FinancialStability,
        Dimension::PastPerformance,
        Dimension::FederalContract,
        Dimension::ForeignLaborRisk,
        Dimension::SanctionsRisk,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Dimension::FinancialStability => "financial_stability",
            Dimension::PastPerformance => "past_performance",
            Dimension::FederalContract => "federal_contract",
            Dimension::ForeignLaborRisk => "foreign_labor_risk",
            Dimension::SanctionsRisk => "sanctions_risk",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Dimension::FinancialStability => "Financial Stability",
            Dimension::PastPerformance => "Past Performance",
            Dimension::FederalContract => "Federal Contracts",
            Dimension::ForeignLaborRisk => "Foreign Labor Risk",
            Dimension::SanctionsRisk => "Sanctions Risk",
        }
    }
}

/// Lower bound of each category above "Very Low". Bands are `[bound, next)`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CategoryBands {
    pub low: f64,
    pub moderate: f64,
    pub high: f64,
    pub severe: f64,
}

impl Default for CategoryBands {
    fn default() -> Self {
        Self {
            low: 2.5,
            moderate: 4.5,
            high: 6.5,
            severe: 8.0,
        }
    }
}

impl CategoryBands {
    pub fn categorize(&self, score: f64) -> RiskCategory {
        if score >= self.severe {
            RiskCategory::Severe
        } else if score >= self.high {
            RiskCategory::High
        } else if score >= self.moderate {
            RiskCategory::Moderate
        } else if score >= self.low {
            RiskCategory::Low
        } else {
            RiskCategory::VeryLow
        }
    }

    pub fn validate(&self, errors: &mut Vec<String>) {
        let bounds = [self.low, self.moderate, self.high, self.severe];
        if bounds.iter().any(|b| !b.is_finite()) {
            errors.push("scoring.categories: bounds must be finite numbers".to_string());
            return;
        }
        if !bounds.windows(2).all(|pair| pair[0] < pair[1]) {
            errors.push(
                "scoring.categories: bounds must increase from low to severe".to_string(),
            );
        }
    }
}

/// Interpretation text for the aggregate VRRS.
pub fn overall_interpretation(category: RiskCategory) -> &'static str {
    match category {
        RiskCategory::Severe => "Vendor is highly unreliable, with financial distress, contract cancellations, compliance violations, sanctions, or high foreign labor dependency risks. Not recommended for contracts.",
        RiskCategory::High => "Vendor shows significant financial weaknesses, sanctions issues, federal contract issues, or foreign labor dependency risks. Use only with mitigation strategies.",
        RiskCategory::Moderate => "Vendor shows some financial instability, potential compliance concerns, or contract fulfillment issues. Due diligence is required before awarding contracts.",
        RiskCategory::Low => "Vendor is mostly stable with minor past performance, compliance, or financial concerns and none to low foreign labor dependency. Recommend for partnerships.",
        RiskCategory::VeryLow => "Vendor is financially stable, has strong past performance, no significant sanctions issues, diverse federal contracts, and none to low foreign labor dependency. Recommend for partnership.",
    }
}

/// Interpretation text for one dimension's score.
pub fn dimension_interpretation(dimension: Dimension, category: RiskCategory) -> &'static str {
    use Dimension::*;
    use RiskCategory::*;

    match (dimension, category) {
        (FinancialStability, Severe) => "Potential bankruptcy or major financial distress. Avoid vendor.",
        (FinancialStability, High) => "Poor financial health; high risk vendor. Consider alternative vendors. If selected, it will require closer monitoring.",
        (FinancialStability, Moderate) => "Some financial concerns require monitoring.",
        (FinancialStability, Low) => "Generally stable financial health with minor concerns.",
        (FinancialStability, VeryLow) => "Strong financial health, reliable vendor. Proceed with confidence.",

        (PastPerformance, Severe) => "Vendor has had extensive contract cancellations due to serious non-fulfillment and compliance issues.",
        (PastPerformance, High) => "Vendor has had significant contract cancellations due to non-fulfillment and compliance issues.",
        (PastPerformance, Moderate) => "Vendor has had several contracts cancelled in the past.",
        (PastPerformance, Low) => "Vendor has had few minor contract issues or administrative cancellations.",
        (PastPerformance, VeryLow) => "Vendor has had no contract cancellations due to non-fulfillment or compliance issues.",

        (FederalContract, Severe) => "The company has critical issues with contract growth, extremely limited agency relationships, and almost exclusive reliance on non-competitive awards.",
        (FederalContract, High) => "The company has significant risks due to inconsistent growth, limited agency relationships, or high reliance on non-competitive awards.",
        (FederalContract, Moderate) => "The company demonstrates average performance but needs to improve diversification and reduce dependency on non-competitive contracts.",
        (FederalContract, Low) => "The company demonstrates solid contract performance with satisfactory diversification across agencies.",
        (FederalContract, VeryLow) => "The company shows strong contractual growth, broad agency relationships, diverse sub-agency awards, and limited reliance on non-competitive contracts.",

        (ForeignLaborRisk, Severe) => "Vendor exclusively relies on foreign labor for critical roles and exhibits extreme dependence on high-risk countries.",
        (ForeignLaborRisk, High) => "Vendor heavily relies on foreign labor, high-risk roles, or exhibits increasing dependence on H1-B visas from high-risk countries.",
        (ForeignLaborRisk, Moderate) => "Vendor uses significant foreign labor for moderately sensitive roles with some controls in place.",
        (ForeignLaborRisk, Low) => "Vendor uses some foreign labor for low-risk roles with good controls in place.",
        (ForeignLaborRisk, VeryLow) => "Vendor has minimal reliance on foreign labor, low-risk roles, and favorable historical trend.",

        (SanctionsRisk, Severe) => "The company has an extensive history of sanctions and regulatory violations, indicating severe compliance risks. Avoid.",
        (SanctionsRisk, High) => "The company has a significant history of sanctions and regulatory violations, indicating substantial compliance risks.",
        (SanctionsRisk, Moderate) => "The company has some history of sanctions or regulatory violations that need to be monitored.",
        (SanctionsRisk, Low) => "The company has limited history of minor sanctions or regulatory issues.",
        (SanctionsRisk, VeryLow) => "The company has minimal or no history of sanctions or regulatory violations.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_band_edges() {
        let bands = CategoryBands::default();
        assert_eq!(bands.categorize(0.0), RiskCategory::VeryLow);
        assert_eq!(bands.categorize(2.49), RiskCategory::VeryLow);
        assert_eq!(bands.categorize(2.5), RiskCategory::Low);
        assert_eq!(bands.categorize(4.5), RiskCategory::Moderate);
        assert_eq!(bands.categorize(6.49), RiskCategory::Moderate);
        assert_eq!(bands.categorize(6.5), RiskCategory::High);
        assert_eq!(bands.categorize(7.99), RiskCategory::High);
        assert_eq!(bands.categorize(8.0), RiskCategory::Severe);
        assert_eq!(bands.categorize(42.0), RiskCategory::Severe);
    }

    #[test]
    fn test_negative_scores_are_very_low() {
        assert_eq!(CategoryBands::default().categorize(-1.0), RiskCategory::VeryLow);
    }

    #[test]
    fn test_validate_requires_increasing_bounds() {
        let mut errors = Vec::new();
        CategoryBands::default().validate(&mut errors);
        assert!(errors.is_empty());

        let bands = CategoryBands {
            high: 4.0,
            ..Default::default()
        };
        bands.validate(&mut errors);
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_category_labels_round_trip_through_json() {
        let json = serde_json::to_string(&RiskCategory::Moderate).unwrap();
        assert_eq!(json, "\"Moderate Risk\"");
        assert_eq!(RiskCategory::Severe.to_string(), "Severe Risk");
    }

    #[test]
    fn test_every_dimension_has_text_for_every_category() {
        for dimension in Dimension::ALL {
            for category in [
                RiskCategory::VeryLow,
                RiskCategory::Low,
                RiskCategory::Moderate,
                RiskCategory::High,
                RiskCategory::Severe,
            ] {
                assert!(!dimension_interpretation(dimension, category).is_empty());
            }
        }
    }
}
