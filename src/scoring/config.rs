use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::category::{CategoryBands, Dimension};
use super::error::ScoringError;
use super::federal_contract::ContractWeights;
use super::financial::FinancialMetric;
use super::foreign_labor::{CountryRiskTier, CountryTiers, JobSensitivityWeights, TrendAdjustment};
use super::past_performance::{CancellationCategory, CancellationScores};
use super::threshold::ThresholdTable;
use super::trend::{Polarity, TrendProfile, TrendScores, TrendSettings};
use crate::vendor::{AwardType, VisaOutcome};

/// Main scoring configuration.
///
/// Every section is optional in YAML and falls back to the canonical tables.
///
/// Example YAML:
/// ```yaml
/// scoring:
///   weights:
///     financial_stability: 0.4
///     sanctions_risk: 0.0
///   sanctions:
///     bands:
///       - { high: 0, score: 0 }
///       - { low: 0, score: 10 }
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ScoringConfig {
    /// Weight of each dimension in the VRRS
    pub weights: RiskWeights,

    /// Score bounds for the risk categories
    pub categories: CategoryBands,

    /// Significance settings shared by all trend analyses
    pub trend: TrendSettings,

    pub financial: FinancialConfig,
    pub past_performance: PastPerformanceConfig,
    pub federal_contract: FederalContractConfig,
    pub foreign_labor: ForeignLaborConfig,
    pub sanctions: SanctionsConfig,
}

/// Dimension weights for the aggregate score. Normalized before use.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RiskWeights {
    pub financial_stability: f64,
    pub past_performance: f64,
    pub federal_contract: f64,
    pub foreign_labor_risk: f64,
    pub sanctions_risk: f64,
}

impl Default for RiskWeights {
    fn default() -> Self {
        Self {
            financial_stability: 0.30,
            past_performance: 0.25,
            federal_contract: 0.15,
            foreign_labor_risk: 0.20,
            sanctions_risk: 0.10,
        }
    }
}

impl RiskWeights {
    pub fn uniform(weight: f64) -> Self {
        Self {
            financial_stability: weight,
            past_performance: weight,
            federal_contract: weight,
            foreign_labor_risk: weight,
            sanctions_risk: weight,
        }
    }

    pub fn get(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::FinancialStability => self.financial_stability,
            Dimension::PastPerformance => self.past_performance,
            Dimension::FederalContract => self.federal_contract,
            Dimension::ForeignLaborRisk => self.foreign_labor_risk,
            Dimension::SanctionsRisk => self.sanctions_risk,
        }
    }

    pub fn sum(&self) -> f64 {
        Dimension::ALL.iter().map(|d| self.get(*d)).sum()
    }

    /// Scale the weights so they sum to 1.0.
    ///
    /// # Errors
    ///
    /// Fails when any weight is negative or not a number, or when the sum is
    /// not a positive finite number.
    pub fn normalized(&self) -> Result<RiskWeights, ScoringError> {
        for dimension in Dimension::ALL {
            let weight = self.get(dimension);
            if !(weight >= 0.0) || !weight.is_finite() {
                return Err(ScoringError::NegativeWeight {
                    dimension: dimension.key(),
                    weight,
                });
            }
        }

        let sum = self.sum();
        if !(sum > 0.0) || !sum.is_finite() {
            return Err(ScoringError::InvalidWeights { sum });
        }

        Ok(RiskWeights {
            financial_stability: self.financial_stability / sum,
            past_performance: self.past_performance / sum,
            federal_contract: self.federal_contract / sum,
            foreign_labor_risk: self.foreign_labor_risk / sum,
            sanctions_risk: self.sanctions_risk / sum,
        })
    }
}

/// Financial stability: point-in-time ratios blended with their trends.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FinancialConfig {
    pub metrics: Vec<FinancialMetricRule>,
    pub point_in_time_weight: f64,
    pub trend_weight: f64,
    /// Trend score used when no historical data is available
    pub neutral_trend_score: f64,
    pub trend_score_min: f64,
    pub trend_score_max: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FinancialMetricRule {
    pub metric: FinancialMetric,
    pub weight: f64,
    pub bands: ThresholdTable,
    pub trend: TrendProfile,
}

impl Default for FinancialConfig {
    fn default() -> Self {
        let inf = f64::INFINITY;
        let debt_bands = ThresholdTable::from_triples(&[
            (0.0, 0.5, 1.0),
            (0.5, 1.0, 3.0),
            (1.0, 2.0, 5.0),
            (2.0, 3.0, 7.0),
            (3.0, inf, 10.0),
        ]);
        let return_bands = ThresholdTable::from_triples(&[
            (-inf, -0.5, 10.0),
            (-0.5, -0.01, 8.0),
            (-0.01, 0.5, 5.0),
            (0.5, 1.0, 3.0),
            (1.0, inf, 1.0),
        ]);
        let trend = |polarity, magnitude_threshold| TrendProfile {
            polarity,
            magnitude_threshold,
            short_series_threshold: 0.3,
            scores: TrendScores {
                improving: 2.0,
                stable: 5.0,
                declining: 10.0,
            },
        };

        Self {
            metrics: vec![
                FinancialMetricRule {
                    metric: FinancialMetric::AltmanZ,
                    weight: 0.30,
                    bands: ThresholdTable::from_triples(&[
                        (-inf, 1.81, 10.0),
                        (1.81, 2.99, 5.0),
                        (2.99, inf, 1.0),
                    ]),
                    trend: trend(Polarity::HigherIsBetter, 0.20),
                },
                FinancialMetricRule {
                    metric: FinancialMetric::DebtToEquity,
                    weight: 0.20,
                    bands: debt_bands.clone(),
                    trend: trend(Polarity::LowerIsBetter, 0.25),
                },
                FinancialMetricRule {
                    metric: FinancialMetric::DebtToIncome,
                    weight: 0.20,
                    bands: debt_bands,
                    trend: trend(Polarity::LowerIsBetter, 0.25),
                },
                FinancialMetricRule {
                    metric: FinancialMetric::ReturnOnAssets,
                    weight: 0.15,
                    bands: return_bands.clone(),
                    trend: trend(Polarity::HigherIsBetter, 0.15),
                },
                FinancialMetricRule {
                    metric: FinancialMetric::ReturnOnEquity,
                    weight: 0.15,
                    bands: return_bands,
                    trend: trend(Polarity::HigherIsBetter, 0.15),
                },
            ],
            point_in_time_weight: 0.8,
            trend_weight: 0.2,
            neutral_trend_score: 5.0,
            trend_score_min: 1.0,
            trend_score_max: 10.0,
        }
    }
}

/// Past performance: contract cancellations by cause.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct PastPerformanceConfig {
    pub categories: Vec<CancellationRule>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CancellationRule {
    pub category: CancellationCategory,
    pub weight: f64,
    pub scores: CancellationScores,
}

impl Default for PastPerformanceConfig {
    fn default() -> Self {
        let rule = |category, weight, none, single, repeated| CancellationRule {
            category,
            weight,
            scores: CancellationScores {
                none,
                single,
                repeated,
            },
        };

        Self {
            categories: vec![
                rule(CancellationCategory::NonFulfillment, 0.50, 1.0, 5.0, 10.0),
                rule(CancellationCategory::Compliance, 0.35, 1.0, 7.0, 10.0),
                rule(CancellationCategory::Administrative, 0.15, 5.0, 8.0, 10.0),
            ],
        }
    }
}

/// Federal contracts: award size by tier, agency diversity and competition.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FederalContractConfig {
    pub award_tables: BTreeMap<AwardType, ThresholdTable>,
    pub competition_bands: ThresholdTable,
    pub agency_bands: ThresholdTable,
    pub sub_agency_bands: ThresholdTable,
    /// Competition codes meaning "other than full and open competition"
    pub non_competitive_codes: Vec<String>,
    /// Non-competitive percentage assumed when none is supplied
    pub default_competition_percentage: f64,
    pub weights: ContractWeights,
}

impl Default for FederalContractConfig {
    fn default() -> Self {
        let inf = f64::INFINITY;
        let tiers = |small, medium, large, very_large| {
            ThresholdTable::from_triples(&[
                (0.0, 10_000_000.0, small),
                (10_000_000.0, 20_000_000.0, medium),
                (20_000_000.0, 50_000_000.0, large),
                (50_000_000.0, inf, very_large),
            ])
        };
        let diversity = ThresholdTable::from_triples(&[
            (0.0, 0.0, 10.0),
            (0.0, 2.0, 7.0),
            (2.0, 4.0, 4.0),
            (4.0, inf, 1.0),
        ]);

        let mut award_tables = BTreeMap::new();
        award_tables.insert(AwardType::PrimeContract, tiers(5.0, 3.0, 2.0, 1.0));
        award_tables.insert(AwardType::PrimeAward, tiers(5.0, 3.0, 2.0, 1.0));
        award_tables.insert(AwardType::PrimeAssistance, tiers(5.0, 4.0, 3.0, 2.0));
        award_tables.insert(AwardType::SubContract, tiers(6.0, 5.0, 4.0, 3.0));
        award_tables.insert(AwardType::SubAward, tiers(6.0, 5.0, 4.0, 3.0));
        award_tables.insert(AwardType::SubAssistance, tiers(7.0, 6.0, 4.0, 3.0));
        award_tables.insert(AwardType::SubGrant, tiers(7.0, 6.0, 4.0, 3.0));

        Self {
            award_tables,
            competition_bands: ThresholdTable::from_triples(&[
                (0.0, 25.0, 1.0),
                (25.0, 50.0, 4.0),
                (50.0, 70.0, 7.0),
                (70.0, inf, 10.0),
            ]),
            agency_bands: diversity.clone(),
            sub_agency_bands: diversity,
            non_competitive_codes: [
                "ONE", "NS", "SP2", "BND", "IA", "MES", "UNQ", "URG", "OTH", "RES", "FOC", "UR",
                "PDR", "UT", "STD", "PI", "MPT",
            ]
            .iter()
            .map(|code| code.to_string())
            .collect(),
            default_competition_percentage: 100.0,
            weights: ContractWeights::default(),
        }
    }
}

/// Foreign labor: per-country job sensitivity and visa outcomes, plus visa trends.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ForeignLaborConfig {
    pub country_tiers: CountryTiers,
    pub tier_multipliers: BTreeMap<CountryRiskTier, f64>,
    /// Tier used for countries not listed in any tier
    pub default_tier: CountryRiskTier,
    pub job_sensitivity: JobSensitivityWeights,
    pub visa_bands: BTreeMap<VisaOutcome, ThresholdTable>,
    pub job_weight: f64,
    pub visa_weight: f64,
    pub current_year_weight: f64,
    pub trend_weight: f64,
    /// Only the most recent N years of visa history are analyzed
    pub trend_window_years: usize,
    pub certified_trend: TrendProfile,
    pub denied_withdrawn_trend: TrendProfile,
    pub trend_adjustment: TrendAdjustment,
}

impl Default for ForeignLaborConfig {
    fn default() -> Self {
        let inf = f64::INFINITY;
        let adverse_outcome = ThresholdTable::from_triples(&[
            (0.0, 10.0, 1.0),
            (10.0, 20.0, 2.0),
            (20.0, 50.0, 4.0),
            (50.0, inf, 6.0),
        ]);

        let mut visa_bands = BTreeMap::new();
        visa_bands.insert(
            VisaOutcome::Certified,
            ThresholdTable::from_triples(&[
                (0.0, 10.0, 1.0),
                (10.0, 20.0, 6.0),
                (20.0, 50.0, 8.0),
                (50.0, inf, 10.0),
            ]),
        );
        for outcome in [
            VisaOutcome::Denied,
            VisaOutcome::Withdrawn,
            VisaOutcome::CertifiedExpired,
            VisaOutcome::Unspecified,
        ] {
            visa_bands.insert(outcome, adverse_outcome.clone());
        }

        let mut tier_multipliers = BTreeMap::new();
        tier_multipliers.insert(CountryRiskTier::Low, 0.6);
        tier_multipliers.insert(CountryRiskTier::Moderate, 0.8);
        tier_multipliers.insert(CountryRiskTier::High, 1.0);

        let visa_scores = TrendScores {
            improving: 2.0,
            stable: 6.0,
            declining: 10.0,
        };

        Self {
            country_tiers: CountryTiers::default(),
            tier_multipliers,
            default_tier: CountryRiskTier::Moderate,
            job_sensitivity: JobSensitivityWeights::default(),
            visa_bands,
            job_weight: 0.40,
            visa_weight: 0.60,
            current_year_weight: 0.85,
            trend_weight: 0.15,
            trend_window_years: 5,
            certified_trend: TrendProfile {
                polarity: Polarity::HigherIsBetter,
                magnitude_threshold: 0.15,
                short_series_threshold: 0.25,
                scores: visa_scores,
            },
            denied_withdrawn_trend: TrendProfile {
                polarity: Polarity::LowerIsBetter,
                magnitude_threshold: 0.20,
                short_series_threshold: 0.25,
                scores: visa_scores,
            },
            trend_adjustment: TrendAdjustment::default(),
        }
    }
}

/// Sanctions: violation counts mined from narrative text.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SanctionsConfig {
    /// Case-insensitive substrings that mark a text as describing violations
    pub keywords: Vec<String>,
    /// Score by total violation count
    pub bands: ThresholdTable,
}

impl Default for SanctionsConfig {
    fn default() -> Self {
        Self {
            keywords: ["violation", "violations", "violating", "violated"]
                .iter()
                .map(|k| k.to_string())
                .collect(),
            bands: ThresholdTable::from_triples(&[
                (0.0, 0.0, 0.0),
                (0.0, 3.0, 3.0),
                (3.0, 10.0, 5.0),
                (10.0, 20.0, 7.0),
                (20.0, f64::INFINITY, 10.0),
            ]),
        }
    }
}
