use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::category::{CategoryBands, Dimension};
use super::config::ForeignLaborConfig;
use super::result::{CountryScore, ScoreComponent, ScoreDetail, ScoreResult};
use super::trend::{TrendAnalyzer, TrendClassification, TrendResult};
use crate::vendor::{CountryLaborEntry, VendorRecord, VisaCounts, VisaHistoryEntry, VisaOutcome};

/// Country risk tier; drives the visa score multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CountryRiskTier {
    Low,
    Moderate,
    High,
}

impl CountryRiskTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            CountryRiskTier::Low => "low",
            CountryRiskTier::Moderate => "moderate",
            CountryRiskTier::High => "high",
        }
    }
}

/// Country names per risk tier, matched case-insensitively.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CountryTiers {
    pub low: Vec<String>,
    pub moderate: Vec<String>,
    pub high: Vec<String>,
}

impl CountryTiers {
    pub fn tier_of(&self, country: &str) -> Option<CountryRiskTier> {
        let country = country.trim();
        let listed = |names: &[String]| names.iter().any(|n| n.eq_ignore_ascii_case(country));

        if listed(&self.high) {
            Some(CountryRiskTier::High)
        } else if listed(&self.moderate) {
            Some(CountryRiskTier::Moderate)
        } else if listed(&self.low) {
            Some(CountryRiskTier::Low)
        } else {
            None
        }
    }
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl Default for CountryTiers {
    fn default() -> Self {
        Self {
            low: names(&[
                "USA",
                "Canada",
                "Germany",
                "France",
                "United Kingdom",
                "Australia",
                "New Zealand",
                "Japan",
                "Sweden",
                "Norway",
                "Denmark",
                "Finland",
                "Netherlands",
                "Switzerland",
                "Belgium",
                "Austria",
                "Ireland",
                "Singapore",
                "South Korea",
            ]),
            moderate: names(&[
                "India",
                "Brazil",
                "Mexico",
                "South Africa",
                "Turkey",
                "Indonesia",
                "Thailand",
                "Philippines",
                "Vietnam",
                "Argentina",
                "Chile",
                "Colombia",
                "Malaysia",
                "Poland",
                "Czech Republic",
                "Hungary",
                "Saudi Arabia",
                "United Arab Emirates",
                "Qatar",
                "Egypt",
                "Peru",
                "Ukraine",
            ]),
            high: names(&[
                "Russia",
                "China",
                "Iran",
                "North Korea",
                "Venezuela",
                "Syria",
                "Afghanistan",
                "Pakistan",
                "Iraq",
                "Libya",
                "Somalia",
                "Sudan",
                "Yemen",
                "Zimbabwe",
                "Cuba",
                "Myanmar",
                "Eritrea",
                "Belarus",
                "Nicaragua",
                "Burundi",
            ]),
        }
    }
}

/// Per-job risk weight by role sensitivity.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct JobSensitivityWeights {
    pub low: f64,
    pub moderate: f64,
    pub high: f64,
    /// Score for a country entry with no jobs at all
    pub no_jobs: f64,
}

impl Default for JobSensitivityWeights {
    fn default() -> Self {
        Self {
            low: 1.0,
            moderate: 6.0,
            high: 10.0,
            no_jobs: 1.0,
        }
    }
}

impl JobSensitivityWeights {
    /// Average sensitivity per job. Negative counts count as 0.
    pub fn score(&self, low: i64, moderate: i64, high: i64) -> f64 {
        let (low, moderate, high) = (low.max(0), moderate.max(0), high.max(0));
        let total = low + moderate + high;
        if total == 0 {
            return self.no_jobs;
        }
        (low as f64 * self.low + moderate as f64 * self.moderate + high as f64 * self.high)
            / total as f64
    }
}

/// Trend score derived from the certified and denied/withdrawn visa trends.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrendAdjustment {
    pub favorable: f64,
    pub neutral: f64,
    pub unfavorable: f64,
}

impl Default for TrendAdjustment {
    fn default() -> Self {
        Self {
            favorable: 2.0,
            neutral: 6.0,
            unfavorable: 10.0,
        }
    }
}

impl TrendAdjustment {
    /// Unfavorable if either trend declines, favorable only if both improve.
    pub fn score(&self, certified: TrendClassification, adverse: TrendClassification) -> f64 {
        use TrendClassification::*;
        match (certified, adverse) {
            (Declining, _) | (_, Declining) => self.unfavorable,
            (Improving, Improving) => self.favorable,
            _ => self.neutral,
        }
    }
}

/// Visa outcome totals for one year of history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct VisaYear {
    pub certified: f64,
    pub denied: f64,
    pub withdrawn: f64,
    pub certified_withdrawn: f64,
    pub certified_expired: f64,
    pub unspecified: f64,
    pub total: f64,
}

impl VisaYear {
    fn add(&mut self, visa_type: Option<&str>, count: f64) {
        let normalized = visa_type.map(|t| t.trim().to_ascii_lowercase());
        let slot = match normalized.as_deref() {
            Some("certified") => &mut self.certified,
            Some("denied") => &mut self.denied,
            Some("withdrawn") => &mut self.withdrawn,
            Some("certified-withdrawn") => &mut self.certified_withdrawn,
            Some("certified-expired") => &mut self.certified_expired,
            _ => &mut self.unspecified,
        };
        *slot += count;
        self.total += count;
    }

    /// Denied, withdrawn and certified-withdrawn combined.
    pub fn adverse(&self) -> f64 {
        self.denied + self.withdrawn + self.certified_withdrawn
    }
}

/// Merge H1B and permanent-visa history into per-year totals.
///
/// Entries without a year are skipped; a missing count adds 0.
pub fn visa_history(h1b: &[VisaHistoryEntry], permanent: &[VisaHistoryEntry]) -> BTreeMap<i64, VisaYear> {
    let mut years: BTreeMap<i64, VisaYear> = BTreeMap::new();
    for entry in h1b.iter().chain(permanent) {
        let Some(year) = entry.year else {
            tracing::warn!(visa_type = ?entry.visa_type, "skipping visa history entry without a year");
            continue;
        };
        years
            .entry(year)
            .or_default()
            .add(entry.visa_type.as_deref(), entry.count.unwrap_or(0.0));
    }
    years
}

#[derive(Debug, Clone, Default)]
pub struct ForeignLaborScorer {
    config: ForeignLaborConfig,
    analyzer: TrendAnalyzer,
    categories: CategoryBands,
}

impl ForeignLaborScorer {
    pub fn new(config: ForeignLaborConfig, analyzer: TrendAnalyzer, categories: CategoryBands) -> Self {
        Self {
            config,
            analyzer,
            categories,
        }
    }

    pub fn country_multiplier(&self, country: &str) -> f64 {
        let tier = self
            .config
            .country_tiers
            .tier_of(country)
            .unwrap_or(self.config.default_tier);
        self.config.tier_multipliers.get(&tier).copied().unwrap_or(1.0)
    }

    /// Mean band score across the five visa outcomes.
    pub fn visa_score(&self, counts: &VisaCounts) -> f64 {
        let total: f64 = VisaOutcome::ALL
            .iter()
            .map(|outcome| {
                self.config
                    .visa_bands
                    .get(outcome)
                    .map(|table| table.score(counts.get(*outcome)))
                    .unwrap_or(0.0)
            })
            .sum();
        total / VisaOutcome::ALL.len() as f64
    }

    pub fn country_score(&self, entry: &CountryLaborEntry, counts: &VisaCounts) -> CountryScore {
        let multiplier = self.country_multiplier(entry.country_name());
        let job_sensitivity_score = self.config.job_sensitivity.score(
            entry.job_counts_low.unwrap_or(0),
            entry.job_counts_moderate.unwrap_or(0),
            entry.job_counts_high.unwrap_or(0),
        );
        let visa_score = self.visa_score(counts);
        let adjusted_visa_score = visa_score * multiplier;
        let score = (job_sensitivity_score * self.config.job_weight
            + adjusted_visa_score * self.config.visa_weight)
            .clamp(0.0, 10.0);

        CountryScore {
            country: entry.country_name().to_string(),
            multiplier,
            job_sensitivity_score,
            visa_score,
            adjusted_visa_score,
            score,
        }
    }

    /// Analyze the most recent years of visa history.
    ///
    /// Returns `None` when there is no usable history.
    pub fn visa_trends(&self, vendor: &VendorRecord) -> Option<(TrendResult, TrendResult)> {
        let history = visa_history(&vendor.h1b_data, &vendor.permanent_visa_data);
        if history.is_empty() {
            return None;
        }

        let skip = history.len().saturating_sub(self.config.trend_window_years);
        let recent: Vec<(i32, VisaYear)> = history
            .into_iter()
            .skip(skip)
            .filter_map(|(year, totals)| i32::try_from(year).ok().map(|y| (y, totals)))
            .collect();

        let years: Vec<i32> = recent.iter().map(|(year, _)| *year).collect();
        let certified: Vec<f64> = recent.iter().map(|(_, t)| t.certified).collect();
        let adverse: Vec<f64> = recent.iter().map(|(_, t)| t.adverse()).collect();

        let certified =
            self.analyzer
                .analyze("certified", &years, &certified, &self.config.certified_trend);
        let adverse = self.analyzer.analyze(
            "denied_withdrawn",
            &years,
            &adverse,
            &self.config.denied_withdrawn_trend,
        );
        Some((certified, adverse))
    }

    pub fn score(&self, vendor: &VendorRecord) -> ScoreResult {
        let counts = vendor.visa_counts();
        let countries: Vec<CountryScore> = vendor
            .countries_data
            .iter()
            .map(|entry| self.country_score(entry, &counts))
            .collect();

        let current_year_score = if countries.is_empty() {
            0.0
        } else {
            countries.iter().map(|c| c.score).sum::<f64>() / countries.len() as f64
        };

        let (trend_score, trends) = match self.visa_trends(vendor) {
            Some((certified, adverse)) => {
                let score = self
                    .config
                    .trend_adjustment
                    .score(certified.classification, adverse.classification);
                (score, vec![certified, adverse])
            }
            None => (self.config.trend_adjustment.neutral, Vec::new()),
        };

        let score = self.config.current_year_weight * current_year_score
            + self.config.trend_weight * trend_score;

        let mut components: Vec<ScoreComponent> = countries
            .iter()
            .map(|c| {
                ScoreComponent::new(c.country.clone(), None, c.score, 0.0).describe(format!(
                    "jobs {:.2}, visas {:.2} x {}",
                    c.job_sensitivity_score, c.visa_score, c.multiplier
                ))
            })
            .collect();
        components.push(
            ScoreComponent::new(
                "Current Year",
                None,
                current_year_score,
                self.config.current_year_weight,
            )
            .describe(format!("mean of {} countries", countries.len())),
        );
        components.push(
            ScoreComponent::new("Visa Trend", None, trend_score, self.config.trend_weight)
                .describe(if trends.is_empty() {
                    "no visa history".to_string()
                } else {
                    format!(
                        "certified {}, denied/withdrawn {}",
                        trends[0].classification.as_str(),
                        trends[1].classification.as_str()
                    )
                }),
        );

        tracing::debug!(
            vendor = vendor.display_name(),
            current_year_score,
            trend_score,
            score,
            "foreign labor scored"
        );

        let certified_trend = trends.first().map(|t| t.classification);
        let denied_withdrawn_trend = trends.get(1).map(|t| t.classification);

        ScoreResult::new(
            Dimension::ForeignLaborRisk,
            score,
            &self.categories,
            components,
            ScoreDetail::ForeignLabor {
                current_year_score,
                trend_score,
                countries,
                certified_trend,
                denied_withdrawn_trend,
            },
        )
        .with_trends(trends)
    }
}
