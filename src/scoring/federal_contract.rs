use serde::{Deserialize, Serialize};
use std::borrow::Cow;

use super::category::{CategoryBands, Dimension};
use super::config::FederalContractConfig;
use super::result::{AwardScore, ScoreComponent, ScoreDetail, ScoreResult};
use crate::vendor::{Award, AwardType, VendorRecord};

/// Weights of the four federal contract sub-scores.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContractWeights {
    pub agency: f64,
    pub sub_agency: f64,
    pub award_amount: f64,
    pub competition: f64,
}

impl Default for ContractWeights {
    fn default() -> Self {
        Self {
            agency: 0.25,
            sub_agency: 0.20,
            award_amount: 0.25,
            competition: 0.30,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FederalContractScorer {
    config: FederalContractConfig,
    categories: CategoryBands,
}

impl FederalContractScorer {
    pub fn new(config: FederalContractConfig, categories: CategoryBands) -> Self {
        Self { config, categories }
    }

    pub fn is_non_competitive(&self, code: &str) -> bool {
        let code = code.trim();
        self.config
            .non_competitive_codes
            .iter()
            .any(|c| c.eq_ignore_ascii_case(code))
    }

    /// Score one award by its type's amount table. Types without a table score 0.
    pub fn award_score(&self, award: &Award) -> f64 {
        let amount = award.amount.unwrap_or(0.0);
        self.config
            .award_tables
            .get(&award.award_type)
            .map(|table| table.score(amount))
            .unwrap_or(0.0)
    }

    /// Non-competitive percentage, recomputed from competition codes when any
    /// award carries one. Also returns the non-competitive count in that case.
    pub fn competition_percentage(&self, vendor: &VendorRecord) -> (f64, Option<usize>) {
        let coded = vendor.awards.iter().any(|a| a.competition_code.is_some());
        if !coded {
            let supplied = vendor
                .competition_percentage
                .unwrap_or(self.config.default_competition_percentage);
            return (supplied, None);
        }

        let non_competitive = vendor
            .awards
            .iter()
            .filter_map(|a| a.competition_code.as_deref())
            .filter(|code| self.is_non_competitive(code))
            .count();
        let percentage = non_competitive as f64 / vendor.awards.len() as f64 * 100.0;
        (percentage, Some(non_competitive))
    }

    pub fn score(&self, vendor: &VendorRecord) -> ScoreResult {
        let awards: Cow<'_, [Award]> = if vendor.awards.is_empty() {
            Cow::Owned(vec![Award::new(AwardType::PrimeContract, 0.0)])
        } else {
            Cow::Borrowed(&vendor.awards)
        };

        let award_scores: Vec<AwardScore> = awards
            .iter()
            .map(|award| AwardScore {
                award_type: award.award_type,
                amount: award.amount.unwrap_or(0.0),
                score: self.award_score(award),
            })
            .collect();
        let average_award_score =
            award_scores.iter().map(|a| a.score).sum::<f64>() / award_scores.len() as f64;

        let (competition_percentage, non_competitive_awards) = self.competition_percentage(vendor);
        let competition_score = self.config.competition_bands.score(competition_percentage);

        let agency_count = vendor.agency_count.unwrap_or(0.0);
        let sub_agency_count = vendor.sub_agency_count.unwrap_or(0.0);
        let agency_score = self.config.agency_bands.score(agency_count);
        let sub_agency_score = self.config.sub_agency_bands.score(sub_agency_count);

        let weights = &self.config.weights;
        let score = agency_score * weights.agency
            + sub_agency_score * weights.sub_agency
            + average_award_score * weights.award_amount
            + competition_score * weights.competition;

        let competition_description = match non_competitive_awards {
            Some(count) => format!(
                "{} of {} awards non-competitive ({:.1}%) -> {}",
                count,
                vendor.awards.len(),
                competition_percentage,
                competition_score
            ),
            None => format!("{}% non-competitive -> {}", competition_percentage, competition_score),
        };

        let components = vec![
            ScoreComponent::new("Agency Count", Some(agency_count), agency_score, weights.agency)
                .describe(format!("{} agencies -> {}", agency_count, agency_score)),
            ScoreComponent::new(
                "Sub-Agency Count",
                Some(sub_agency_count),
                sub_agency_score,
                weights.sub_agency,
            )
            .describe(format!("{} sub-agencies -> {}", sub_agency_count, sub_agency_score)),
            ScoreComponent::new("Award Amounts", None, average_award_score, weights.award_amount)
                .describe(format!("average of {} awards", award_scores.len())),
            ScoreComponent::new(
                "No Competition Percentage",
                Some(competition_percentage),
                competition_score,
                weights.competition,
            )
            .describe(competition_description),
        ];

        tracing::debug!(
            vendor = vendor.display_name(),
            agency_score,
            sub_agency_score,
            average_award_score,
            competition_score,
            score,
            "federal contracts scored"
        );

        ScoreResult::new(
            Dimension::FederalContract,
            score,
            &self.categories,
            components,
            ScoreDetail::FederalContract {
                average_award_score,
                total_awards: award_scores.len(),
                awards: award_scores,
                competition_percentage,
                non_competitive_awards,
            },
        )
    }
}
