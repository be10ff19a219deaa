use pretty_assertions::assert_eq;
use proptest::prelude::*;

use vrrs::scoring::{
    Dimension, FederalContractScorer, ForeignLaborScorer, PastPerformanceScorer, RiskAggregator,
    RiskCategory, RiskWeights, SanctionsScorer, ScoreDetail, ScoringConfig, ScoringError,
    TrendAnalyzer, TrendClassification,
};
use vrrs::scoring::trend::{Polarity, TrendProfile, TrendScores};
use vrrs::vendor::{parse_vendor_records, Award, AwardType, VendorRecord};

const SCENARIO: &str = r#"{
    "Vendor": "Northwind Systems",
    "Altman_Z": 10,
    "DTE": 0.1,
    "DTI": 0.1,
    "ROA": 0.2,
    "ROE": 0.2,
    "Non-Fulfillment": 0,
    "Compliance": 0,
    "Administrative": 0,
    "awards": [{"type": "prime_contract", "amount": 6278000}],
    "competition_percentage": 3,
    "agency_count": 2,
    "sub_agency_count": 3,
    "countries_data": [
        {"country": "Canada", "job_counts_low": 0, "job_counts_moderate": 1, "job_counts_high": 0}
    ],
    "visa_certified_count": 1,
    "visa_denied_count": 0,
    "visa_withdrawn_count": 0,
    "visa_certified_expired_count": 0,
    "visa_unspecified_count": 0,
    "sanctions": []
}"#;

fn scenario() -> VendorRecord {
    parse_vendor_records(SCENARIO).unwrap().remove(0)
}

#[test]
fn test_scenario_vendor_is_below_moderate_risk() {
    let result = RiskAggregator::default().aggregate(&scenario(), None).unwrap();

    assert_eq!(result.vendor_name, "Northwind Systems");
    assert!(result.vrrs_score > 2.4 && result.vrrs_score < 2.6);
    assert!(result.risk_category < RiskCategory::Moderate);

    let contracts = result.dimension(Dimension::FederalContract).unwrap();
    // Two agencies fall in the second-worst diversity band
    assert_eq!(contracts.components[0].label, "Agency Count");
    assert_eq!(contracts.components[0].score, 7.0);
    // Award size and competition are near-optimal
    assert_eq!(contracts.components[2].score, 5.0);
    assert_eq!(contracts.components[3].score, 1.0);

    let financial = result.dimension(Dimension::FinancialStability).unwrap();
    assert!(financial.category < RiskCategory::Moderate);
}

#[test]
fn test_batch_file_keeps_record_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("vendors.json");
    let batch = format!(
        "[{}, {{\"Vendor\": \"Empty Co\"}}, {{\"Vendor\": \"Troubled Inc\", \"Altman_Z\": 0.5, \"Non-Fulfillment\": 4}}]",
        SCENARIO
    );
    std::fs::write(&path, batch).unwrap();

    let vendors = vrrs::vendor::load_vendor_records(&path).unwrap();
    let results = RiskAggregator::default()
        .aggregate_batch(&vendors, None)
        .unwrap();

    let names: Vec<&str> = results.iter().map(|r| r.vendor_name.as_str()).collect();
    assert_eq!(names, vec!["Northwind Systems", "Empty Co", "Troubled Inc"]);
    assert!(results[2].vrrs_score > results[0].vrrs_score);
}

#[test]
fn test_history_rows_feed_financial_trends() {
    let json = r#"{
        "Vendor": "X",
        "Altman_Z": 10, "DTE": 0.1, "DTI": 0.1, "ROA": 0.2, "ROE": 0.2,
        "historical_financial": [
            {"Year": 2022, "Return on Assets": 0.1},
            {"Year": 2023, "Return on Assets": 0.2}
        ]
    }"#;
    let vendor = parse_vendor_records(json).unwrap().remove(0);
    let result = RiskAggregator::default().aggregate(&vendor, None).unwrap();

    let financial = result.dimension(Dimension::FinancialStability).unwrap();
    let roa = financial.trends.iter().find(|t| t.metric == "ROA").unwrap();
    assert_eq!(roa.classification, TrendClassification::Improving);
    assert_eq!(financial.score, 2.67);
}

#[test]
fn test_missing_vendor_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = vrrs::vendor::load_vendor_records(&dir.path().join("absent.json")).unwrap_err();
    assert!(format!("{:#}", err).contains("Failed to read vendor file"));
}

#[test]
fn test_scenario_json_output_shape() {
    let result = RiskAggregator::default().aggregate(&scenario(), None).unwrap();
    let json = serde_json::to_value(&result).unwrap();

    assert_eq!(json["risk_category"], result.risk_category.label());
    let financial_weight = json["weights_used"]["financial_stability"].as_f64().unwrap();
    assert!((financial_weight - 0.3).abs() < 1e-9);
    let dimensions = json["dimensions"].as_array().unwrap();
    let names: Vec<&str> = dimensions
        .iter()
        .map(|d| d["dimension"].as_str().unwrap())
        .collect();
    assert_eq!(
        names,
        vec![
            "financial_stability",
            "past_performance",
            "federal_contract",
            "foreign_labor_risk",
            "sanctions_risk"
        ]
    );
}

#[test]
fn test_empty_awards_match_zero_prime_contract() {
    let scorer = FederalContractScorer::default();
    let mut empty = scenario();
    empty.awards.clear();
    let mut zero = scenario();
    zero.awards = vec![Award::new(AwardType::PrimeContract, 0.0)];
    assert_eq!(scorer.score(&empty), scorer.score(&zero));
}

#[test]
fn test_zero_cancellations_score() {
    let result = PastPerformanceScorer::default().score(&VendorRecord::default());
    assert_eq!(result.score, 1.6);
}

#[test]
fn test_no_countries_zero_current_year() {
    let mut vendor = scenario();
    vendor.countries_data.clear();
    match ForeignLaborScorer::default().score(&vendor).detail {
        ScoreDetail::ForeignLabor {
            current_year_score, ..
        } => assert_eq!(current_year_score, 0.0),
        other => panic!("unexpected detail {other:?}"),
    }
}

#[test]
fn test_sanctions_text_extraction() {
    let scorer = SanctionsScorer::default();
    assert_eq!(
        scorer.extract_violation_count("Company agreed to settle 40 violations"),
        40
    );
    assert_eq!(
        scorer.extract_violation_count("Fined 40 times across 3 sites"),
        0
    );
}

#[test]
fn test_single_point_series_is_stable() {
    let profile = TrendProfile {
        polarity: Polarity::HigherIsBetter,
        magnitude_threshold: 0.15,
        short_series_threshold: 0.3,
        scores: TrendScores {
            improving: 2.0,
            stable: 5.0,
            declining: 10.0,
        },
    };
    let result = TrendAnalyzer::default().analyze("ROA", &[2023], &[0.9], &profile);
    assert_eq!(result.classification, TrendClassification::Stable);
    assert_eq!(result.score, 5.0);
}

#[test]
fn test_invalid_weights_are_reported() {
    let result = RiskAggregator::default().aggregate(&scenario(), Some(&RiskWeights::uniform(0.0)));
    assert!(matches!(result, Err(ScoringError::InvalidWeights { .. })));
}

#[test]
fn test_config_override_changes_outcome() {
    let yaml = r#"
weights:
  financial_stability: 0
  past_performance: 0
  federal_contract: 1
  foreign_labor_risk: 0
  sanctions_risk: 0
"#;
    let config: ScoringConfig = serde_saphyr::from_str(yaml).unwrap();
    let result = RiskAggregator::new(&config).aggregate(&scenario(), None).unwrap();
    assert_eq!(result.vrrs_score, 4.1);
    assert_eq!(result.risk_category, RiskCategory::Low);
}

proptest! {
    #[test]
    fn prop_weight_scale_invariance(scale in 0.01f64..1000.0) {
        let aggregator = RiskAggregator::default();
        let vendor = scenario();
        let unit = aggregator.aggregate(&vendor, Some(&RiskWeights::uniform(1.0))).unwrap();
        let scaled = aggregator.aggregate(&vendor, Some(&RiskWeights::uniform(scale))).unwrap();
        prop_assert!((unit.vrrs_score - scaled.vrrs_score).abs() < 1e-9);
    }

    #[test]
    fn prop_vrrs_stays_in_range(
        altman_z in -5.0f64..15.0,
        dte in 0.0f64..6.0,
        non_fulfillment in 0i64..5,
        agencies in 0.0f64..10.0,
        competition in 0.0f64..100.0,
    ) {
        let vendor = VendorRecord {
            altman_z: Some(altman_z),
            dte: Some(dte),
            non_fulfillment: Some(non_fulfillment),
            agency_count: Some(agencies),
            competition_percentage: Some(competition),
            ..scenario()
        };
        let result = RiskAggregator::default().aggregate(&vendor, None).unwrap();
        prop_assert!((0.0..=10.0).contains(&result.vrrs_score));
    }
}
