use super::category::Dimension;
use super::config::ScoringConfig;
use super::trend::TrendProfile;

/// Validate scoring configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_scoring(config: &ScoringConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    // Aggregate weights
    for dimension in Dimension::ALL {
        check_weight(
            &format!("scoring.weights.{}", dimension.key()),
            config.weights.get(dimension),
            &mut errors,
        );
    }
    if !(config.weights.sum() > 0.0) {
        errors.push("scoring.weights: must sum to a positive number".to_string());
    }

    config.categories.validate(&mut errors);

    let trend = &config.trend;
    if !(trend.p_value_threshold > 0.0 && trend.p_value_threshold <= 1.0) {
        errors.push("scoring.trend.p_value_threshold: must be in (0, 1]".to_string());
    }
    if !(0.0..=1.0).contains(&trend.correlation_threshold) {
        errors.push("scoring.trend.correlation_threshold: must be in [0, 1]".to_string());
    }

    // Financial
    let financial = &config.financial;
    if financial.metrics.is_empty() {
        errors.push("scoring.financial.metrics: must list at least one metric".to_string());
    }
    for (i, rule) in financial.metrics.iter().enumerate() {
        let path = format!("scoring.financial.metrics[{}]", i);
        check_weight(&format!("{}.weight", path), rule.weight, &mut errors);
        rule.bands.validate(&format!("{}.bands", path), &mut errors);
        check_trend_profile(&format!("{}.trend", path), &rule.trend, &mut errors);
    }
    check_weight(
        "scoring.financial.point_in_time_weight",
        financial.point_in_time_weight,
        &mut errors,
    );
    check_weight("scoring.financial.trend_weight", financial.trend_weight, &mut errors);
    if financial.trend_score_min > financial.trend_score_max {
        errors.push(
            "scoring.financial: trend_score_min must not exceed trend_score_max".to_string(),
        );
    }

    // Past performance
    for (i, rule) in config.past_performance.categories.iter().enumerate() {
        check_weight(
            &format!("scoring.past_performance.categories[{}].weight", i),
            rule.weight,
            &mut errors,
        );
    }

    // Federal contracts
    let contracts = &config.federal_contract;
    for (award_type, table) in &contracts.award_tables {
        table.validate(
            &format!("scoring.federal_contract.award_tables.{}", award_type.as_str()),
            &mut errors,
        );
    }
    contracts
        .competition_bands
        .validate("scoring.federal_contract.competition_bands", &mut errors);
    contracts
        .agency_bands
        .validate("scoring.federal_contract.agency_bands", &mut errors);
    contracts
        .sub_agency_bands
        .validate("scoring.federal_contract.sub_agency_bands", &mut errors);
    let weights = &contracts.weights;
    for (name, weight) in [
        ("agency", weights.agency),
        ("sub_agency", weights.sub_agency),
        ("award_amount", weights.award_amount),
        ("competition", weights.competition),
    ] {
        check_weight(
            &format!("scoring.federal_contract.weights.{}", name),
            weight,
            &mut errors,
        );
    }

    // Foreign labor
    let labor = &config.foreign_labor;
    for (outcome, table) in &labor.visa_bands {
        table.validate(
            &format!("scoring.foreign_labor.visa_bands.{}", outcome.as_str()),
            &mut errors,
        );
    }
    if !labor.tier_multipliers.contains_key(&labor.default_tier) {
        errors.push(
            "scoring.foreign_labor.tier_multipliers: missing multiplier for default_tier"
                .to_string(),
        );
    }
    for (tier, multiplier) in &labor.tier_multipliers {
        check_weight(
            &format!("scoring.foreign_labor.tier_multipliers.{}", tier.as_str()),
            *multiplier,
            &mut errors,
        );
    }
    for (name, weight) in [
        ("job_weight", labor.job_weight),
        ("visa_weight", labor.visa_weight),
        ("current_year_weight", labor.current_year_weight),
        ("trend_weight", labor.trend_weight),
    ] {
        check_weight(&format!("scoring.foreign_labor.{}", name), weight, &mut errors);
    }
    if labor.trend_window_years < 2 {
        errors.push("scoring.foreign_labor.trend_window_years: must be at least 2".to_string());
    }
    check_trend_profile(
        "scoring.foreign_labor.certified_trend",
        &labor.certified_trend,
        &mut errors,
    );
    check_trend_profile(
        "scoring.foreign_labor.denied_withdrawn_trend",
        &labor.denied_withdrawn_trend,
        &mut errors,
    );

    // Sanctions
    let sanctions = &config.sanctions;
    if sanctions.keywords.iter().all(|k| k.trim().is_empty()) {
        errors.push("scoring.sanctions.keywords: must contain at least one keyword".to_string());
    }
    sanctions.bands.validate("scoring.sanctions.bands", &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_weight(path: &str, weight: f64, errors: &mut Vec<String>) {
    if !(weight >= 0.0) || !weight.is_finite() {
        errors.push(format!("{}: must be a non-negative number, got {}", path, weight));
    }
}

fn check_trend_profile(path: &str, profile: &TrendProfile, errors: &mut Vec<String>) {
    if !(profile.magnitude_threshold >= 0.0) {
        errors.push(format!("{}.magnitude_threshold: must be non-negative", path));
    }
    if !(profile.short_series_threshold >= 0.0) {
        errors.push(format!("{}.short_series_threshold: must be non-negative", path));
    }
}
