use super::config::ScoringPolicy;

/// Tolerance for the weights-sum-to-one check
const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Validate a scoring policy before use.
/// Returns all validation errors at once (not just the first).
pub fn validate_policy(policy: &ScoringPolicy) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    // Weights
    for (key, weight) in policy.weights.as_pairs() {
        if !weight.is_finite() || weight < 0.0 {
            errors.push(format!("weights.{}: must be a non-negative number", key));
        }
    }
    let sum = policy.weights.sum();
    if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
        errors.push(format!("weights: must sum to 1.0 (got {:.6})", sum));
    }

    // Bands
    let bands = &policy.bands;
    if !(bands.medium_risk_min > 0.0
        && bands.medium_risk_min < bands.low_risk_min
        && bands.low_risk_min <= 100.0)
    {
        errors.push(format!(
            "bands: require 0 < medium_risk_min < low_risk_min <= 100 (got {} / {})",
            bands.medium_risk_min, bands.low_risk_min
        ));
    }

    // Signal thresholds
    let t = &policy.thresholds;
    if !(0.0..=100.0).contains(&t.neutral_score) {
        errors.push("thresholds.neutral_score: must be within 0-100".to_string());
    }
    for (key, value) in [
        ("expense_ratio_ceiling", t.expense_ratio_ceiling),
        ("income_cv_ceiling", t.income_cv_ceiling),
        ("co_mingling_ceiling", t.co_mingling_ceiling),
        ("expense_cv_ceiling", t.expense_cv_ceiling),
        ("trend_saturation", t.trend_saturation),
    ] {
        if !(value > 0.0) {
            errors.push(format!("thresholds.{}: must be positive", key));
        }
    }
    if !(t.target_income_sources > 1.0) {
        errors.push("thresholds.target_income_sources: must be greater than 1".to_string());
    }
    if !(0.0..=1.0).contains(&t.co_mingling_flag_share) {
        errors.push("thresholds.co_mingling_flag_share: must be within 0-1".to_string());
    }
    if !(t.high_risk_cap >= 0.0 && t.high_risk_cap < 100.0) {
        errors.push("thresholds.high_risk_cap: must be within [0, 100)".to_string());
    }
    if !(t.high_risk_decay > 0.0 && t.high_risk_decay <= 1.0) {
        errors.push("thresholds.high_risk_decay: must be within (0, 1]".to_string());
    }
    if !(t.trend_flat_band >= 0.0 && t.trend_flat_band < t.trend_saturation) {
        errors.push(
            "thresholds.trend_flat_band: must be non-negative and below trend_saturation"
                .to_string(),
        );
    }
    if t.expense_cv_flag < 0.0 {
        errors.push("thresholds.expense_cv_flag: must be non-negative".to_string());
    }
    if !(t.gap_tolerance_days >= 0 && t.gap_tolerance_days < t.gap_max_days) {
        errors.push(
            "thresholds.gap_tolerance_days: must be non-negative and below gap_max_days"
                .to_string(),
        );
    }
    if t.gap_flag_days < 0 {
        errors.push("thresholds.gap_flag_days: must be non-negative".to_string());
    }

    // Data sufficiency
    let s = &policy.sufficiency;
    // A one-month statement must always get less confidence than a full one
    if s.min_months < 2 {
        errors.push("sufficiency.min_months: must be at least 2".to_string());
    }
    if !(s.short_history_floor > 0.0 && s.short_history_floor < 1.0) {
        errors.push("sufficiency.short_history_floor: must be within (0, 1)".to_string());
    }
    if s.min_transactions == 0 {
        errors.push("sufficiency.min_transactions: must be at least 1".to_string());
    }
    if !(s.low_count_floor > 0.0 && s.low_count_floor <= 1.0) {
        errors.push("sufficiency.low_count_floor: must be within (0, 1]".to_string());
    }

    // Anomalies and forecast
    if policy.anomalies.min_transactions < 3 {
        errors.push("anomalies.min_transactions: must be at least 3".to_string());
    }
    if !(policy.anomalies.z_threshold > 0.0) {
        errors.push("anomalies.z_threshold: must be positive".to_string());
    }
    if policy.forecast.horizon_days == 0 {
        errors.push("forecast.horizon_days: must be at least 1".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::confidence_factor;

    #[test]
    fn test_default_policy_is_valid() {
        assert!(validate_policy(&ScoringPolicy::default()).is_ok());
    }

    #[test]
    fn test_weights_must_sum_to_one() {
        let mut policy = ScoringPolicy::default();
        policy.weights.expense_ratio = 0.5;
        let errors = validate_policy(&policy).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("weights: must sum to 1.0"));
    }

    #[test]
    fn test_negative_weight() {
        let mut policy = ScoringPolicy::default();
        policy.weights.high_risk = -0.15;
        policy.weights.expense_ratio = 0.50;
        let errors = validate_policy(&policy).unwrap_err();
        assert!(errors.iter().any(|e| e.contains("weights.high_risk")));
    }

    #[test]
    fn test_inverted_bands() {
        let mut policy = ScoringPolicy::default();
        policy.bands.medium_risk_min = 80.0;
        let errors = validate_policy(&policy).unwrap_err();
        assert!(errors[0].starts_with("bands:"));
    }

    #[test]
    fn test_high_risk_cap_must_stay_below_max() {
        let mut policy = ScoringPolicy::default();
        policy.thresholds.high_risk_cap = 100.0;
        let errors = validate_policy(&policy).unwrap_err();
        assert!(errors[0].contains("thresholds.high_risk_cap"));
    }

    #[test]
    fn test_short_history_floor_must_stay_below_one() {
        let mut policy = ScoringPolicy::default();
        policy.sufficiency.short_history_floor = 1.0;
        let errors = validate_policy(&policy).unwrap_err();
        assert_eq!(
            errors,
            vec!["sufficiency.short_history_floor: must be within (0, 1)".to_string()]
        );
    }

    #[test]
    fn test_single_month_minimum_rejected() {
        let mut policy = ScoringPolicy::default();
        policy.sufficiency.min_months = 1;
        let errors = validate_policy(&policy).unwrap_err();
        assert_eq!(errors, vec!["sufficiency.min_months: must be at least 2".to_string()]);
    }

    #[test]
    fn test_valid_policy_keeps_one_month_below_three() {
        let mut policy = ScoringPolicy::default();
        policy.sufficiency.short_history_floor = 0.99;
        policy.sufficiency.min_months = 2;
        assert!(validate_policy(&policy).is_ok());
        let one = confidence_factor(1, 50, &policy.sufficiency);
        let three = confidence_factor(3, 50, &policy.sufficiency);
        assert!(one < three);
    }

    #[test]
    fn test_zero_horizon_rejected() {
        let mut policy = ScoringPolicy::default();
        policy.forecast.horizon_days = 0;
        let errors = validate_policy(&policy).unwrap_err();
        assert_eq!(errors, vec!["forecast.horizon_days: must be at least 1".to_string()]);
    }

    #[test]
    fn test_collects_all_errors() {
        let mut policy = ScoringPolicy::default();
        policy.sufficiency.short_history_floor = 0.0; // Error 1
        policy.sufficiency.min_months = 0; // Error 2
        policy.thresholds.gap_max_days = 3; // Error 3
        let errors = validate_policy(&policy).unwrap_err();
        assert_eq!(errors.len(), 3);
    }
}
