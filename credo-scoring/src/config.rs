use serde::{Deserialize, Serialize};

/// Complete scoring policy: signal weights, risk-band cut points and the
/// per-signal thresholds. Passed explicitly into every scoring call so a run
/// is reproducible from its inputs alone.
///
/// Example TOML (any section or key may be omitted to keep its default):
/// ```toml
/// [weights]
/// expense_ratio = 0.25
/// high_risk = 0.10
///
/// [bands]
/// low_risk_min = 75.0
///
/// [sufficiency]
/// min_months = 6
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ScoringPolicy {
    pub weights: SignalWeights,
    pub bands: RiskBands,
    pub thresholds: SignalThresholds,
    pub sufficiency: SufficiencyPolicy,
    pub anomalies: AnomalyPolicy,
    pub forecast: ForecastPolicy,
}

/// Weights for signals 1-9. Must sum to 1.0; data sufficiency is applied
/// as a multiplier rather than a weight.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SignalWeights {
    pub expense_ratio: f64,
    pub income_volatility: f64,
    pub income_frequency: f64,
    pub revenue_diversification: f64,
    pub co_mingling: f64,
    pub high_risk: f64,
    pub income_trend: f64,
    pub expense_stability: f64,
    pub activity_gaps: f64,
}

impl Default for SignalWeights {
    fn default() -> Self {
        Self {
            expense_ratio: 0.20,
            income_volatility: 0.12,
            income_frequency: 0.10,
            revenue_diversification: 0.08,
            co_mingling: 0.12,
            high_risk: 0.15,
            income_trend: 0.08,
            expense_stability: 0.07,
            activity_gaps: 0.08,
        }
    }
}

impl SignalWeights {
    pub fn sum(&self) -> f64 {
        self.as_pairs().iter().map(|(_, w)| w).sum()
    }

    /// `(key, weight)` pairs in signal order
    pub fn as_pairs(&self) -> [(&'static str, f64); 9] {
        [
            ("expense_ratio", self.expense_ratio),
            ("income_volatility", self.income_volatility),
            ("income_frequency", self.income_frequency),
            ("revenue_diversification", self.revenue_diversification),
            ("co_mingling", self.co_mingling),
            ("high_risk", self.high_risk),
            ("income_trend", self.income_trend),
            ("expense_stability", self.expense_stability),
            ("activity_gaps", self.activity_gaps),
        ]
    }
}

/// Composite cut points: `>= low_risk_min` is low risk,
/// `>= medium_risk_min` is medium, anything below is high.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RiskBands {
    pub low_risk_min: f64,
    pub medium_risk_min: f64,
}

impl Default for RiskBands {
    fn default() -> Self {
        Self {
            low_risk_min: 70.0,
            medium_risk_min: 40.0,
        }
    }
}

/// Shape parameters for the individual signals
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SignalThresholds {
    /// Sub-score used when a signal has nothing to measure
    pub neutral_score: f64,
    /// Expense/income ratio at which signal 1 reaches 0
    pub expense_ratio_ceiling: f64,
    /// Monthly income coefficient of variation at which signal 2 reaches 0
    pub income_cv_ceiling: f64,
    /// Effective number of income sources that earns full marks
    pub target_income_sources: f64,
    /// Personal share of outflow at which signal 5 reaches 0
    pub co_mingling_ceiling: f64,
    pub co_mingling_flag_share: f64,
    /// Best possible signal 6 score once any high-risk transaction exists
    pub high_risk_cap: f64,
    /// Multiplier applied per additional high-risk transaction
    pub high_risk_decay: f64,
    /// Relative monthly income slope treated as flat
    pub trend_flat_band: f64,
    /// Relative monthly slope that earns the full bonus/penalty
    pub trend_saturation: f64,
    pub expense_cv_ceiling: f64,
    pub expense_cv_flag: f64,
    pub gap_tolerance_days: i64,
    pub gap_max_days: i64,
    pub gap_flag_days: i64,
}

impl Default for SignalThresholds {
    fn default() -> Self {
        Self {
            neutral_score: 50.0,
            expense_ratio_ceiling: 1.0,
            income_cv_ceiling: 1.0,
            target_income_sources: 5.0,
            co_mingling_ceiling: 0.5,
            co_mingling_flag_share: 0.30,
            high_risk_cap: 40.0,
            high_risk_decay: 0.5,
            trend_flat_band: 0.02,
            trend_saturation: 0.20,
            expense_cv_ceiling: 1.5,
            expense_cv_flag: 1.0,
            gap_tolerance_days: 7,
            gap_max_days: 45,
            gap_flag_days: 30,
        }
    }
}

/// Confidence scaling for short or sparse statements
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SufficiencyPolicy {
    /// Distinct months needed for full confidence
    pub min_months: u32,
    /// Month factor for a single-month statement
    pub short_history_floor: f64,
    /// Transactions needed for full confidence
    pub min_transactions: usize,
    /// Count factor as the transaction count approaches zero
    pub low_count_floor: f64,
}

impl Default for SufficiencyPolicy {
    fn default() -> Self {
        Self {
            min_months: 3,
            short_history_floor: 0.5,
            min_transactions: 10,
            low_count_floor: 0.6,
        }
    }
}

/// Outlier screening of transaction magnitudes
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct AnomalyPolicy {
    /// Below this many transactions no screening is attempted
    pub min_transactions: usize,
    /// Robust z-score above which a magnitude is reported
    pub z_threshold: f64,
}

impl Default for AnomalyPolicy {
    fn default() -> Self {
        Self {
            min_transactions: 5,
            z_threshold: 3.5,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ForecastPolicy {
    /// Days projected past the last statement date
    pub horizon_days: u32,
}

impl Default for ForecastPolicy {
    fn default() -> Self {
        Self { horizon_days: 30 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights_sum_to_one() {
        let weights = SignalWeights::default();
        assert!((weights.sum() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_default_policy_toml_roundtrip() {
        let policy = ScoringPolicy::default();
        let text = toml::to_string(&policy).unwrap();
        let parsed: ScoringPolicy = toml::from_str(&text).unwrap();
        assert_eq!(policy, parsed);
    }

    #[test]
    fn test_partial_policy_parse() {
        let text = r#"
[weights]
expense_ratio = 0.25
high_risk = 0.10

[sufficiency]
min_months = 6
"#;
        let policy: ScoringPolicy = toml::from_str(text).unwrap();
        assert_eq!(policy.weights.expense_ratio, 0.25);
        assert_eq!(policy.weights.high_risk, 0.10);
        assert_eq!(policy.weights.co_mingling, 0.12);
        assert_eq!(policy.sufficiency.min_months, 6);
        assert_eq!(policy.bands, RiskBands::default());
    }

    #[test]
    fn test_anomaly_and_forecast_sections_parse() {
        let text = "[anomalies]\nz_threshold = 5.0\n\n[forecast]\nhorizon_days = 14\n";
        let policy: ScoringPolicy = toml::from_str(text).unwrap();
        assert_eq!(policy.anomalies.z_threshold, 5.0);
        assert_eq!(policy.anomalies.min_transactions, 5);
        assert_eq!(policy.forecast.horizon_days, 14);
    }

    #[test]
    fn test_empty_policy_parse() {
        let policy: ScoringPolicy = toml::from_str("").unwrap();
        assert_eq!(policy, ScoringPolicy::default());
    }

    #[test]
    fn test_unknown_key_rejected() {
        let result: Result<ScoringPolicy, _> = toml::from_str("[weights]\nvibes = 1.0\n");
        assert!(result.is_err());
    }
}
