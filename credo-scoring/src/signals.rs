//! The ten signal computations. Each one degrades to a neutral score plus a
//! flag when its input is missing instead of failing.

use crate::config::{ScoringPolicy, SignalThresholds, SufficiencyPolicy};
use crate::facts::StatementFacts;
use crate::report::{Flag, SignalKind};
use crate::stats::{coefficient_of_variation, mean, ols_slope};

/// A signal's measurement before weighting
#[derive(Debug, Clone, PartialEq)]
pub struct SignalOutcome {
    pub kind: SignalKind,
    pub raw_value: Option<f64>,
    pub score: f64,
    pub rationale: String,
    pub flags: Vec<Flag>,
}

impl SignalOutcome {
    fn new(kind: SignalKind, raw_value: Option<f64>, score: f64, rationale: String) -> Self {
        Self {
            kind,
            raw_value,
            score: clamp_score(score),
            rationale,
            flags: Vec::new(),
        }
    }

    fn neutral(kind: SignalKind, t: &SignalThresholds, rationale: &str) -> Self {
        Self::new(kind, None, t.neutral_score, rationale.to_string())
    }

    fn flag(mut self, flag: Flag) -> Self {
        self.flags.push(flag);
        self
    }
}

/// Ceiling on signal 6 once any high-risk row exists, whatever the policy says
const MAX_PENALIZED_HIGH_RISK: f64 = 99.0;

const DEGRADED: &str = "Categories do not discriminate; neutral score used";
const NO_INCOME: &str = "No business income to measure; neutral score used";

/// Evaluate all ten signals in report order
pub fn evaluate_all(facts: &StatementFacts, policy: &ScoringPolicy) -> Vec<SignalOutcome> {
    let t = &policy.thresholds;
    vec![
        expense_ratio(facts, t),
        income_volatility(facts, t),
        income_frequency(facts, t),
        revenue_diversification(facts, t),
        co_mingling(facts, t),
        high_risk(facts, t),
        income_trend(facts, t),
        expense_stability(facts, t),
        activity_gaps(facts, t),
        data_sufficiency(facts, &policy.sufficiency),
    ]
}

/// 1. Operational expense outflow over business income
pub fn expense_ratio(facts: &StatementFacts, t: &SignalThresholds) -> SignalOutcome {
    let kind = SignalKind::ExpenseRatio;
    if facts.is_degraded() {
        return SignalOutcome::neutral(kind, t, DEGRADED);
    }
    if !facts.has_income() {
        return SignalOutcome::new(
            kind,
            None,
            0.0,
            "No business income; expense ratio undefined".to_string(),
        )
        .flag(Flag::NoIncome);
    }

    let ratio = facts.opex_outflow / facts.total_income;
    SignalOutcome::new(
        kind,
        Some(ratio),
        100.0 * (1.0 - ratio / t.expense_ratio_ceiling),
        format!(
            "Operational expenses are {:.0}% of business income",
            ratio * 100.0
        ),
    )
}

/// 2. Coefficient of variation of monthly business income
pub fn income_volatility(facts: &StatementFacts, t: &SignalThresholds) -> SignalOutcome {
    let kind = SignalKind::IncomeVolatility;
    if facts.is_degraded() {
        return SignalOutcome::neutral(kind, t, DEGRADED);
    }
    let Some(cv) = coefficient_of_variation(&facts.monthly_income) else {
        return SignalOutcome::neutral(kind, t, NO_INCOME);
    };
    SignalOutcome::new(
        kind,
        Some(cv),
        100.0 * (1.0 - cv / t.income_cv_ceiling),
        format!(
            "Monthly income varies by {:.0}% around its mean over {} month(s)",
            cv * 100.0,
            facts.months.len()
        ),
    )
}

/// 3. Share of months with at least one business income transaction
pub fn income_frequency(facts: &StatementFacts, t: &SignalThresholds) -> SignalOutcome {
    let kind = SignalKind::IncomeFrequency;
    if facts.is_degraded() {
        return SignalOutcome::neutral(kind, t, DEGRADED);
    }
    let total = facts.months.len();
    let with_income = facts.monthly_income.iter().filter(|v| **v > 0.0).count();
    let fraction = if total == 0 {
        0.0
    } else {
        with_income as f64 / total as f64
    };
    SignalOutcome::new(
        kind,
        Some(fraction),
        100.0 * fraction,
        format!("Business income in {} of {} month(s)", with_income, total),
    )
}

/// 4. Effective number of income sources (inverse Herfindahl index)
pub fn revenue_diversification(facts: &StatementFacts, t: &SignalThresholds) -> SignalOutcome {
    let kind = SignalKind::RevenueDiversification;
    if facts.is_degraded() {
        return SignalOutcome::neutral(kind, t, DEGRADED);
    }
    if !facts.has_income() {
        return SignalOutcome::neutral(kind, t, NO_INCOME);
    }

    let hhi: f64 = facts
        .income_by_source
        .values()
        .map(|v| {
            let share = v / facts.total_income;
            share * share
        })
        .sum();
    let effective = 1.0 / hhi;
    let sources = facts.income_by_source.len();
    let outcome = SignalOutcome::new(
        kind,
        Some(effective),
        100.0 * (effective - 1.0) / (t.target_income_sources - 1.0),
        format!(
            "{} income source(s), {:.1} effective after concentration",
            sources, effective
        ),
    );
    if sources == 1 {
        outcome.flag(Flag::SingleIncomeSource)
    } else {
        outcome
    }
}

/// 5. Personal share of total outflow
pub fn co_mingling(facts: &StatementFacts, t: &SignalThresholds) -> SignalOutcome {
    let kind = SignalKind::CoMingling;
    if facts.is_degraded() {
        return SignalOutcome::neutral(kind, t, DEGRADED);
    }
    if facts.total_outflow <= 0.0 {
        return SignalOutcome::neutral(kind, t, "No outflow to measure; neutral score used");
    }

    let share = facts.personal_outflow / facts.total_outflow;
    let outcome = SignalOutcome::new(
        kind,
        Some(share),
        100.0 * (1.0 - share / t.co_mingling_ceiling),
        format!("Personal spending is {:.0}% of outflow", share * 100.0),
    );
    if share > t.co_mingling_flag_share {
        outcome.flag(Flag::HighCoMingling)
    } else {
        outcome
    }
}

/// 6. High-risk activity. Any occurrence caps the score well below the
/// maximum and each further occurrence decays it geometrically.
pub fn high_risk(facts: &StatementFacts, t: &SignalThresholds) -> SignalOutcome {
    let kind = SignalKind::HighRisk;
    let count = facts.high_risk_count;
    if count == 0 {
        return SignalOutcome::new(
            kind,
            Some(0.0),
            100.0,
            "No high-risk transactions".to_string(),
        );
    }

    let share = if facts.total_outflow > 0.0 {
        facts.high_risk_outflow / facts.total_outflow
    } else {
        0.0
    };
    let exponent = i32::try_from(count - 1).unwrap_or(i32::MAX);
    let cap = t.high_risk_cap.clamp(0.0, MAX_PENALIZED_HIGH_RISK);
    let score = cap * t.high_risk_decay.powi(exponent) * (1.0 - share);
    SignalOutcome::new(
        kind,
        Some(count as f64),
        score,
        format!(
            "{} high-risk transaction(s), {:.1}% of outflow",
            count,
            share * 100.0
        ),
    )
    .flag(Flag::HighRiskActivity)
}

/// 7. Linear trend of monthly business income relative to its mean
pub fn income_trend(facts: &StatementFacts, t: &SignalThresholds) -> SignalOutcome {
    let kind = SignalKind::IncomeTrend;
    if facts.is_degraded() {
        return SignalOutcome::neutral(kind, t, DEGRADED);
    }
    if !facts.has_income() {
        return SignalOutcome::neutral(kind, t, NO_INCOME);
    }
    let (Some(slope), Some(avg)) = (ols_slope(&facts.monthly_income), mean(&facts.monthly_income))
    else {
        return SignalOutcome::neutral(kind, t, "Fewer than two months; no trend to measure");
    };

    let relative = slope / avg;
    if relative.abs() < t.trend_flat_band {
        return SignalOutcome::new(
            kind,
            Some(relative),
            t.neutral_score,
            format!("Income flat ({:+.1}% per month)", relative * 100.0),
        );
    }

    let direction = if relative > 0.0 { "growing" } else { "declining" };
    let outcome = SignalOutcome::new(
        kind,
        Some(relative),
        50.0 + 50.0 * (relative / t.trend_saturation).clamp(-1.0, 1.0),
        format!("Income {} ({:+.1}% per month)", direction, relative * 100.0),
    );
    if relative < 0.0 {
        outcome.flag(Flag::DecliningIncome)
    } else {
        outcome
    }
}

/// 8. Coefficient of variation of monthly total outflow
pub fn expense_stability(facts: &StatementFacts, t: &SignalThresholds) -> SignalOutcome {
    let kind = SignalKind::ExpenseStability;
    let Some(cv) = coefficient_of_variation(&facts.monthly_outflow) else {
        return SignalOutcome::neutral(kind, t, "No outflow to measure; neutral score used");
    };
    let outcome = SignalOutcome::new(
        kind,
        Some(cv),
        100.0 * (1.0 - cv / t.expense_cv_ceiling),
        format!("Monthly outflow varies by {:.0}% around its mean", cv * 100.0),
    );
    if cv > t.expense_cv_flag {
        outcome.flag(Flag::IrregularExpenses)
    } else {
        outcome
    }
}

/// 9. Longest run of days without any transaction
pub fn activity_gaps(facts: &StatementFacts, t: &SignalThresholds) -> SignalOutcome {
    let kind = SignalKind::ActivityGaps;
    let gap = facts.longest_gap_days;
    let score = if gap <= t.gap_tolerance_days {
        100.0
    } else if gap >= t.gap_max_days {
        0.0
    } else {
        100.0 * (t.gap_max_days - gap) as f64 / (t.gap_max_days - t.gap_tolerance_days) as f64
    };
    let outcome = SignalOutcome::new(
        kind,
        Some(gap as f64),
        score,
        format!("Longest stretch without transactions: {} day(s)", gap),
    );
    if gap >= t.gap_flag_days {
        outcome.flag(Flag::ActivityGap)
    } else {
        outcome
    }
}

/// 10. Data sufficiency. The raw value is the confidence factor applied to
/// the composite; the score is the same factor on the 0-100 scale.
pub fn data_sufficiency(facts: &StatementFacts, s: &SufficiencyPolicy) -> SignalOutcome {
    let confidence = confidence_factor(facts.distinct_months, facts.transaction_count, s);
    let mut outcome = SignalOutcome::new(
        SignalKind::DataSufficiency,
        Some(confidence),
        100.0 * confidence,
        format!(
            "{} month(s) and {} transaction(s); confidence {:.2}",
            facts.distinct_months, facts.transaction_count, confidence
        ),
    );
    if facts.distinct_months < s.min_months {
        outcome = outcome.flag(Flag::ShortHistory);
    }
    if facts.transaction_count < s.min_transactions {
        outcome = outcome.flag(Flag::LowTransactionCount);
    }
    outcome
}

/// Multiplicative confidence in (0, 1] from history length and row count
pub fn confidence_factor(distinct_months: u32, transactions: usize, s: &SufficiencyPolicy) -> f64 {
    let month_factor = if distinct_months >= s.min_months || s.min_months <= 1 {
        1.0
    } else {
        let covered = distinct_months.saturating_sub(1) as f64;
        s.short_history_floor
            + (1.0 - s.short_history_floor) * covered / (s.min_months - 1) as f64
    };
    let count_factor = if transactions >= s.min_transactions {
        1.0
    } else {
        s.low_count_floor
            + (1.0 - s.low_count_floor) * transactions as f64 / s.min_transactions as f64
    };
    month_factor * count_factor
}

pub(crate) fn clamp_score(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use credo_core::{Category, StatementPeriod, Transaction};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn facts(txns: &[Transaction]) -> StatementFacts {
        let period = StatementPeriod::from_transactions(txns).unwrap();
        StatementFacts::collect(txns, &period)
    }

    fn income(date: NaiveDate, who: &str, amount: f64) -> Transaction {
        Transaction::new(date, format!("Transfer from {who}"), amount)
            .with_category(Category::BusinessIncome)
    }

    fn expense(date: NaiveDate, amount: f64) -> Transaction {
        Transaction::new(date, "Diesel", -amount).with_category(Category::OperationalExpense)
    }

    #[test]
    fn test_expense_ratio() {
        let t = SignalThresholds::default();
        let f = facts(&[income(d(2025, 1, 1), "A", 100.0), expense(d(2025, 1, 2), 25.0)]);
        let out = expense_ratio(&f, &t);
        assert_eq!(out.raw_value, Some(0.25));
        assert_eq!(out.score, 75.0);
    }

    #[test]
    fn test_no_income_floors_expense_ratio() {
        let t = SignalThresholds::default();
        let f = facts(&[
            expense(d(2025, 1, 2), 25.0),
            Transaction::new(d(2025, 1, 3), "Shoprite", -5.0).with_category(Category::Personal),
        ]);
        let out = expense_ratio(&f, &t);
        assert_eq!(out.score, 0.0);
        assert_eq!(out.flags, vec![Flag::NoIncome]);
        assert_eq!(income_volatility(&f, &t).score, t.neutral_score);
        assert_eq!(revenue_diversification(&f, &t).score, t.neutral_score);
        assert_eq!(income_trend(&f, &t).score, t.neutral_score);
    }

    #[test]
    fn test_income_frequency_counts_empty_months() {
        let t = SignalThresholds::default();
        let f = facts(&[
            income(d(2025, 1, 1), "A", 100.0),
            expense(d(2025, 2, 2), 25.0),
            income(d(2025, 3, 1), "A", 100.0),
            income(d(2025, 4, 1), "A", 100.0),
        ]);
        assert_eq!(income_frequency(&f, &t).score, 75.0);
    }

    #[test]
    fn test_single_source_flagged() {
        let t = SignalThresholds::default();
        let f = facts(&[
            income(d(2025, 1, 1), "Adebayo Stores", 100.0),
            income(d(2025, 1, 8), "ADEBAYO STORES", 50.0),
            expense(d(2025, 1, 9), 25.0),
        ]);
        let out = revenue_diversification(&f, &t);
        assert_eq!(out.score, 0.0);
        assert_eq!(out.flags, vec![Flag::SingleIncomeSource]);
    }

    #[test]
    fn test_even_sources_reach_target() {
        let t = SignalThresholds::default();
        let mut txns: Vec<Transaction> = ["Ada", "Bola", "Chidi", "Dayo", "Emeka"]
            .iter()
            .map(|who| income(d(2025, 1, 1), who, 100.0))
            .collect();
        txns.push(expense(d(2025, 1, 2), 10.0));
        let out = revenue_diversification(&facts(&txns), &t);
        assert!((out.score - 100.0).abs() < 1e-9);
        assert!(out.flags.is_empty());
    }

    #[test]
    fn test_high_risk_penalty_is_nonlinear() {
        let t = SignalThresholds::default();
        let mut txns = vec![income(d(2025, 1, 1), "A", 1000.0), expense(d(2025, 1, 2), 990.0)];
        let clean = high_risk(&facts(&txns), &t);
        assert_eq!(clean.score, 100.0);
        assert!(clean.flags.is_empty());

        txns.push(
            Transaction::new(d(2025, 1, 3), "Bet9ja", -10.0).with_category(Category::HighRisk),
        );
        let one = high_risk(&facts(&txns), &t);
        assert!((one.score - 39.6).abs() < 1e-9);
        assert_eq!(one.flags, vec![Flag::HighRiskActivity]);

        txns.push(
            Transaction::new(d(2025, 1, 4), "Bet9ja", -10.0).with_category(Category::HighRisk),
        );
        let two = high_risk(&facts(&txns), &t);
        assert!(two.score < one.score / 2.0 + 1e-9);
    }

    #[test]
    fn test_oversized_cap_still_penalizes_high_risk() {
        let t = SignalThresholds {
            high_risk_cap: 150.0,
            high_risk_decay: 1.0,
            ..SignalThresholds::default()
        };
        let f = facts(&[
            income(d(2025, 1, 1), "A", 1000.0),
            expense(d(2025, 1, 2), 990.0),
            Transaction::new(d(2025, 1, 3), "Bet9ja", -1.0).with_category(Category::HighRisk),
        ]);
        let out = high_risk(&f, &t);
        assert!(out.score < 100.0);
        assert_eq!(out.flags, vec![Flag::HighRiskActivity]);
    }

    #[test]
    fn test_trend_bands() {
        let t = SignalThresholds::default();
        let growing = facts(&[
            income(d(2025, 1, 1), "A", 100.0),
            income(d(2025, 2, 1), "A", 150.0),
            income(d(2025, 3, 1), "A", 200.0),
            expense(d(2025, 3, 2), 10.0),
        ]);
        let out = income_trend(&growing, &t);
        assert_eq!(out.score, 100.0);

        let declining = facts(&[
            income(d(2025, 1, 1), "A", 200.0),
            income(d(2025, 2, 1), "A", 150.0),
            income(d(2025, 3, 1), "A", 100.0),
            expense(d(2025, 3, 2), 10.0),
        ]);
        let out = income_trend(&declining, &t);
        assert_eq!(out.score, 0.0);
        assert_eq!(out.flags, vec![Flag::DecliningIncome]);

        let flat = facts(&[
            income(d(2025, 1, 1), "A", 100.0),
            income(d(2025, 2, 1), "A", 100.0),
            expense(d(2025, 2, 2), 10.0),
        ]);
        assert_eq!(income_trend(&flat, &t).score, 50.0);
    }

    #[test]
    fn test_activity_gap_scale() {
        let t = SignalThresholds::default();
        let short = facts(&[income(d(2025, 1, 1), "A", 1.0), income(d(2025, 1, 9), "A", 1.0)]);
        assert_eq!(activity_gaps(&short, &t).score, 100.0);

        // 26-day gap: halfway between 7 and 45
        let mid = facts(&[income(d(2025, 1, 1), "A", 1.0), income(d(2025, 1, 28), "A", 1.0)]);
        let out = activity_gaps(&mid, &t);
        assert_eq!(out.raw_value, Some(26.0));
        assert!((out.score - 50.0).abs() < 1e-9);
        assert!(out.flags.is_empty());

        let long = facts(&[income(d(2025, 1, 1), "A", 1.0), income(d(2025, 3, 1), "A", 1.0)]);
        let out = activity_gaps(&long, &t);
        assert_eq!(out.score, 0.0);
        assert_eq!(out.flags, vec![Flag::ActivityGap]);
    }

    #[test]
    fn test_confidence_factor() {
        let s = SufficiencyPolicy::default();
        assert_eq!(confidence_factor(3, 10, &s), 1.0);
        assert_eq!(confidence_factor(6, 200, &s), 1.0);
        assert_eq!(confidence_factor(1, 10, &s), 0.5);
        assert_eq!(confidence_factor(2, 10, &s), 0.75);
        assert!((confidence_factor(3, 5, &s) - 0.8).abs() < 1e-9);
        assert!(confidence_factor(1, 0, &s) > 0.0);
    }

    #[test]
    fn test_degraded_input_is_neutral() {
        let t = SignalThresholds::default();
        let f = facts(&[
            Transaction::new(d(2025, 1, 1), "x", 100.0).with_category(Category::Unclassified),
            Transaction::new(d(2025, 1, 2), "y", -50.0).with_category(Category::Unclassified),
        ]);
        for out in [
            expense_ratio(&f, &t),
            income_volatility(&f, &t),
            income_frequency(&f, &t),
            revenue_diversification(&f, &t),
            co_mingling(&f, &t),
            income_trend(&f, &t),
        ] {
            assert_eq!(out.score, t.neutral_score, "{:?}", out.kind);
            assert_eq!(out.raw_value, None);
        }
        assert_eq!(high_risk(&f, &t).score, 100.0);
    }
}
