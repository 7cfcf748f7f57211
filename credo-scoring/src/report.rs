use credo_core::StatementPeriod;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::config::{RiskBands, SignalWeights};

/// The ten scoring signals, in report order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    ExpenseRatio,
    IncomeVolatility,
    IncomeFrequency,
    RevenueDiversification,
    CoMingling,
    HighRisk,
    IncomeTrend,
    ExpenseStability,
    ActivityGaps,
    DataSufficiency,
}

impl SignalKind {
    pub const ALL: [SignalKind; 10] = [
        SignalKind::ExpenseRatio,
        SignalKind::IncomeVolatility,
        SignalKind::IncomeFrequency,
        SignalKind::RevenueDiversification,
        SignalKind::CoMingling,
        SignalKind::HighRisk,
        SignalKind::IncomeTrend,
        SignalKind::ExpenseStability,
        SignalKind::ActivityGaps,
        SignalKind::DataSufficiency,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SignalKind::ExpenseRatio => "expense_ratio",
            SignalKind::IncomeVolatility => "income_volatility",
            SignalKind::IncomeFrequency => "income_frequency",
            SignalKind::RevenueDiversification => "revenue_diversification",
            SignalKind::CoMingling => "co_mingling",
            SignalKind::HighRisk => "high_risk",
            SignalKind::IncomeTrend => "income_trend",
            SignalKind::ExpenseStability => "expense_stability",
            SignalKind::ActivityGaps => "activity_gaps",
            SignalKind::DataSufficiency => "data_sufficiency",
        }
    }

    /// Weight in the composite. Data sufficiency scales the composite instead,
    /// so its weight is always 0.
    pub fn weight(&self, weights: &SignalWeights) -> f64 {
        match self {
            SignalKind::ExpenseRatio => weights.expense_ratio,
            SignalKind::IncomeVolatility => weights.income_volatility,
            SignalKind::IncomeFrequency => weights.income_frequency,
            SignalKind::RevenueDiversification => weights.revenue_diversification,
            SignalKind::CoMingling => weights.co_mingling,
            SignalKind::HighRisk => weights.high_risk,
            SignalKind::IncomeTrend => weights.income_trend,
            SignalKind::ExpenseStability => weights.expense_stability,
            SignalKind::ActivityGaps => weights.activity_gaps,
            SignalKind::DataSufficiency => 0.0,
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One signal's contribution to the composite
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalScore {
    pub name: SignalKind,
    /// Underlying measurement (ratio, cv, days, ...). `None` when there was
    /// nothing to measure and the neutral score was used.
    pub raw_value: Option<f64>,
    /// Sub-score in 0-100
    pub score: f64,
    pub weight: f64,
    /// `score * weight`
    pub contribution: f64,
    pub rationale: String,
}

/// Qualitative warnings attached to a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Flag {
    NoIncome,
    SingleIncomeSource,
    HighCoMingling,
    HighRiskActivity,
    DecliningIncome,
    IrregularExpenses,
    ActivityGap,
    ShortHistory,
    LowTransactionCount,
    DegradedCategorization,
    UncategorizedRows,
}

impl Flag {
    pub fn description(&self) -> &'static str {
        match self {
            Flag::NoIncome => "No business income found in the statement",
            Flag::SingleIncomeSource => "All business income comes from a single source",
            Flag::HighCoMingling => "A large share of outflow is personal spending",
            Flag::HighRiskActivity => "High-risk transactions (e.g. betting) are present",
            Flag::DecliningIncome => "Monthly business income is trending down",
            Flag::IrregularExpenses => "Monthly expenses swing widely",
            Flag::ActivityGap => "The account shows a long period without transactions",
            Flag::ShortHistory => "Statement covers fewer months than recommended",
            Flag::LowTransactionCount => "Too few transactions for a confident score",
            Flag::DegradedCategorization => {
                "Categorization produced at most one category; category-based signals are neutral"
            }
            Flag::UncategorizedRows => "Some transactions were never categorized",
        }
    }
}

/// Composite risk band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskBand {
    Low,
    Medium,
    High,
}

impl RiskBand {
    pub fn from_score(score: f64, bands: &RiskBands) -> Self {
        if score >= bands.low_risk_min {
            RiskBand::Low
        } else if score >= bands.medium_risk_min {
            RiskBand::Medium
        } else {
            RiskBand::High
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskBand::Low => "Low Risk",
            RiskBand::Medium => "Medium Risk",
            RiskBand::High => "High Risk",
        }
    }
}

impl fmt::Display for RiskBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Result of one scoring run. Owned by the caller; the engine keeps nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreReport {
    /// Final score after the confidence factor, 0-100
    pub composite_score: f64,
    /// Weighted sum of signals 1-9 before the confidence factor
    pub weighted_score: f64,
    /// Data sufficiency multiplier, in (0, 1]
    pub confidence: f64,
    pub risk_band: RiskBand,
    pub signals: Vec<SignalScore>,
    pub flags: BTreeSet<Flag>,
    pub period: StatementPeriod,
}

impl ScoreReport {
    pub fn signal(&self, kind: SignalKind) -> Option<&SignalScore> {
        self.signals.iter().find(|s| s.name == kind)
    }

    pub fn has_flag(&self, flag: Flag) -> bool {
        self.flags.contains(&flag)
    }
}
