//! credo-scoring: multi-signal credit-risk scoring of categorized statements.
//!
//! [`score`] is a pure function of the transactions and an explicit
//! [`ScoringPolicy`]: no I/O, no global state, and identical input always
//! yields an identical [`ScoreReport`].

pub mod anomaly;
pub mod config;
pub mod counterparty;
pub mod engine;
pub mod error;
pub mod facts;
pub mod forecast;
pub mod report;
pub mod signals;
mod stats;
pub mod validation;

pub use anomaly::{Anomaly, detect_anomalies};
pub use config::{
    AnomalyPolicy, ForecastPolicy, RiskBands, ScoringPolicy, SignalThresholds, SignalWeights,
    SufficiencyPolicy,
};
pub use counterparty::counterparty_key;
pub use engine::{score, score_statement};
pub use error::InputError;
pub use forecast::{BalanceForecast, DailyBalance, forecast_balance};
pub use report::{Flag, RiskBand, ScoreReport, SignalKind, SignalScore};
pub use signals::confidence_factor;
pub use validation::validate_policy;
