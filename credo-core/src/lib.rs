//! credo-core: canonical statement types shared by the normalizer and the scoring engine

pub mod categorizer;
pub mod period;
pub mod transaction;

pub use categorizer::{Categorized, Categorizer, RuleCategorizer, categorize_all};
pub use period::{MIN_RELIABLE_MONTHS, MonthKey, MonthlyTotals, StatementPeriod, monthly_breakdown};
pub use transaction::{Category, Transaction};
