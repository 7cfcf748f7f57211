use thiserror::Error;

/// The only conditions under which scoring refuses to produce a report
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("no transactions to score")]
    Empty,

    #[error("no transaction carries a category; run the categorizer before scoring")]
    Uncategorized,
}
