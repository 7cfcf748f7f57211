//! credo-ingest: bank statement CSV normalization.
//!
//! Detects the column layout from an ordered list of declarative templates,
//! adopts one date format for the whole file, merges credit/debit or typed
//! amounts into a single signed value, and returns transactions sorted by date
//! together with the statement period.

pub mod error;
pub mod normalize;
pub mod parse;
pub mod template;
pub mod types;

pub use error::FormatError;
pub use normalize::{
    MAX_MALFORMED_RATIO, Normalizer, normalize, read_statement, read_statement_path,
};
pub use template::{AmountRule, ColumnMap, SchemaTemplate, builtin_templates, detect_schema};
pub use types::{DropReason, NormalizeDiagnostics, NormalizedStatement, RawStatement};
