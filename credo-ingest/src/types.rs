use credo_core::{StatementPeriod, Transaction};
use serde::{Deserialize, Serialize};

/// A CSV statement split into its header and data rows, cells untouched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawStatement {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawStatement {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }
}

/// Why a row was dropped during normalization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    /// Date or amount missing or unparseable
    MissingField,
    /// Split credit/debit layout with both or neither side populated
    AmbiguousAmount,
    /// Type column holds neither a credit nor a debit marker
    UnknownType,
}

/// What the normalizer decided and what it threw away
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizeDiagnostics {
    pub template: String,
    pub date_format: String,
    pub total_rows: usize,
    pub kept_rows: usize,
    pub missing_field_rows: usize,
    pub ambiguous_amount_rows: usize,
    pub unknown_type_rows: usize,
}

impl NormalizeDiagnostics {
    pub fn dropped_rows(&self) -> usize {
        self.missing_field_rows + self.ambiguous_amount_rows + self.unknown_type_rows
    }

    pub(crate) fn record_drop(&mut self, reason: DropReason) {
        match reason {
            DropReason::MissingField => self.missing_field_rows += 1,
            DropReason::AmbiguousAmount => self.ambiguous_amount_rows += 1,
            DropReason::UnknownType => self.unknown_type_rows += 1,
        }
    }
}

/// Normalizer output: ordered canonical transactions plus the derived period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedStatement {
    /// Sorted ascending by date; ties keep file order
    pub transactions: Vec<Transaction>,
    pub period: StatementPeriod,
    pub diagnostics: NormalizeDiagnostics,
    /// Non-fatal advisories (short history, dropped rows)
    pub warnings: Vec<String>,
}
