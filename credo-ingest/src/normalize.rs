//! Statement normalizer: raw CSV rows in, ordered canonical transactions out.

use credo_core::{Category, StatementPeriod, Transaction};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

use crate::error::FormatError;
use crate::parse::{
    Direction, date_part, detect_date_format, parse_amount, parse_date, parse_direction,
};
use crate::template::{AmountRule, ColumnMap, SchemaTemplate, builtin_templates, detect_schema};
use crate::types::{DropReason, NormalizeDiagnostics, NormalizedStatement, RawStatement};

/// Share of data rows that may be dropped before the statement is rejected
pub const MAX_MALFORMED_RATIO: f64 = 0.20;

/// Leading non-header lines (bank name, account number, ...) tolerated
/// before the real header row
pub const MAX_PREAMBLE_ROWS: usize = 20;

/// Read every CSV record. The first record becomes the header; cells are
/// trimmed and ragged rows are accepted.
///
/// The header must be valid UTF-8. Data cells in another encoding are
/// decoded lossily, so a stray Windows-1252 byte costs at most its own row
/// (an undecodable date or amount no longer parses and the row is dropped).
pub fn read_statement<R: Read>(reader: R) -> Result<RawStatement, FormatError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut headers = None;
    let mut rows = Vec::new();
    for result in rdr.byte_records() {
        let record = result?;
        if headers.is_none() {
            let decoded = record
                .iter()
                .map(|cell| std::str::from_utf8(cell).map(str::to_string))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|_| FormatError::HeaderEncoding)?;
            headers = Some(decoded);
            continue;
        }
        rows.push(
            record
                .iter()
                .map(|cell| String::from_utf8_lossy(cell).into_owned())
                .collect::<Vec<_>>(),
        );
    }

    Ok(RawStatement::new(headers.unwrap_or_default(), rows))
}

pub fn read_statement_path(path: impl AsRef<Path>) -> Result<RawStatement, FormatError> {
    let file = File::open(path.as_ref()).map_err(csv::Error::from)?;
    read_statement(file)
}

/// Normalizer configured with an ordered template list
#[derive(Debug, Clone)]
pub struct Normalizer {
    templates: Vec<SchemaTemplate>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self {
            templates: builtin_templates(),
        }
    }
}

impl Normalizer {
    pub fn new(templates: Vec<SchemaTemplate>) -> Self {
        Self { templates }
    }

    /// Append extra templates after the existing ones
    pub fn with_templates(mut self, extra: impl IntoIterator<Item = SchemaTemplate>) -> Self {
        self.templates.extend(extra);
        self
    }

    pub fn templates(&self) -> &[SchemaTemplate] {
        &self.templates
    }

    pub fn normalize_reader<R: Read>(
        &self,
        reader: R,
    ) -> Result<NormalizedStatement, FormatError> {
        self.normalize(&read_statement(reader)?)
    }

    pub fn normalize_path(
        &self,
        path: impl AsRef<Path>,
    ) -> Result<NormalizedStatement, FormatError> {
        self.normalize(&read_statement_path(path)?)
    }

    /// Detect the layout, merge amounts, parse dates, drop malformed rows and
    /// sort. Fails only on structural problems; a short history is a warning.
    pub fn normalize(&self, raw: &RawStatement) -> Result<NormalizedStatement, FormatError> {
        let (header_idx, template, columns) = self.locate_header(raw)?;
        debug!(template = %template.name, header_row = header_idx, "schema detected");

        // Rows after the header that carry any content
        let data: Vec<&Vec<String>> = raw.rows[header_idx..]
            .iter()
            .filter(|row| row.iter().any(|c| !c.trim().is_empty()))
            .collect();
        if data.is_empty() {
            return Err(FormatError::Empty);
        }
        let total = data.len();

        let date_cells: Vec<&str> = data
            .iter()
            .map(|row| cell(row, columns.date))
            .filter(|c| !date_part(c).is_empty())
            .collect();
        if date_cells.is_empty() {
            return Err(FormatError::TooManyMalformedRows { dropped: total, total });
        }
        let date_format = detect_date_format(&date_cells)?;
        debug!(date_format, "date format detected");

        let mut diagnostics = NormalizeDiagnostics {
            template: template.name.clone(),
            date_format: date_format.to_string(),
            total_rows: total,
            ..Default::default()
        };

        let mut transactions = Vec::with_capacity(total);
        for (i, row) in data.iter().enumerate() {
            match build_transaction(row, &columns, template.amount_rule, date_format) {
                Ok(txn) => transactions.push(txn),
                Err(reason) => {
                    debug!(row = i, ?reason, "dropping malformed row");
                    diagnostics.record_drop(reason);
                }
            }
        }

        let dropped = diagnostics.dropped_rows();
        if dropped as f64 > MAX_MALFORMED_RATIO * total as f64 {
            return Err(FormatError::TooManyMalformedRows { dropped, total });
        }
        diagnostics.kept_rows = transactions.len();

        // Stable: same-day rows keep file order
        transactions.sort_by_key(|t| t.date);

        let period = StatementPeriod::from_transactions(&transactions).ok_or(FormatError::Empty)?;

        let mut warnings = Vec::new();
        if dropped > 0 {
            warn!(dropped, total, "malformed rows excluded");
            warnings.push(format!(
                "Excluded {} of {} rows as malformed ({} missing date/amount, \
                 {} with both or neither credit/debit, {} with unknown type).",
                dropped,
                total,
                diagnostics.missing_field_rows,
                diagnostics.ambiguous_amount_rows,
                diagnostics.unknown_type_rows
            ));
        }
        if !period.is_reliable() {
            warn!(months = period.distinct_months, "short statement history");
            warnings.push(format!(
                "Statement covers only {} month(s). \
                 A minimum of {} months is recommended for reliable scoring.",
                period.distinct_months,
                credo_core::MIN_RELIABLE_MONTHS
            ));
        }

        Ok(NormalizedStatement {
            transactions,
            period,
            diagnostics,
            warnings,
        })
    }

    /// Find the header row: the first record if it matches a template,
    /// otherwise the first matching row within the preamble window.
    /// Returns the index of the first data row in `raw.rows`.
    fn locate_header<'t>(
        &'t self,
        raw: &RawStatement,
    ) -> Result<(usize, &'t SchemaTemplate, ColumnMap), FormatError> {
        if let Some((template, map)) = detect_schema(&self.templates, &raw.headers) {
            return Ok((0, template, map));
        }

        for (i, row) in raw.rows.iter().take(MAX_PREAMBLE_ROWS).enumerate() {
            if let Some((template, map)) = detect_schema(&self.templates, row) {
                return Ok((i + 1, template, map));
            }
        }

        Err(FormatError::UnrecognizedSchema {
            headers: raw.headers.clone(),
        })
    }
}

/// Normalize with the built-in templates
pub fn normalize(raw: &RawStatement) -> Result<NormalizedStatement, FormatError> {
    Normalizer::default().normalize(raw)
}

fn cell(row: &[String], idx: usize) -> &str {
    row.get(idx).map(|s| s.trim()).unwrap_or("")
}

/// A populated money cell: `Ok(None)` when empty or zero
fn money_cell(row: &[String], idx: usize) -> Result<Option<f64>, DropReason> {
    let raw = cell(row, idx);
    if raw.is_empty() {
        return Ok(None);
    }
    match parse_amount(raw) {
        Some(v) if v == 0.0 => Ok(None),
        Some(v) => Ok(Some(v)),
        None => Err(DropReason::MissingField),
    }
}

fn merged_amount(row: &[String], columns: &ColumnMap, rule: AmountRule) -> Result<f64, DropReason> {
    match rule {
        AmountRule::Signed => {
            let idx = columns.amount.ok_or(DropReason::MissingField)?;
            parse_amount(cell(row, idx)).ok_or(DropReason::MissingField)
        }
        AmountRule::TypeColumn => {
            let amount_idx = columns.amount.ok_or(DropReason::MissingField)?;
            let kind_idx = columns.kind.ok_or(DropReason::UnknownType)?;
            let amount = parse_amount(cell(row, amount_idx)).ok_or(DropReason::MissingField)?;
            let kind = cell(row, kind_idx);
            if kind.is_empty() {
                // No marker: trust the amount's own sign
                return Ok(amount);
            }
            match parse_direction(kind) {
                Some(Direction::Credit) => Ok(amount.abs()),
                Some(Direction::Debit) => Ok(-amount.abs()),
                None => Err(DropReason::UnknownType),
            }
        }
        AmountRule::SplitColumns => {
            let credit_idx = columns.credit.ok_or(DropReason::MissingField)?;
            let debit_idx = columns.debit.ok_or(DropReason::MissingField)?;
            match (money_cell(row, credit_idx)?, money_cell(row, debit_idx)?) {
                (Some(credit), None) => Ok(credit.abs()),
                (None, Some(debit)) => Ok(-debit.abs()),
                _ => Err(DropReason::AmbiguousAmount),
            }
        }
    }
}

fn build_transaction(
    row: &[String],
    columns: &ColumnMap,
    rule: AmountRule,
    date_format: &str,
) -> Result<Transaction, DropReason> {
    let date = parse_date(cell(row, columns.date), date_format).ok_or(DropReason::MissingField)?;
    let amount = merged_amount(row, columns, rule)?;

    let mut txn = Transaction::new(date, cell(row, columns.description), amount);
    if let Some(idx) = columns.category {
        let label = cell(row, idx);
        if !label.is_empty() {
            txn.category = Some(Category::from_label(label));
        }
    }
    Ok(txn)
}
