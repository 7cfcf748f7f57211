//! Cell-level parsing: dates, amounts and credit/debit markers

use chrono::NaiveDate;

use crate::error::FormatError;

/// Date layouts tried in order. Day-first precedes month-first so an
/// ambiguous column (every day <= 12) resolves day-first.
pub const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d", // 2026-01-15
    "%d/%m/%Y", // 15/01/2026
    "%m/%d/%Y", // 01/15/2026
    "%d-%m-%Y", // 15-01-2026
    "%d-%B-%Y", // 15-Jan-2026, 15-January-2026
    "%d %B %Y", // 15 Jan 2026, 15 January 2026
    "%Y/%m/%d", // 2026/01/15
    "%d.%m.%Y", // 15.01.2026
];

/// Share of date cells the adopted format must parse
pub const MIN_DATE_PARSE_RATIO: f64 = 0.95;

/// Strip a trailing time-of-day (`2025-01-01T10:22`, `15 Jan 2026 10:22:01`)
pub fn date_part(cell: &str) -> &str {
    let cell = cell.trim();
    let Some(colon) = cell.find(':') else {
        return cell;
    };
    let cut = cell[..colon].rfind([' ', 'T']).unwrap_or(0);
    cell[..cut].trim_end()
}

pub fn parse_date(cell: &str, format: &str) -> Option<NaiveDate> {
    let cell = date_part(cell);
    if cell.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(cell, format).ok()
}

/// Pick the single date format used for the whole column.
///
/// The first format parsing every cell wins outright; otherwise the format
/// with the most parses is adopted if it clears [`MIN_DATE_PARSE_RATIO`].
pub fn detect_date_format(cells: &[&str]) -> Result<&'static str, FormatError> {
    let total = cells.len();
    let mut best: Option<(&'static str, usize)> = None;

    for &format in DATE_FORMATS {
        let parsed = cells
            .iter()
            .filter(|c| parse_date(c, format).is_some())
            .count();
        if parsed == total {
            return Ok(format);
        }
        if best.is_none_or(|(_, n)| parsed > n) {
            best = Some((format, parsed));
        }
    }

    match best {
        Some((format, parsed))
            if total > 0 && parsed as f64 >= MIN_DATE_PARSE_RATIO * total as f64 =>
        {
            Ok(format)
        }
        Some((format, parsed)) => Err(FormatError::UnparseableDates {
            best_format: format.to_string(),
            parsed,
            total,
        }),
        None => Err(FormatError::UnparseableDates {
            best_format: String::new(),
            parsed: 0,
            total,
        }),
    }
}

const CURRENCY_MARKERS: &[&str] = &["₦", "$", "£", "€", "NGN", "USD", "GBP", "EUR"];

/// Parse a money cell. Handles thousands separators, currency markers,
/// `(1,200.00)` and trailing `-`/`DR` negatives, and a trailing `CR`.
/// Returns `None` for empty or non-numeric cells.
pub fn parse_amount(cell: &str) -> Option<f64> {
    let mut s = cell.trim().to_uppercase();
    if s.is_empty() {
        return None;
    }

    let mut negative = false;
    if s.starts_with('(') && s.ends_with(')') {
        negative = true;
        s = s[1..s.len() - 1].to_string();
    }
    if let Some(rest) = s.strip_suffix("DR") {
        negative = true;
        s = rest.to_string();
    } else if let Some(rest) = s.strip_suffix("CR") {
        s = rest.to_string();
    }

    for marker in CURRENCY_MARKERS {
        s = s.replace(marker, "");
    }
    s.retain(|c| c != ',' && !c.is_whitespace());

    if let Some(rest) = s.strip_suffix('-') {
        negative = true;
        s = rest.to_string();
    }
    let s = s.strip_prefix('+').unwrap_or(&s);
    if s.is_empty() {
        return None;
    }

    let value: f64 = s.parse().ok().filter(|v: &f64| v.is_finite())?;
    Some(if negative { -value.abs() } else { value })
}

/// Direction from a type-column marker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Credit,
    Debit,
}

pub fn parse_direction(cell: &str) -> Option<Direction> {
    match cell.trim().to_lowercase().as_str() {
        "credit" | "cr" | "c" | "deposit" | "inflow" => Some(Direction::Credit),
        "debit" | "dr" | "d" | "withdrawal" | "outflow" => Some(Direction::Debit),
        _ => None,
    }
}
