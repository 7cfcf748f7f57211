//! Property tests for the statement normalizer.
//!
//! Reproduce a failure: `PROPTEST_SEED=<seed> cargo test -p credo-ingest --test property_tests`

use chrono::{Duration, NaiveDate};
use credo_ingest::{RawStatement, normalize};
use proptest::prelude::*;

/// (day offset, magnitude in cents, is_credit)
fn rows_strategy() -> impl Strategy<Value = Vec<(i64, u32, bool)>> {
    prop::collection::vec((0i64..200, 1u32..50_000_000, any::<bool>()), 1..60)
}

fn base() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 10, 1).unwrap()
}

fn magnitude(cents: u32) -> f64 {
    cents as f64 / 100.0
}

fn split_statement(rows: &[(i64, u32, bool)]) -> RawStatement {
    let headers = ["Date", "Narration", "Credit", "Debit"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let data = rows
        .iter()
        .enumerate()
        .map(|(i, &(offset, cents, is_credit))| {
            let date = (base() + Duration::days(offset)).format("%d/%m/%Y").to_string();
            let value = format!("{:.2}", magnitude(cents));
            let (credit, debit) = if is_credit {
                (value, String::new())
            } else {
                (String::new(), value)
            };
            vec![date, format!("row-{i}"), credit, debit]
        })
        .collect();
    RawStatement::new(headers, data)
}

fn typed_statement(rows: &[(i64, u32, bool)]) -> RawStatement {
    let headers = ["date", "description", "amount", "type"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let data = rows
        .iter()
        .enumerate()
        .map(|(i, &(offset, cents, is_credit))| {
            let date = (base() + Duration::days(offset)).format("%Y-%m-%d").to_string();
            // Sign in the amount column is noise; the type column decides
            let amount = if i % 2 == 0 { magnitude(cents) } else { -magnitude(cents) };
            let kind = if is_credit { "Credit" } else { "Debit" };
            vec![date, format!("row-{i}"), format!("{amount:.2}"), kind.to_string()]
        })
        .collect();
    RawStatement::new(headers, data)
}

fn row_index(description: &str) -> usize {
    description.trim_start_matches("row-").parse().unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn test_normalize_output_sorted_by_date(rows in rows_strategy()) {
        let out = normalize(&split_statement(&rows)).unwrap();
        prop_assert_eq!(out.transactions.len(), rows.len());
        for pair in out.transactions.windows(2) {
            prop_assert!(pair[0].date <= pair[1].date);
            // Same-day rows keep file order
            if pair[0].date == pair[1].date {
                prop_assert!(row_index(&pair[0].description) < row_index(&pair[1].description));
            }
        }
    }

    #[test]
    fn test_split_columns_roundtrip(rows in rows_strategy()) {
        let out = normalize(&split_statement(&rows)).unwrap();
        for txn in &out.transactions {
            let (_, cents, is_credit) = rows[row_index(&txn.description)];
            let expected = magnitude(cents);
            let (credit, debit) = txn.split_columns();
            if is_credit {
                prop_assert_eq!(credit, Some(expected));
                prop_assert_eq!(debit, None);
            } else {
                prop_assert_eq!(credit, None);
                prop_assert_eq!(debit, Some(expected));
            }
        }
    }

    #[test]
    fn test_type_column_decides_sign(rows in rows_strategy()) {
        let out = normalize(&typed_statement(&rows)).unwrap();
        for txn in &out.transactions {
            let (_, _, is_credit) = rows[row_index(&txn.description)];
            prop_assert_eq!(txn.is_inflow(), is_credit);
            prop_assert_eq!(txn.is_outflow(), !is_credit);
        }
    }

    #[test]
    fn test_period_matches_extremes(rows in rows_strategy()) {
        let out = normalize(&split_statement(&rows)).unwrap();
        let min = rows.iter().map(|r| r.0).min().unwrap();
        let max = rows.iter().map(|r| r.0).max().unwrap();
        prop_assert_eq!(out.period.start, base() + Duration::days(min));
        prop_assert_eq!(out.period.end, base() + Duration::days(max));
        prop_assert_eq!(out.period.transaction_count, rows.len());
    }
}
