//! Statement period and per-month aggregation

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::transaction::Transaction;

/// Minimum distinct months for a statement to be considered reliable
pub const MIN_RELIABLE_MONTHS: u32 = 3;

/// A calendar month, ordered chronologically
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn next(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// Every month from `first` to `last`, both inclusive
    pub fn range(first: MonthKey, last: MonthKey) -> Vec<MonthKey> {
        let mut out = Vec::new();
        let mut cur = first;
        while cur <= last {
            out.push(cur);
            cur = cur.next();
        }
        out
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Calendar span covered by a statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Distinct calendar months that contain at least one transaction
    pub distinct_months: u32,
    pub days_covered: i64,
    pub transaction_count: usize,
}

impl StatementPeriod {
    /// Derive the period from a set of transactions. `None` when empty.
    pub fn from_transactions(txns: &[Transaction]) -> Option<Self> {
        let start = txns.iter().map(|t| t.date).min()?;
        let end = txns.iter().map(|t| t.date).max()?;
        let months: BTreeSet<MonthKey> = txns.iter().map(|t| MonthKey::of(t.date)).collect();

        Some(Self {
            start,
            end,
            distinct_months: months.len() as u32,
            days_covered: (end - start).num_days(),
            transaction_count: txns.len(),
        })
    }

    /// True when the statement meets the advisory history threshold
    pub fn is_reliable(&self) -> bool {
        self.distinct_months >= MIN_RELIABLE_MONTHS
    }

    /// All calendar months from start to end, including ones without activity
    pub fn months(&self) -> Vec<MonthKey> {
        MonthKey::range(MonthKey::of(self.start), MonthKey::of(self.end))
    }
}

/// Inflow/outflow totals for one month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyTotals {
    pub month: MonthKey,
    pub credits: f64,
    pub debits: f64,
    pub net: f64,
    pub count: usize,
}

/// Per-month credits, debits and counts, in chronological order.
/// Months without any transaction are omitted.
pub fn monthly_breakdown(txns: &[Transaction]) -> Vec<MonthlyTotals> {
    let mut by_month: BTreeMap<MonthKey, MonthlyTotals> = BTreeMap::new();

    for txn in txns {
        let month = MonthKey::of(txn.date);
        let entry = by_month.entry(month).or_insert(MonthlyTotals {
            month,
            credits: 0.0,
            debits: 0.0,
            net: 0.0,
            count: 0,
        });
        if txn.is_inflow() {
            entry.credits += txn.amount;
        } else {
            entry.debits += txn.abs_amount();
        }
        entry.net += txn.amount;
        entry.count += 1;
    }

    by_month.into_values().collect()
}
