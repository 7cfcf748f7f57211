use chrono::NaiveDate;
use credo_core::{Category, MonthKey, StatementPeriod, Transaction};
use std::collections::{BTreeMap, BTreeSet};

use crate::counterparty::counterparty_key;

/// Aggregates every signal reads from, computed in a single pass.
#[derive(Debug, Clone, PartialEq)]
pub struct StatementFacts {
    /// Every calendar month of the period, including empty ones
    pub months: Vec<MonthKey>,
    /// Business Income inflow per entry of `months`
    pub monthly_income: Vec<f64>,
    /// Total outflow (all categories) per entry of `months`
    pub monthly_outflow: Vec<f64>,
    pub total_income: f64,
    pub opex_outflow: f64,
    pub personal_outflow: f64,
    pub total_outflow: f64,
    pub high_risk_count: usize,
    pub high_risk_outflow: f64,
    /// Business Income keyed by counterparty fingerprint
    pub income_by_source: BTreeMap<String, f64>,
    /// Longest run of calendar days without any transaction, inside the period
    pub longest_gap_days: i64,
    /// Categories as the engine sees them (missing labels count as Unclassified)
    pub categories: BTreeSet<Category>,
    /// Rows whose category was never set
    pub unresolved: usize,
    pub transaction_count: usize,
    pub distinct_months: u32,
}

impl StatementFacts {
    pub fn collect(txns: &[Transaction], period: &StatementPeriod) -> Self {
        let months = period.months();
        let mut income_by_month: BTreeMap<MonthKey, f64> = BTreeMap::new();
        let mut outflow_by_month: BTreeMap<MonthKey, f64> = BTreeMap::new();
        let mut income_by_source: BTreeMap<String, f64> = BTreeMap::new();
        let mut categories = BTreeSet::new();
        let mut dates: BTreeSet<NaiveDate> = BTreeSet::new();

        let mut total_income = 0.0;
        let mut opex_outflow = 0.0;
        let mut personal_outflow = 0.0;
        let mut total_outflow = 0.0;
        let mut high_risk_count = 0;
        let mut high_risk_outflow = 0.0;
        let mut unresolved = 0;

        for txn in txns {
            let category = txn.resolved_category();
            if txn.category.is_none() {
                unresolved += 1;
            }
            categories.insert(category);
            dates.insert(txn.date);
            let month = MonthKey::of(txn.date);

            if txn.is_inflow() && category == Category::BusinessIncome {
                total_income += txn.amount;
                *income_by_month.entry(month).or_insert(0.0) += txn.amount;
                *income_by_source
                    .entry(counterparty_key(&txn.description))
                    .or_insert(0.0) += txn.amount;
            }

            if txn.is_outflow() {
                let outflow = txn.abs_amount();
                total_outflow += outflow;
                *outflow_by_month.entry(month).or_insert(0.0) += outflow;
                match category {
                    Category::OperationalExpense => opex_outflow += outflow,
                    Category::Personal => personal_outflow += outflow,
                    Category::HighRisk => high_risk_outflow += outflow,
                    _ => {}
                }
            }

            if category == Category::HighRisk {
                high_risk_count += 1;
            }
        }

        let monthly_income = months
            .iter()
            .map(|m| income_by_month.get(m).copied().unwrap_or(0.0))
            .collect();
        let monthly_outflow = months
            .iter()
            .map(|m| outflow_by_month.get(m).copied().unwrap_or(0.0))
            .collect();

        Self {
            months,
            monthly_income,
            monthly_outflow,
            total_income,
            opex_outflow,
            personal_outflow,
            total_outflow,
            high_risk_count,
            high_risk_outflow,
            income_by_source,
            longest_gap_days: longest_gap(&dates),
            categories,
            unresolved,
            transaction_count: txns.len(),
            distinct_months: period.distinct_months,
        }
    }

    /// At most one distinct category: category-based signals cannot discriminate
    pub fn is_degraded(&self) -> bool {
        self.categories.len() <= 1
    }

    pub fn has_income(&self) -> bool {
        self.total_income > 0.0
    }
}

/// Days strictly between consecutive active dates, maximised
fn longest_gap(dates: &BTreeSet<NaiveDate>) -> i64 {
    dates
        .iter()
        .zip(dates.iter().skip(1))
        .map(|(a, b)| (*b - *a).num_days() - 1)
        .max()
        .unwrap_or(0)
}
