//! Running-balance history and a straight-line projection of it.
//!
//! Statements rarely carry a trustworthy balance column, so the balance here
//! is the cumulative net flow from the first statement day (opening balance
//! taken as zero). Only its trend is meaningful.

use chrono::{Duration, NaiveDate};
use credo_core::Transaction;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::stats::ols_fit;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DailyBalance {
    pub date: NaiveDate,
    pub balance: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BalanceForecast {
    /// End-of-day cumulative balance for every calendar day of the statement
    pub history: Vec<DailyBalance>,
    /// Fitted balance for each day after the last statement day
    pub projection: Vec<DailyBalance>,
    /// Fitted change in balance per day. `None` with fewer than two days.
    pub daily_slope: Option<f64>,
}

/// Build the daily balance history and project it `horizon_days` ahead.
pub fn forecast_balance(txns: &[Transaction], horizon_days: u32) -> BalanceForecast {
    let mut net_by_day: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for t in txns {
        *net_by_day.entry(t.date).or_insert(0.0) += t.amount;
    }
    let (Some((&first, _)), Some((&last, _))) =
        (net_by_day.first_key_value(), net_by_day.last_key_value())
    else {
        return BalanceForecast::default();
    };

    let mut history = Vec::new();
    let mut balance = 0.0;
    for date in first.iter_days().take_while(|d| *d <= last) {
        balance += net_by_day.get(&date).copied().unwrap_or(0.0);
        history.push(DailyBalance { date, balance });
    }

    let balances: Vec<f64> = history.iter().map(|h| h.balance).collect();
    let Some((slope, intercept)) = ols_fit(&balances) else {
        return BalanceForecast {
            history,
            projection: Vec::new(),
            daily_slope: None,
        };
    };

    let last_index = (balances.len() - 1) as f64;
    let projection = (1..=horizon_days)
        .map(|ahead| DailyBalance {
            date: last + Duration::days(i64::from(ahead)),
            balance: intercept + slope * (last_index + f64::from(ahead)),
        })
        .collect();

    BalanceForecast {
        history,
        projection,
        daily_slope: Some(slope),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, m, day).unwrap()
    }

    #[test]
    fn test_gaps_carry_balance_forward() {
        let txns = vec![
            Transaction::new(d(1, 1), "Sale", 1000.0),
            Transaction::new(d(1, 1), "Airtime", -100.0),
            Transaction::new(d(1, 4), "Sale", 500.0),
        ];
        let forecast = forecast_balance(&txns, 30);
        let balances: Vec<f64> = forecast.history.iter().map(|h| h.balance).collect();
        assert_eq!(balances, vec![900.0, 900.0, 900.0, 1400.0]);
        assert_eq!(forecast.history[3].date, d(1, 4));
    }

    #[test]
    fn test_steady_growth_projects_line() {
        let txns: Vec<Transaction> = (1..=10)
            .map(|day| Transaction::new(d(1, day), "Daily takings", 200.0))
            .collect();
        let forecast = forecast_balance(&txns, 30);
        assert_eq!(forecast.projection.len(), 30);
        assert_eq!(forecast.projection[0].date, d(1, 11));
        assert_eq!(forecast.projection[29].date, d(2, 9));
        let slope = forecast.daily_slope.unwrap();
        assert!((slope - 200.0).abs() < 1e-9);
        assert!((forecast.projection[0].balance - 2200.0).abs() < 1e-6);
        assert!((forecast.projection[29].balance - 8000.0).abs() < 1e-6);
    }

    #[test]
    fn test_single_day_has_history_only() {
        let txns = vec![
            Transaction::new(d(3, 2), "Sale", 300.0),
            Transaction::new(d(3, 2), "Fuel", -50.0),
        ];
        let forecast = forecast_balance(&txns, 30);
        assert_eq!(forecast.history.len(), 1);
        assert!(forecast.projection.is_empty());
        assert_eq!(forecast.daily_slope, None);
    }

    #[test]
    fn test_empty_statement() {
        assert_eq!(forecast_balance(&[], 30), BalanceForecast::default());
    }

    #[test]
    fn test_declining_balance_has_negative_slope() {
        let txns = vec![
            Transaction::new(d(5, 1), "Loan disbursement", 10000.0),
            Transaction::new(d(5, 10), "Supplies", -3000.0),
            Transaction::new(d(5, 20), "Supplies", -3000.0),
            Transaction::new(d(5, 30), "Supplies", -3000.0),
        ];
        let forecast = forecast_balance(&txns, 7);
        assert_eq!(forecast.projection.len(), 7);
        assert!(forecast.daily_slope.unwrap() < 0.0);
    }
}
