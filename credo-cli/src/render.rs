//! Human-readable and JSON output for the `normalize` and `score` commands.

use anyhow::{Context, Result};
use credo_core::{MonthlyTotals, StatementPeriod, monthly_breakdown};
use credo_ingest::{NormalizeDiagnostics, NormalizedStatement};
use credo_scoring::{
    Anomaly, BalanceForecast, ScoreReport, ScoringPolicy, detect_anomalies, forecast_balance,
};
use serde::Serialize;

/// JSON document printed by `credo score --json`
#[derive(Debug, Serialize)]
pub struct ScoreOutput<'a> {
    pub report: &'a ScoreReport,
    pub monthly: Vec<MonthlyTotals>,
    pub diagnostics: &'a NormalizeDiagnostics,
    pub warnings: &'a [String],
    pub anomalies: Vec<Anomaly>,
    pub forecast: BalanceForecast,
}

impl<'a> ScoreOutput<'a> {
    pub fn new(
        statement: &'a NormalizedStatement,
        report: &'a ScoreReport,
        policy: &ScoringPolicy,
    ) -> Self {
        let txns = &statement.transactions;
        Self {
            report,
            monthly: monthly_breakdown(txns),
            diagnostics: &statement.diagnostics,
            warnings: &statement.warnings,
            anomalies: detect_anomalies(txns, &policy.anomalies),
            forecast: forecast_balance(txns, policy.forecast.horizon_days),
        }
    }
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("serialize output")?;
    println!("{}", json);
    Ok(())
}

pub fn print_statement(statement: &NormalizedStatement) {
    let d = &statement.diagnostics;
    print_period(&statement.period);
    println!(
        "Template: {} | date format: {} | rows kept {}/{}",
        d.template, d.date_format, d.kept_rows, d.total_rows
    );
    if d.dropped_rows() > 0 {
        println!(
            "Dropped: {} missing field, {} ambiguous amount, {} unknown type",
            d.missing_field_rows, d.ambiguous_amount_rows, d.unknown_type_rows
        );
    }

    println!("\n## Monthly totals\n");
    for m in monthly_breakdown(&statement.transactions) {
        println!(
            "{} | in {:>14.2} | out {:>14.2} | net {:>14.2} | {} txn",
            m.month, m.credits, m.debits, m.net, m.count
        );
    }
    print_warnings(&statement.warnings);
}

pub fn print_report(statement: &NormalizedStatement, output: &ScoreOutput<'_>) {
    let report = output.report;
    println!(
        "# Credit score: {:.1} / 100 ({})\n",
        report.composite_score, report.risk_band
    );
    print_period(&statement.period);
    println!(
        "Weighted score {:.1} x confidence {:.2}\n",
        report.weighted_score, report.confidence
    );

    println!("## Signals\n");
    for s in &report.signals {
        println!(
            "- {:<24} {:>5.1}  (w={:.2}) {}",
            s.name.name(),
            s.score,
            s.weight,
            s.rationale
        );
    }

    if !report.flags.is_empty() {
        println!("\n## Flags\n");
        for flag in &report.flags {
            println!("- {}", flag.description());
        }
    }

    if !output.anomalies.is_empty() {
        println!("\n## Unusual transactions\n");
        for a in &output.anomalies {
            let category = a.category.map_or("-", |c| c.label());
            println!(
                "- {} {:>14.2}  {} [{}] (z={:.1})",
                a.date, a.amount, a.description, category, a.robust_z
            );
        }
    }
    print_forecast(&output.forecast);
    print_warnings(&statement.warnings);
}

fn print_forecast(forecast: &BalanceForecast) {
    let (Some(slope), Some(current), Some(end)) = (
        forecast.daily_slope,
        forecast.history.last(),
        forecast.projection.last(),
    ) else {
        return;
    };
    println!("\n## Balance trend\n");
    println!(
        "Net position {:.2} on {}, trending {:+.2}/day, projected {:.2} by {}",
        current.balance, current.date, slope, end.balance, end.date
    );
}

fn print_period(period: &StatementPeriod) {
    println!(
        "Period: {} to {} | {} month(s) | {} transaction(s)",
        period.start, period.end, period.distinct_months, period.transaction_count
    );
}

fn print_warnings(warnings: &[String]) {
    if warnings.is_empty() {
        return;
    }
    println!("\n## Warnings\n");
    for w in warnings {
        println!("- {}", w);
    }
}
