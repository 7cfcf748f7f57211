//! End-to-end: CSV fixture -> normalizer -> rule categorizer -> scoring engine

use credo_core::{Category, RuleCategorizer, categorize_all};
use credo_ingest::{NormalizedStatement, Normalizer};
use credo_scoring::{Flag, RiskBand, ScoringPolicy, SignalKind, score_statement};
use std::path::PathBuf;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .join("fixtures")
        .join(name)
}

fn load(name: &str) -> NormalizedStatement {
    let mut statement = Normalizer::default().normalize_path(fixture(name)).unwrap();
    let rules = RuleCategorizer::new().unwrap();
    categorize_all(&rules, &mut statement.transactions);
    statement
}

#[test]
fn test_typed_statement_scores_low_risk() {
    let statement = load("typed_statement.csv");
    assert!(statement.transactions.iter().all(|t| t.category.is_some()));

    let report = score_statement(
        &statement.transactions,
        &statement.period,
        &ScoringPolicy::default(),
    )
    .unwrap();

    assert_eq!(report.confidence, 1.0);
    assert_eq!(report.risk_band, RiskBand::Low);
    assert!(!report.has_flag(Flag::HighRiskActivity));
    assert!(!report.has_flag(Flag::ShortHistory));
    assert_eq!(report.signal(SignalKind::HighRisk).unwrap().score, 100.0);
    // Three distinct customers
    let diversification = report.signal(SignalKind::RevenueDiversification).unwrap();
    assert!(diversification.raw_value.unwrap() > 2.0);
    assert!(report.composite_score <= 100.0);
}

#[test]
fn test_split_statement_flags_betting() {
    let statement = load("split_statement.csv");
    let betting = statement
        .transactions
        .iter()
        .find(|t| t.description == "BETKING DEPOSIT")
        .unwrap();
    assert_eq!(betting.category, Some(Category::HighRisk));

    let report = score_statement(
        &statement.transactions,
        &statement.period,
        &ScoringPolicy::default(),
    )
    .unwrap();

    assert!(report.has_flag(Flag::HighRiskActivity));
    assert!(report.signal(SignalKind::HighRisk).unwrap().score < 100.0);
    assert_eq!(report.period.distinct_months, 3);
}

#[test]
fn test_precategorized_statement_keeps_labels() {
    let statement = load("categorized_statement.csv");
    let labels: Vec<Option<Category>> = statement.transactions.iter().map(|t| t.category).collect();
    assert_eq!(
        labels,
        vec![
            Some(Category::BusinessIncome),
            Some(Category::OperationalExpense),
            Some(Category::HighRisk)
        ]
    );

    let report = score_statement(
        &statement.transactions,
        &statement.period,
        &ScoringPolicy::default(),
    )
    .unwrap();
    assert!(report.has_flag(Flag::HighRiskActivity));
    assert!(report.has_flag(Flag::ShortHistory));
    assert!(report.confidence < 1.0);
    assert_eq!(report.risk_band, RiskBand::High);
}

#[test]
fn test_report_serializes_stable_names() {
    let statement = load("categorized_statement.csv");
    let report = score_statement(
        &statement.transactions,
        &statement.period,
        &ScoringPolicy::default(),
    )
    .unwrap();

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["risk_band"], "high");
    assert_eq!(json["signals"][0]["name"], "expense_ratio");
    assert_eq!(json["signals"][9]["name"], "data_sufficiency");
    let flags: Vec<&str> = json["flags"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f.as_str().unwrap())
        .collect();
    assert!(flags.contains(&"high_risk_activity"));
    assert_eq!(json["period"]["distinct_months"], 1);
}
