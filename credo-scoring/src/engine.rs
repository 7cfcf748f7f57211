use credo_core::{StatementPeriod, Transaction};
use std::collections::BTreeSet;
use tracing::{debug, warn};

use crate::config::ScoringPolicy;
use crate::error::InputError;
use crate::facts::StatementFacts;
use crate::report::{Flag, RiskBand, ScoreReport, SignalKind, SignalScore};
use crate::signals::{self, clamp_score};
use crate::validation::validate_policy;

/// Score a categorized statement, deriving its period from the transactions.
pub fn score(txns: &[Transaction], policy: &ScoringPolicy) -> Result<ScoreReport, InputError> {
    let period = StatementPeriod::from_transactions(txns).ok_or(InputError::Empty)?;
    score_statement(txns, &period, policy)
}

/// Score a categorized statement whose period the normalizer already computed.
///
/// Fails only when there is nothing to score or no row was ever categorized.
/// Every other weakness in the input lowers the score or adds a flag.
///
/// Callers should run [`validate_policy`] on a policy they did not build
/// themselves. An invalid policy is still applied, with a warning, and the
/// result stays within 0-100 with any high-risk activity kept below 100.
pub fn score_statement(
    txns: &[Transaction],
    period: &StatementPeriod,
    policy: &ScoringPolicy,
) -> Result<ScoreReport, InputError> {
    if txns.is_empty() {
        return Err(InputError::Empty);
    }
    if txns.iter().all(|t| t.category.is_none()) {
        return Err(InputError::Uncategorized);
    }

    if let Err(errors) = validate_policy(policy) {
        warn!(?errors, "scoring with a policy that fails validation");
    }

    let facts = StatementFacts::collect(txns, period);
    let mut flags = BTreeSet::new();
    if facts.is_degraded() {
        warn!(
            categories = facts.categories.len(),
            "categorization is degraded, category-based signals fall back to neutral"
        );
        flags.insert(Flag::DegradedCategorization);
    }
    if facts.unresolved > 0 {
        warn!(rows = facts.unresolved, "scoring rows that were never categorized");
        flags.insert(Flag::UncategorizedRows);
    }

    let mut signals = Vec::with_capacity(SignalKind::ALL.len());
    let mut weighted = 0.0;
    let mut confidence = 1.0;

    for outcome in signals::evaluate_all(&facts, policy) {
        debug!(
            signal = %outcome.kind,
            score = outcome.score,
            raw = ?outcome.raw_value,
            "signal evaluated"
        );
        let weight = outcome.kind.weight(&policy.weights);
        let contribution = outcome.score * weight;
        if outcome.kind == SignalKind::DataSufficiency {
            confidence = outcome.raw_value.unwrap_or(1.0);
        } else {
            weighted += contribution;
        }
        flags.extend(outcome.flags);
        signals.push(SignalScore {
            name: outcome.kind,
            raw_value: outcome.raw_value,
            score: outcome.score,
            weight,
            contribution,
            rationale: outcome.rationale,
        });
    }

    let weighted_score = clamp_score(weighted);
    let confidence = if confidence.is_nan() {
        1.0
    } else {
        confidence.clamp(f64::MIN_POSITIVE, 1.0)
    };
    let composite_score = clamp_score(weighted_score * confidence);
    let risk_band = RiskBand::from_score(composite_score, &policy.bands);

    if flags.contains(&Flag::ShortHistory) {
        warn!(
            months = period.distinct_months,
            confidence, "statement history is short, confidence reduced"
        );
    }
    debug!(
        composite = composite_score,
        weighted = weighted_score,
        confidence,
        band = %risk_band,
        "statement scored"
    );

    Ok(ScoreReport {
        composite_score,
        weighted_score,
        confidence,
        risk_band,
        signals,
        flags,
        period: period.clone(),
    })
}
