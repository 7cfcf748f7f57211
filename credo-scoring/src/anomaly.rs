//! Outlier screening on transaction magnitudes.
//!
//! Each transaction's absolute amount is compared against the statement's
//! median with a robust z-score, `0.6745 * (x - median) / MAD`. When more
//! than half the magnitudes are identical the MAD is zero, so the mean
//! absolute deviation (scaled by 1.2533) stands in. Only unusually large
//! magnitudes are reported; small ones are never interesting to a lender.

use chrono::NaiveDate;
use credo_core::{Category, Transaction};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::AnomalyPolicy;
use crate::stats::{mean, median};

/// Consistency constant relating the MAD to a normal standard deviation
const MAD_SCALE: f64 = 0.6745;
/// Same, for the mean absolute deviation fallback
const MEAN_AD_SCALE: f64 = 1.253314;

/// A transaction whose magnitude stands out from the rest of the statement
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Anomaly {
    pub date: NaiveDate,
    pub description: String,
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    pub robust_z: f64,
}

/// Report transactions with outlying magnitudes, largest first.
///
/// Returns nothing for statements shorter than `policy.min_transactions` or
/// whose magnitudes have no spread at all.
pub fn detect_anomalies(txns: &[Transaction], policy: &AnomalyPolicy) -> Vec<Anomaly> {
    if txns.len() < policy.min_transactions {
        return Vec::new();
    }
    let magnitudes: Vec<f64> = txns.iter().map(|t| t.amount.abs()).collect();
    let Some(center) = median(&magnitudes) else {
        return Vec::new();
    };
    let deviations: Vec<f64> = magnitudes.iter().map(|m| (m - center).abs()).collect();
    let Some(score) = robust_scorer(center, &deviations) else {
        debug!(rows = txns.len(), "transaction magnitudes have no spread");
        return Vec::new();
    };

    let mut found: Vec<Anomaly> = txns
        .iter()
        .zip(&magnitudes)
        .filter_map(|(t, m)| {
            let z = score(*m);
            (z > policy.z_threshold).then(|| Anomaly {
                date: t.date,
                description: t.description.clone(),
                amount: t.amount,
                category: t.category,
                robust_z: z,
            })
        })
        .collect();
    found.sort_by(|a, b| b.amount.abs().total_cmp(&a.amount.abs()));
    debug!(count = found.len(), "anomaly screening done");
    found
}

fn robust_scorer(center: f64, deviations: &[f64]) -> Option<impl Fn(f64) -> f64> {
    let mad = median(deviations)?;
    let (scale, spread) = if mad > 0.0 {
        (MAD_SCALE, mad)
    } else {
        (1.0, MEAN_AD_SCALE * mean(deviations)?)
    };
    if !(spread > 0.0) {
        return None;
    }
    Some(move |x: f64| scale * (x - center) / spread)
}
