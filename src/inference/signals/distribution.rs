//! Frequency-distribution similarity signal.

use std::collections::BTreeMap;

use crate::inference::thresholds;

use super::{ColumnPair, SignalBucket, SignalHit};

/// Cosine similarity of two value-frequency vectors over their union
/// vocabulary. Values present on one side only contribute to that side's
/// norm and not to the dot product.
///
/// Returns 0.0 when either side is empty.
pub fn cosine_similarity(a: &BTreeMap<String, usize>, b: &BTreeMap<String, usize>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let dot: f64 = a
        .iter()
        .filter_map(|(k, x)| b.get(k).map(|y| *x as f64 * *y as f64))
        .sum();
    let norm = |m: &BTreeMap<String, usize>| {
        m.values()
            .map(|v| (*v as f64).powi(2))
            .sum::<f64>()
            .sqrt()
    };
    let (na, nb) = (norm(a), norm(b));
    if na == 0.0 || nb == 0.0 {
        return 0.0;
    }
    dot / (na * nb)
}

pub fn bucket_distribution(similarity: f64) -> Option<SignalHit> {
    if similarity >= thresholds::distribution::HIGH {
        Some(SignalHit::new(
            SignalBucket::DistributionHigh,
            similarity,
            format!("distribution similarity {similarity:.2}"),
        ))
    } else if similarity >= thresholds::distribution::MEDIUM {
        Some(SignalHit::new(
            SignalBucket::DistributionMedium,
            similarity,
            format!("weak distribution similarity {similarity:.2}"),
        ))
    } else {
        None
    }
}

pub(crate) fn evaluate(pair: &ColumnPair<'_>) -> Option<SignalHit> {
    if !pair.both_populated() {
        return None;
    }
    bucket_distribution(cosine_similarity(
        &pair.source.frequencies,
        &pair.target.frequencies,
    ))
}
