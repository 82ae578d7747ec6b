//! Value overlap signal.

use std::collections::HashSet;

use crate::inference::thresholds;

use super::{ColumnPair, SignalBucket, SignalHit};

/// Fraction of the source's distinct values that also appear in the target.
///
/// An empty source overlaps nothing.
pub fn value_overlap(source: &HashSet<String>, target: &HashSet<String>) -> f64 {
    if source.is_empty() {
        return 0.0;
    }
    let shared = source.iter().filter(|v| target.contains(*v)).count();
    shared as f64 / source.len() as f64
}

pub fn bucket_overlap(overlap: f64) -> Option<SignalHit> {
    let pct = overlap * 100.0;
    if overlap >= thresholds::overlap::HIGH {
        Some(SignalHit::new(
            SignalBucket::OverlapHigh,
            overlap,
            format!("value overlap {pct:.0}%"),
        ))
    } else if overlap >= thresholds::overlap::MEDIUM {
        Some(SignalHit::new(
            SignalBucket::OverlapMedium,
            overlap,
            format!("partial overlap {pct:.0}%"),
        ))
    } else {
        None
    }
}

pub(crate) fn evaluate(pair: &ColumnPair<'_>) -> Option<SignalHit> {
    if !pair.both_populated() {
        return None;
    }
    bucket_overlap(value_overlap(
        &pair.source.distinct_capped,
        &pair.target.distinct_capped,
    ))
}
