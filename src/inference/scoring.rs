//! Candidate scoring.
//!
//! A candidate's score is the noisy-OR of the weights of every bucket that
//! fired: each signal is treated as independent evidence, so agreeing signals
//! push the score towards 1.0 without any single weak signal being able to
//! dominate.

use crate::table::Table;

use super::engine::{DetectionFlags, SearchLimits};
use super::error::{InferenceError, InferenceResult};
use super::profile::{ColumnProfile, ProfileOptions};
use super::signals::format::FormatCatalog;
use super::signals::normalize::normalize;
use super::signals::{ColumnPair, SignalBucket, SignalCategory, SignalHit, SignalKind};
use super::{ConfidenceTier, FiredSignal, RelationshipCandidate};

/// Bucket → weight table, ordered by descending weight.
pub const BUCKET_WEIGHTS: [(SignalBucket, f64); 10] = [
    (SignalBucket::NamingExact, 1.00),
    (SignalBucket::CardinalityMatch, 0.95),
    (SignalBucket::OverlapHigh, 0.90),
    (SignalBucket::NamingStrong, 0.60),
    (SignalBucket::OverlapMedium, 0.55),
    (SignalBucket::DistributionHigh, 0.50),
    (SignalBucket::FormatMatch, 0.40),
    (SignalBucket::DistributionMedium, 0.30),
    (SignalBucket::NamingWeak, 0.25),
    (SignalBucket::NullPattern, 0.20),
];

impl SignalBucket {
    pub fn weight(self) -> f64 {
        BUCKET_WEIGHTS
            .iter()
            .find(|(b, _)| *b == self)
            .map_or(0.0, |(_, w)| *w)
    }
}

/// `1 - Π(1 - w)`; 0.0 for no weights.
pub fn noisy_or(weights: impl IntoIterator<Item = f64>) -> f64 {
    1.0 - weights
        .into_iter()
        .fold(1.0, |miss, w| miss * (1.0 - w.clamp(0.0, 1.0)))
}

/// Noisy-OR over bucket weights, rounded to three decimals and capped at 1.0.
pub fn composite_score(buckets: impl IntoIterator<Item = SignalBucket>) -> f64 {
    let raw = noisy_or(buckets.into_iter().map(SignalBucket::weight));
    ((raw * 1000.0).round() / 1000.0).min(1.0)
}

/// Category of the highest-weight hit; the earliest wins ties.
fn originating_category(hits: &[SignalHit]) -> Option<SignalCategory> {
    let mut best: Option<&SignalHit> = None;
    for hit in hits {
        if best.map_or(true, |b| hit.bucket.weight() > b.bucket.weight()) {
            best = Some(hit);
        }
    }
    best.map(|h| h.bucket.category())
}

/// Runs the enabled signals on column pairs and builds candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidateScorer {
    flags: DetectionFlags,
}

impl CandidateScorer {
    pub fn new(flags: DetectionFlags) -> Self {
        Self { flags }
    }

    pub fn flags(&self) -> &DetectionFlags {
        &self.flags
    }

    /// Score one source/target pair. `None` when the type classes differ or
    /// no signal fired.
    pub fn score(
        &self,
        from_table: &str,
        source: &ColumnProfile,
        to_table: &str,
        target: &ColumnProfile,
    ) -> Option<RelationshipCandidate> {
        if source.type_class != target.type_class {
            return None;
        }

        let pair = ColumnPair { source, target };
        let hits: Vec<SignalHit> = SignalKind::ALL
            .into_iter()
            .filter(|kind| self.flags.enabled(*kind))
            .filter_map(|kind| kind.evaluate(&pair))
            .collect();

        let detected_by = originating_category(&hits)?;
        let score = composite_score(hits.iter().map(|h| h.bucket));

        let mut reasons = Vec::with_capacity(hits.len());
        let mut signals = Vec::with_capacity(hits.len());
        for hit in hits {
            signals.push(FiredSignal {
                bucket: hit.bucket,
                value: hit.value,
            });
            reasons.push(hit.reason);
        }

        Some(RelationshipCandidate {
            from_table: from_table.to_string(),
            from_column: source.name.clone(),
            to_table: to_table.to_string(),
            to_column: target.name.clone(),
            detected_by,
            confidence: ConfidenceTier::from_score(score),
            score,
            reasons,
            signals,
        })
    }
}

/// Score a single named column pair with the default limits and format
/// catalog.
///
/// Returns `Ok(None)` when the pair produces no candidate.
pub fn score_candidate(
    source_table: &Table,
    source_column: &str,
    target_table: &Table,
    target_column: &str,
    flags: &DetectionFlags,
) -> InferenceResult<Option<RelationshipCandidate>> {
    let unknown = |table: &Table, column: &str| InferenceError::UnknownColumn {
        table: table.name.clone(),
        column: column.to_string(),
    };
    let src = source_table
        .column(source_column)
        .ok_or_else(|| unknown(source_table, source_column))?;
    let tgt = target_table
        .column(target_column)
        .ok_or_else(|| unknown(target_table, target_column))?;

    let limits = SearchLimits::default();
    let catalog = FormatCatalog::builtin();
    let options = ProfileOptions {
        distinct_cap: limits.overlap_distinct_cap,
        format_sample: limits.format_sample_size,
        formats: flags.format.then_some(&catalog),
    };

    let source = ColumnProfile::build(
        src,
        &normalize(&source_table.name),
        source_table.row_count(),
        &options,
    );
    let target = ColumnProfile::build(
        tgt,
        &normalize(&target_table.name),
        target_table.row_count(),
        &options,
    );

    Ok(CandidateScorer::new(*flags).score(&source_table.name, &source, &target_table.name, &target))
}
