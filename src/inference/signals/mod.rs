//! The signal library.
//!
//! Each signal scores one structural property of a (source column, target
//! column) pair and either stays silent or fires into a discrete
//! [`SignalBucket`]. Signals never look at each other; the scorer combines
//! whatever fired.
//!
//! | Kind | Buckets |
//! |------|---------|
//! | naming | exact / strong / weak |
//! | value overlap | high / medium |
//! | cardinality | match |
//! | format | match |
//! | distribution | high / medium |
//! | null pattern | match |

pub mod cardinality;
pub mod distribution;
pub mod format;
pub mod naming;
pub mod normalize;
pub mod null_pattern;
pub mod overlap;
pub mod similarity;

use std::fmt;

use serde::{Deserialize, Serialize};

use super::profile::ColumnProfile;

/// The independently switchable signal evaluators, in evaluation order.
///
/// Naming covers both exact naming conventions and fuzzy name similarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    Naming,
    ValueOverlap,
    Cardinality,
    Format,
    Distribution,
    NullPattern,
}

impl SignalKind {
    /// All kinds in evaluation order.
    pub const ALL: [SignalKind; 6] = [
        SignalKind::Naming,
        SignalKind::ValueOverlap,
        SignalKind::Cardinality,
        SignalKind::Format,
        SignalKind::Distribution,
        SignalKind::NullPattern,
    ];

    /// Run this signal on a column pair.
    pub(crate) fn evaluate(self, pair: &ColumnPair<'_>) -> Option<SignalHit> {
        match self {
            Self::Naming => naming::evaluate(pair),
            Self::ValueOverlap => overlap::evaluate(pair),
            Self::Cardinality => cardinality::evaluate(pair),
            Self::Format => format::evaluate(pair),
            Self::Distribution => distribution::evaluate(pair),
            Self::NullPattern => null_pattern::evaluate(pair),
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Naming => "naming",
            Self::ValueOverlap => "value_overlap",
            Self::Cardinality => "cardinality",
            Self::Format => "format",
            Self::Distribution => "distribution",
            Self::NullPattern => "null_pattern",
        };
        f.write_str(name)
    }
}

/// The category a fired bucket is reported under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalCategory {
    Naming,
    NameSimilarity,
    ValueOverlap,
    Cardinality,
    Format,
    Distribution,
    NullPattern,
}

impl SignalCategory {
    pub fn label(self) -> &'static str {
        match self {
            Self::Naming => "naming",
            Self::NameSimilarity => "name_similarity",
            Self::ValueOverlap => "value_overlap",
            Self::Cardinality => "cardinality",
            Self::Format => "format",
            Self::Distribution => "distribution",
            Self::NullPattern => "null_pattern",
        }
    }
}

impl fmt::Display for SignalCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A discrete outcome of one signal. Each bucket carries a fixed weight
/// (see [`crate::inference::scoring::BUCKET_WEIGHTS`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalBucket {
    NamingExact,
    NamingStrong,
    NamingWeak,
    OverlapHigh,
    OverlapMedium,
    CardinalityMatch,
    FormatMatch,
    DistributionHigh,
    DistributionMedium,
    NullPattern,
}

impl SignalBucket {
    pub fn category(self) -> SignalCategory {
        match self {
            Self::NamingExact => SignalCategory::Naming,
            Self::NamingStrong | Self::NamingWeak => SignalCategory::NameSimilarity,
            Self::OverlapHigh | Self::OverlapMedium => SignalCategory::ValueOverlap,
            Self::CardinalityMatch => SignalCategory::Cardinality,
            Self::FormatMatch => SignalCategory::Format,
            Self::DistributionHigh | Self::DistributionMedium => SignalCategory::Distribution,
            Self::NullPattern => SignalCategory::NullPattern,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::NamingExact => "naming_exact",
            Self::NamingStrong => "naming_strong",
            Self::NamingWeak => "naming_weak",
            Self::OverlapHigh => "overlap_high",
            Self::OverlapMedium => "overlap_medium",
            Self::CardinalityMatch => "cardinality_match",
            Self::FormatMatch => "format_match",
            Self::DistributionHigh => "distribution_high",
            Self::DistributionMedium => "distribution_medium",
            Self::NullPattern => "null_pattern",
        }
    }
}

impl fmt::Display for SignalBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A signal that fired.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalHit {
    pub bucket: SignalBucket,
    /// Raw measured value (similarity, overlap ratio, correlation...).
    pub value: f64,
    /// Human-readable explanation.
    pub reason: String,
}

impl SignalHit {
    pub fn new(bucket: SignalBucket, value: f64, reason: impl Into<String>) -> Self {
        Self {
            bucket,
            value,
            reason: reason.into(),
        }
    }
}

/// The two column profiles a signal compares.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ColumnPair<'a> {
    pub source: &'a ColumnProfile,
    pub target: &'a ColumnProfile,
}

impl ColumnPair<'_> {
    /// Value-based signals need rows on both sides.
    pub fn both_populated(&self) -> bool {
        self.source.row_count > 0 && self.target.row_count > 0
    }
}
