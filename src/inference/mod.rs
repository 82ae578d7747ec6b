//! Relationship inference for tables without a declared schema.
//!
//! The engine finds, for every pair of tables, the column pairs that look like
//! a foreign key pointing at a key. It never reads files and keeps no state
//! between calls.
//!
//! # Architecture
//!
//! 1. **Key detection** - pick at most one primary-key column per table
//!    ([`keys`]).
//! 2. **Profiling** - summarize every column once ([`profile`]).
//! 3. **Pairwise search** - walk source columns against candidate targets,
//!    bounded for large tables ([`engine`]).
//! 4. **Scoring** - run the enabled signals ([`signals`]) and combine whatever
//!    fired with noisy-OR ([`scoring`]).
//! 5. **Resolution** - merge inferred results with declared and manual
//!    relationships ([`resolver`]).
//!
//! # Example
//!
//! ```
//! use cartographer::inference::{detect_relationships, ConfidenceTier, DetectionMode};
//! use cartographer::table::Table;
//!
//! let orders = Table::new("orders")
//!     .with_column("order_id", [10, 11, 12, 13])
//!     .with_column("customer_id", [1, 2, 2, 3]);
//! let customers = Table::new("customers")
//!     .with_column("customer_id", [1, 2, 3])
//!     .with_column("name", ["ann", "bob", "cy"]);
//!
//! let rels = detect_relationships(
//!     &[orders, customers],
//!     DetectionMode::Both,
//!     ConfidenceTier::Medium,
//!     None,
//! );
//! assert_eq!(rels[0].to_string(), "orders.customer_id -> customers.customer_id (high, 1.000, naming)");
//! ```

pub mod engine;
mod error;
pub mod keys;
pub mod profile;
pub mod resolver;
pub mod scoring;
pub mod signals;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use engine::{
    detect_relationships, Analysis, DetectionFlags, DetectionMode, Engine, EngineConfig,
    SearchLimits,
};
pub use error::{InferenceError, InferenceResult};
pub use keys::{detect_keys, detect_pk, KeyColumnMap};
pub use profile::{summarize, ColumnSummary};
pub use resolver::{
    resolve, DeclaredRelationship, DeclaredSource, ManualRelationship, Relationship,
    RelationshipKey, RelationshipSource,
};
pub use scoring::{composite_score, noisy_or, score_candidate, CandidateScorer, BUCKET_WEIGHTS};
pub use signals::{SignalBucket, SignalCategory, SignalHit, SignalKind};

/// Named thresholds used across the signal library and scorer.
pub mod thresholds {
    /// Fuzzy column-name similarity.
    pub mod naming {
        pub const STRONG: f64 = 0.85;
        pub const WEAK: f64 = 0.72;
    }

    /// Share of source distinct values found in the target.
    pub mod overlap {
        pub const HIGH: f64 = 0.98;
        pub const MEDIUM: f64 = 0.80;
    }

    /// Cosine similarity of frequency vectors.
    pub mod distribution {
        pub const HIGH: f64 = 0.90;
        pub const MEDIUM: f64 = 0.75;
    }

    pub mod null_pattern {
        /// Minimum Pearson correlation of null masks.
        pub const MIN: f64 = 0.80;
    }

    pub mod format {
        /// Share of the sample a format must match.
        pub const MATCH_RATIO: f64 = 0.80;
    }

    /// Composite score → tier cut-offs, both inclusive.
    pub mod tier {
        pub const HIGH: f64 = 0.85;
        pub const MEDIUM: f64 = 0.55;
    }
}

/// Coarse confidence bucket of a composite score.
///
/// Ordered `Low < Medium < High` so a minimum tier can be compared directly.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceTier {
    Low,
    #[default]
    Medium,
    High,
}

impl ConfidenceTier {
    pub fn from_score(score: f64) -> Self {
        if score >= thresholds::tier::HIGH {
            Self::High
        } else if score >= thresholds::tier::MEDIUM {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for ConfidenceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ConfidenceTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(format!("unknown confidence tier '{other}'")),
        }
    }
}

/// One bucket that fired, with the raw measured value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FiredSignal {
    pub bucket: SignalBucket,
    pub value: f64,
}

/// A scored foreign-key candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipCandidate {
    pub from_table: String,
    pub from_column: String,
    pub to_table: String,
    pub to_column: String,
    /// Category of the highest-weight bucket that fired.
    pub detected_by: SignalCategory,
    pub confidence: ConfidenceTier,
    /// Noisy-OR composite, rounded to three decimals.
    pub score: f64,
    /// Explanations in evaluation order.
    pub reasons: Vec<String>,
    /// Fired buckets in evaluation order.
    pub signals: Vec<FiredSignal>,
}

impl RelationshipCandidate {
    /// Raw value of a fired bucket, if it fired.
    pub fn signal(&self, bucket: SignalBucket) -> Option<f64> {
        self.signals
            .iter()
            .find(|s| s.bucket == bucket)
            .map(|s| s.value)
    }

    pub fn has_signal(&self, bucket: SignalBucket) -> bool {
        self.signal(bucket).is_some()
    }
}

impl fmt::Display for RelationshipCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{} -> {}.{} ({}, {:.3}, {})",
            self.from_table,
            self.from_column,
            self.to_table,
            self.to_column,
            self.confidence,
            self.score,
            self.detected_by
        )
    }
}
