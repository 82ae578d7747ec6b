//! Pairwise search over all source/target column combinations.
//!
//! For every source table, every non-key-like column is compared against the
//! candidate targets of every other table. Only the best target per
//! (source column, target table) survives, then the confidence and near-best
//! filters run, and the result is ordered by tier and score.
//!
//! The search is quadratic. Source tables above [`SearchLimits`] only look
//! at key-named targets.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace};

use crate::table::Table;

use super::keys::{self, KeyColumnMap};
use super::profile::{ColumnProfile, ProfileOptions, TableProfile};
use super::scoring::CandidateScorer;
use super::signals::format::FormatCatalog;
use super::signals::SignalKind;
use super::{ConfidenceTier, RelationshipCandidate};

static KEY_NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(_id|_key|id$|key$)").unwrap());

/// What kind of evidence a detection run may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectionMode {
    /// Column and table names only.
    Naming,
    /// Column values only.
    Content,
    #[default]
    Both,
    /// Relationships come from the user; nothing is inferred.
    Manual,
}

impl DetectionMode {
    pub fn uses_naming(self) -> bool {
        matches!(self, Self::Naming | Self::Both)
    }

    pub fn uses_content(self) -> bool {
        matches!(self, Self::Content | Self::Both)
    }
}

impl fmt::Display for DetectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Naming => write!(f, "naming"),
            Self::Content => write!(f, "content"),
            Self::Both => write!(f, "both"),
            Self::Manual => write!(f, "manual"),
        }
    }
}

impl std::str::FromStr for DetectionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "naming" => Ok(Self::Naming),
            "content" => Ok(Self::Content),
            "both" => Ok(Self::Both),
            "manual" => Ok(Self::Manual),
            other => Err(format!("unknown detection mode '{other}'")),
        }
    }
}

/// Per-signal switches. Naming covers both exact and fuzzy name matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionFlags {
    pub naming: bool,
    pub value_overlap: bool,
    pub cardinality: bool,
    pub format: bool,
    pub distribution: bool,
    pub null_pattern: bool,
}

impl Default for DetectionFlags {
    fn default() -> Self {
        Self::all()
    }
}

impl DetectionFlags {
    pub fn all() -> Self {
        Self::for_mode(DetectionMode::Both)
    }

    pub fn none() -> Self {
        Self::for_mode(DetectionMode::Manual)
    }

    /// Flags implied by a mode when none are given explicitly.
    pub fn for_mode(mode: DetectionMode) -> Self {
        let naming = mode.uses_naming();
        let content = mode.uses_content();
        Self {
            naming,
            value_overlap: content,
            cardinality: content,
            format: content,
            distribution: content,
            null_pattern: content,
        }
    }

    pub fn enabled(&self, kind: SignalKind) -> bool {
        match kind {
            SignalKind::Naming => self.naming,
            SignalKind::ValueOverlap => self.value_overlap,
            SignalKind::Cardinality => self.cardinality,
            SignalKind::Format => self.format,
            SignalKind::Distribution => self.distribution,
            SignalKind::NullPattern => self.null_pattern,
        }
    }

    pub fn any_content(&self) -> bool {
        self.value_overlap
            || self.cardinality
            || self.format
            || self.distribution
            || self.null_pattern
    }

    /// Builder: switch one signal on or off.
    pub fn with(mut self, kind: SignalKind, on: bool) -> Self {
        let slot = match kind {
            SignalKind::Naming => &mut self.naming,
            SignalKind::ValueOverlap => &mut self.value_overlap,
            SignalKind::Cardinality => &mut self.cardinality,
            SignalKind::Format => &mut self.format,
            SignalKind::Distribution => &mut self.distribution,
            SignalKind::NullPattern => &mut self.null_pattern,
        };
        *slot = on;
        self
    }
}

/// Numeric bounds of the search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchLimits {
    /// Source tables with more rows are restricted to key-named targets.
    pub large_table_rows: usize,
    /// Source tables with more columns are restricted to key-named targets.
    pub large_table_columns: usize,
    /// Distinct values kept per column for the overlap signal.
    pub overlap_distinct_cap: usize,
    /// Non-null values sampled by the format fingerprint.
    pub format_sample_size: usize,
    /// Near-best filter tolerance.
    pub near_best_margin: f64,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            large_table_rows: 150_000,
            large_table_columns: 300,
            overlap_distinct_cap: 50_000,
            format_sample_size: 200,
            near_best_margin: 0.05,
        }
    }
}

impl SearchLimits {
    pub fn is_large(&self, rows: usize, columns: usize) -> bool {
        rows > self.large_table_rows || columns > self.large_table_columns
    }
}

/// Configuration for the detection engine.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub mode: DetectionMode,
    /// Candidates below this tier are dropped.
    pub min_confidence: ConfidenceTier,
    /// Explicit signal switches; derived from `mode` when `None`.
    pub flags: Option<DetectionFlags>,
    pub limits: SearchLimits,
    pub formats: FormatCatalog,
}

impl EngineConfig {
    pub fn new(mode: DetectionMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn with_mode(mut self, mode: DetectionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_min_confidence(mut self, tier: ConfidenceTier) -> Self {
        self.min_confidence = tier;
        self
    }

    pub fn with_flags(mut self, flags: DetectionFlags) -> Self {
        self.flags = Some(flags);
        self
    }

    pub fn with_limits(mut self, limits: SearchLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_formats(mut self, formats: FormatCatalog) -> Self {
        self.formats = formats;
        self
    }

    /// Explicit flags if set, else the ones implied by the mode.
    pub fn effective_flags(&self) -> DetectionFlags {
        self.flags
            .unwrap_or_else(|| DetectionFlags::for_mode(self.mode))
    }
}

/// Keys and relationships of one detection run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub keys: KeyColumnMap,
    pub relationships: Vec<RelationshipCandidate>,
}

/// Remembers the last accepted score per source column and rejects
/// candidates that fall more than `margin` below it.
///
/// The running score is replaced on every acceptance, so the outcome depends
/// on the order candidates arrive in.
#[derive(Debug, Clone)]
pub struct NearBestFilter<K> {
    margin: f64,
    running: HashMap<K, f64>,
}

impl<K: Eq + Hash> NearBestFilter<K> {
    pub fn new(margin: f64) -> Self {
        Self {
            margin,
            running: HashMap::new(),
        }
    }

    /// Returns `true` and records `score` if the candidate is kept.
    pub fn admit(&mut self, key: K, score: f64) -> bool {
        if let Some(&running) = self.running.get(&key) {
            if running > score + self.margin {
                return false;
            }
        }
        self.running.insert(key, score);
        true
    }
}

/// The detection engine. Holds configuration only.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn detect_keys(&self, tables: &[Table]) -> KeyColumnMap {
        keys::detect_keys(tables, self.config.mode)
    }

    /// Score every source column against every other table and return the
    /// surviving candidates, strongest first.
    #[instrument(skip_all, fields(tables = tables.len(), mode = %self.config.mode))]
    pub fn detect_relationships(&self, tables: &[Table]) -> Vec<RelationshipCandidate> {
        if tables.len() < 2 || self.config.mode == DetectionMode::Manual {
            debug!("nothing to infer");
            return Vec::new();
        }

        let flags = self.config.effective_flags();
        let limits = &self.config.limits;
        let scorer = CandidateScorer::new(flags);
        let options = ProfileOptions {
            distinct_cap: limits.overlap_distinct_cap,
            format_sample: limits.format_sample_size,
            formats: flags.format.then_some(&self.config.formats),
        };
        let profiles: Vec<TableProfile> = tables
            .iter()
            .map(|t| TableProfile::build(t, &options))
            .collect();

        let mut results = Vec::new();
        let mut near_best = NearBestFilter::new(limits.near_best_margin);
        let mut scored_pairs = 0usize;

        for (i, source_table) in profiles.iter().enumerate() {
            if source_table.row_count == 0 && !flags.naming {
                trace!(table = %source_table.name, "skipping empty source table");
                continue;
            }
            let restricted = limits.is_large(source_table.row_count, source_table.column_count());
            if restricted {
                debug!(table = %source_table.name, "large source table, key-named targets only");
            }

            for (c, source) in source_table.columns.iter().enumerate() {
                if source.is_key_like() {
                    continue;
                }

                for (j, target_table) in profiles.iter().enumerate() {
                    if i == j {
                        continue;
                    }

                    let mut best: Option<RelationshipCandidate> = None;
                    for target in target_columns(target_table, restricted) {
                        scored_pairs += 1;
                        let Some(candidate) =
                            scorer.score(&source_table.name, source, &target_table.name, target)
                        else {
                            continue;
                        };
                        if best.as_ref().map_or(true, |b| candidate.score > b.score) {
                            best = Some(candidate);
                        }
                    }

                    let Some(best) = best else { continue };
                    if best.confidence < self.config.min_confidence {
                        trace!(candidate = %best, "below minimum confidence");
                        continue;
                    }
                    if !near_best.admit((i, c), best.score) {
                        trace!(candidate = %best, "not near the best score for this column");
                        continue;
                    }
                    results.push(best);
                }
            }
        }

        results.sort_by(|a, b| {
            b.confidence
                .cmp(&a.confidence)
                .then_with(|| b.score.total_cmp(&a.score))
        });

        debug!(
            scored_pairs,
            relationships = results.len(),
            "relationship detection finished"
        );
        results
    }

    pub fn analyze(&self, tables: &[Table]) -> Analysis {
        Analysis {
            keys: self.detect_keys(tables),
            relationships: self.detect_relationships(tables),
        }
    }
}

/// Key-like columns of the target, or all of them when it has none.
fn target_columns(table: &TableProfile, restricted: bool) -> Vec<&ColumnProfile> {
    let mut targets: Vec<&ColumnProfile> = table.key_like().collect();
    if targets.is_empty() {
        targets = table.columns.iter().collect();
    }
    if restricted {
        targets.retain(|t| KEY_NAME_PATTERN.is_match(&t.canonical));
    }
    targets
}

/// Run detection with the default limits and format catalog.
pub fn detect_relationships(
    tables: &[Table],
    mode: DetectionMode,
    min_confidence: ConfidenceTier,
    flags: Option<&DetectionFlags>,
) -> Vec<RelationshipCandidate> {
    let mut config = EngineConfig::new(mode).with_min_confidence(min_confidence);
    config.flags = flags.copied();
    Engine::new(config).detect_relationships(tables)
}
