//! In-memory memo of detection results.
//!
//! The engine keeps no state between calls; callers that re-run detection on
//! unchanged input can key results by [`fingerprint`] instead.
//!
//! # Design
//!
//! - Keyed by a SHA-256 fingerprint of the tables and engine parameters
//! - Per process only, nothing is written to disk
//! - No eviction; call [`ResultCache::clear`] to drop entries

mod hash;
pub use hash::{compute_hash, fingerprint};

use std::collections::HashMap;

use tracing::debug;

use crate::inference::{Analysis, Engine};
use crate::table::Table;

/// Errors that can occur during cache operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type CacheResult<T> = Result<T, CacheError>;

/// Fingerprint → analysis memo.
///
/// Library-only: for long-lived callers that re-run detection on the same
/// tables. The `cartographer` binary runs once per process and does not use
/// it.
#[derive(Debug, Default)]
pub struct ResultCache {
    entries: HashMap<String, Analysis>,
    hits: u64,
    misses: u64,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached analysis for this input, running the engine on a
    /// miss.
    pub fn get_or_analyze(&mut self, engine: &Engine, tables: &[Table]) -> CacheResult<&Analysis> {
        let key = fingerprint(tables, engine.config())?;
        if self.entries.contains_key(&key) {
            self.hits += 1;
            debug!(key = %key, "detection cache hit");
        } else {
            self.misses += 1;
            debug!(key = %key, "detection cache miss");
            self.entries.insert(key.clone(), engine.analyze(tables));
        }
        Ok(&self.entries[&key])
    }

    pub fn get(&self, key: &str) -> Option<&Analysis> {
        self.entries.get(key)
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::{ConfidenceTier, EngineConfig};

    fn tables() -> Vec<Table> {
        vec![
            Table::new("orders").with_column("customer_id", [1, 2, 2]),
            Table::new("customers").with_column("customer_id", [1, 2]),
        ]
    }

    #[test]
    fn test_second_call_hits() {
        let engine = Engine::default();
        let mut cache = ResultCache::new();

        let first = cache.get_or_analyze(&engine, &tables()).unwrap().clone();
        let second = cache.get_or_analyze(&engine, &tables()).unwrap().clone();

        assert_eq!(first, second);
        assert_eq!(cache.hits(), 1);
        assert_eq!(cache.misses(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_parameters_change_the_key() {
        let mut cache = ResultCache::new();
        cache.get_or_analyze(&Engine::default(), &tables()).unwrap();
        let high = Engine::new(EngineConfig::default().with_min_confidence(ConfidenceTier::High));
        cache.get_or_analyze(&high, &tables()).unwrap();

        assert_eq!(cache.misses(), 2);
        assert_eq!(cache.len(), 2);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_get_by_fingerprint() {
        let engine = Engine::default();
        let mut cache = ResultCache::new();
        cache.get_or_analyze(&engine, &tables()).unwrap();

        let key = fingerprint(&tables(), engine.config()).unwrap();
        let cached = cache.get(&key).unwrap();
        assert_eq!(cached.relationships.len(), 1);
    }
}
