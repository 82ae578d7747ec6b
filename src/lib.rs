//! # Cartographer
//!
//! Primary-key and foreign-key discovery across independently loaded tables.
//!
//! ## Architecture
//!
//! Cartographer scores every plausible column pair with independent signals
//! and keeps the strongest, explainable candidates:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                 Tables (CSV, in-memory)                  │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [keys]
//! ┌─────────────────────────────────────────────────────────┐
//! │          KeyColumnMap (one primary key per table)        │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [profile + engine]
//! ┌─────────────────────────────────────────────────────────┐
//! │      Pairwise search (bounded, best target per pair)     │
//! │      + Scoring (signals combined with noisy-OR)          │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [resolver]
//! ┌─────────────────────────────────────────────────────────┐
//! │     Relationships (declared > inferred, manual last)     │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod cache;
pub mod config;
pub mod inference;
pub mod loader;
pub mod table;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::config::Settings;
    pub use crate::inference::{
        detect_keys, detect_pk, detect_relationships, resolve, Analysis, ConfidenceTier,
        DeclaredRelationship, DetectionFlags, DetectionMode, Engine, EngineConfig, KeyColumnMap,
        ManualRelationship, Relationship, RelationshipCandidate, RelationshipSource,
    };
    pub use crate::table::{Column, Table, TypeClass, Value};
}
