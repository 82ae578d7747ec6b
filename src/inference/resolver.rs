//! Merging inferred relationships with declared and manual ones.
//!
//! Precedence, highest first:
//!
//! 1. **Declared** - schema declarations, then database constraints. A
//!    database constraint whose endpoints repeat a schema declaration is
//!    dropped.
//! 2. **Inferred** - dropped for any directed table pair that has a
//!    declaration, whatever the columns.
//! 3. **Manual** - always kept, always last.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::signals::SignalCategory;
use super::{ConfidenceTier, FiredSignal, RelationshipCandidate};

/// Where a relationship came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipSource {
    /// Declared in a schema document.
    Schema,
    /// Read from a database foreign-key constraint.
    #[serde(rename = "database")]
    DatabaseConstraint,
    /// Found by the inference engine.
    #[default]
    Inferred,
    /// Added by the user.
    Manual,
}

impl fmt::Display for RelationshipSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Schema => write!(f, "schema"),
            Self::DatabaseConstraint => write!(f, "database"),
            Self::Inferred => write!(f, "inferred"),
            Self::Manual => write!(f, "manual"),
        }
    }
}

/// Origin of a declared relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclaredSource {
    #[default]
    Schema,
    Database,
}

impl DeclaredSource {
    fn reason(self) -> &'static str {
        match self {
            Self::Schema => "declared in schema",
            Self::Database => "database foreign key constraint",
        }
    }
}

impl From<DeclaredSource> for RelationshipSource {
    fn from(source: DeclaredSource) -> Self {
        match source {
            DeclaredSource::Schema => Self::Schema,
            DeclaredSource::Database => Self::DatabaseConstraint,
        }
    }
}

/// A relationship known ahead of inference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclaredRelationship {
    pub from_table: String,
    #[serde(alias = "from_col")]
    pub from_column: String,
    pub to_table: String,
    #[serde(alias = "to_col")]
    pub to_column: String,
    #[serde(default)]
    pub source: DeclaredSource,
}

impl DeclaredRelationship {
    pub fn new(from_table: &str, from_column: &str, to_table: &str, to_column: &str) -> Self {
        Self {
            from_table: from_table.to_string(),
            from_column: from_column.to_string(),
            to_table: to_table.to_string(),
            to_column: to_column.to_string(),
            source: DeclaredSource::Schema,
        }
    }

    pub fn with_source(mut self, source: DeclaredSource) -> Self {
        self.source = source;
        self
    }
}

/// A relationship the user added by hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualRelationship {
    pub from_table: String,
    #[serde(alias = "from_col")]
    pub from_column: String,
    pub to_table: String,
    #[serde(alias = "to_col")]
    pub to_column: String,
}

impl ManualRelationship {
    pub fn new(from_table: &str, from_column: &str, to_table: &str, to_column: &str) -> Self {
        Self {
            from_table: from_table.to_string(),
            from_column: from_column.to_string(),
            to_table: to_table.to_string(),
            to_column: to_column.to_string(),
        }
    }
}

/// A resolved relationship of any origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub from_table: String,
    pub from_column: String,
    pub to_table: String,
    pub to_column: String,
    pub source: RelationshipSource,
    /// Originating signal, for inferred relationships only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detected_by: Option<SignalCategory>,
    pub confidence: ConfidenceTier,
    pub score: f64,
    pub reasons: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub signals: Vec<FiredSignal>,
}

impl Relationship {
    fn certain(
        from_table: &str,
        from_column: &str,
        to_table: &str,
        to_column: &str,
        source: RelationshipSource,
        reason: &str,
    ) -> Self {
        Self {
            from_table: from_table.to_string(),
            from_column: from_column.to_string(),
            to_table: to_table.to_string(),
            to_column: to_column.to_string(),
            source,
            detected_by: None,
            confidence: ConfidenceTier::High,
            score: 1.0,
            reasons: vec![reason.to_string()],
            signals: Vec::new(),
        }
    }

    /// Originating signal category for inferred relationships, else the
    /// source.
    pub fn origin(&self) -> String {
        match self.detected_by {
            Some(category) => category.label().to_string(),
            None => self.source.to_string(),
        }
    }

    pub fn key(&self) -> RelationshipKey {
        RelationshipKey::new(
            &self.from_table,
            &self.from_column,
            &self.to_table,
            &self.to_column,
        )
    }
}

impl From<&DeclaredRelationship> for Relationship {
    fn from(d: &DeclaredRelationship) -> Self {
        Self::certain(
            &d.from_table,
            &d.from_column,
            &d.to_table,
            &d.to_column,
            d.source.into(),
            d.source.reason(),
        )
    }
}

impl From<&ManualRelationship> for Relationship {
    fn from(m: &ManualRelationship) -> Self {
        Self::certain(
            &m.from_table,
            &m.from_column,
            &m.to_table,
            &m.to_column,
            RelationshipSource::Manual,
            "manual override",
        )
    }
}

impl From<RelationshipCandidate> for Relationship {
    fn from(c: RelationshipCandidate) -> Self {
        Self {
            from_table: c.from_table,
            from_column: c.from_column,
            to_table: c.to_table,
            to_column: c.to_column,
            source: RelationshipSource::Inferred,
            detected_by: Some(c.detected_by),
            confidence: c.confidence,
            score: c.score,
            reasons: c.reasons,
            signals: c.signals,
        }
    }
}

impl fmt::Display for Relationship {
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
            self.origin()
        )
    }
}

/// The four endpoints of a relationship. Names compare exactly.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub struct RelationshipKey {
    pub from_table: String,
    pub from_column: String,
    pub to_table: String,
    pub to_column: String,
}

impl RelationshipKey {
    #[must_use]
    pub fn new(from_table: &str, from_column: &str, to_table: &str, to_column: &str) -> Self {
        Self {
            from_table: from_table.to_string(),
            from_column: from_column.to_string(),
            to_table: to_table.to_string(),
            to_column: to_column.to_string(),
        }
    }
}

/// Merge declared, inferred and manual relationships.
///
/// Output order is schema declarations, database constraints, surviving
/// inferred, then manual; order within each group is preserved. Schema
/// declarations are all kept, repeats included. A database constraint is
/// dropped only when its endpoints repeat a schema declaration.
pub fn resolve(
    declared: &[DeclaredRelationship],
    inferred: Vec<RelationshipCandidate>,
    manual: &[ManualRelationship],
) -> Vec<Relationship> {
    let mut out: Vec<Relationship> =
        Vec::with_capacity(declared.len() + inferred.len() + manual.len());

    let (schema, database): (Vec<_>, Vec<_>) = declared
        .iter()
        .partition(|d| d.source == DeclaredSource::Schema);
    let schema_keys: HashSet<RelationshipKey> =
        schema.iter().map(|d| Relationship::from(*d).key()).collect();

    out.extend(schema.into_iter().map(Relationship::from));
    out.extend(
        database
            .into_iter()
            .map(Relationship::from)
            .filter(|rel| !schema_keys.contains(&rel.key())),
    );

    let declared_pairs: HashSet<(&str, &str)> = out
        .iter()
        .map(|rel| (rel.from_table.as_str(), rel.to_table.as_str()))
        .collect();
    let surviving: Vec<Relationship> = inferred
        .into_iter()
        .filter(|c| !declared_pairs.contains(&(c.from_table.as_str(), c.to_table.as_str())))
        .map(Relationship::from)
        .collect();

    out.extend(surviving);
    out.extend(manual.iter().map(Relationship::from));
    out
}
