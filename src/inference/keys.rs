//! Primary-key detection.
//!
//! At most one column per table is chosen, by the first rule that matches:
//!
//! 1. **Naming** - `id`, `{table}_id`, or an `_id` column whose stem the
//!    table name starts with. Uniqueness is not checked.
//! 2. **Content** - the first fully non-null, fully unique column with a
//!    key-like suffix, else the first fully non-null, fully unique column.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::table::{Column, Table};

use super::engine::DetectionMode;
use super::signals::naming::is_fk_name_for;
use super::signals::normalize::{has_key_suffix, normalize};

/// True if canonical column `column` names the key of canonical table `table`.
pub fn is_pk_name(column: &str, table: &str) -> bool {
    column == "id" || is_fk_name_for(column, table)
}

fn is_unique_non_null(column: &Column, row_count: usize) -> bool {
    column.null_count() == 0 && column.distinct_count() == row_count
}

/// Pick the primary-key column of `table`, if any.
pub fn detect_pk(table: &Table, mode: DetectionMode) -> Option<String> {
    if mode.uses_naming() {
        let table_name = normalize(&table.name);
        if let Some(col) = table
            .columns
            .iter()
            .find(|c| is_pk_name(&normalize(&c.name), &table_name))
        {
            return Some(col.name.clone());
        }
    }

    let rows = table.row_count();
    if mode.uses_content() && rows > 0 {
        let mut unique = table
            .columns
            .iter()
            .filter(|c| is_unique_non_null(c, rows));
        let first = unique.next()?;
        if has_key_suffix(&normalize(&first.name)) {
            return Some(first.name.clone());
        }
        let preferred = unique.find(|c| has_key_suffix(&normalize(&c.name)));
        return Some(preferred.unwrap_or(first).name.clone());
    }

    None
}

/// Table name → detected primary-key column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyColumnMap(BTreeMap<String, Option<String>>);

impl KeyColumnMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, table: impl Into<String>, column: Option<String>) {
        self.0.insert(table.into(), column);
    }

    /// Key column of `table`; `None` for unknown tables and tables without one.
    pub fn get(&self, table: &str) -> Option<&str> {
        self.0.get(table).and_then(|c| c.as_deref())
    }

    pub fn contains_table(&self, table: &str) -> bool {
        self.0.contains_key(table)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.0.iter().map(|(t, c)| (t.as_str(), c.as_deref()))
    }
}

/// Run [`detect_pk`] for every table.
///
/// Manual mode still reports keys, using both rule sets.
pub fn detect_keys(tables: &[Table], mode: DetectionMode) -> KeyColumnMap {
    let mode = match mode {
        DetectionMode::Manual => DetectionMode::Both,
        other => other,
    };
    let mut map = KeyColumnMap::new();
    for table in tables {
        map.insert(table.name.clone(), detect_pk(table, mode));
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pk_name_rules() {
        assert!(is_pk_name("id", "anything"));
        assert!(is_pk_name("order_id", "order"));
        assert!(is_pk_name("order_id", "orders"));
        assert!(!is_pk_name("customer_id", "orders"));
        assert!(!is_pk_name("order_key", "orders"));
    }

    #[test]
    fn test_naming_wins_over_uniqueness() {
        // "id" has duplicates but matches by name.
        let table = Table::new("Orders")
            .with_column("sku", ["a", "b", "c"])
            .with_column("ID", [1, 1, 2]);
        assert_eq!(detect_pk(&table, DetectionMode::Both).as_deref(), Some("ID"));
    }

    #[test]
    fn test_content_prefers_key_suffix() {
        let table = Table::new("stock")
            .with_column("label", ["x", "y", "z"])
            .with_column("item_code", ["a", "b", "c"]);
        assert_eq!(
            detect_pk(&table, DetectionMode::Content).as_deref(),
            Some("item_code")
        );
    }

    #[test]
    fn test_content_falls_back_to_first_unique() {
        let table = Table::new("stock")
            .with_column("qty", [1, 1, 2])
            .with_column("label", ["x", "y", "z"])
            .with_column("note", ["p", "q", "r"]);
        assert_eq!(
            detect_pk(&table, DetectionMode::Content).as_deref(),
            Some("label")
        );
    }

    #[test]
    fn test_nulls_disqualify() {
        let table = Table::new("stock").with_column("sku", [Some("a"), None, Some("c")]);
        assert_eq!(detect_pk(&table, DetectionMode::Content), None);
    }

    #[test]
    fn test_naming_only_ignores_content() {
        let table = Table::new("stock").with_column("sku", ["a", "b"]);
        assert_eq!(detect_pk(&table, DetectionMode::Naming), None);
    }

    #[test]
    fn test_empty_table_content() {
        let table = Table::new("stock").with_column("sku", Vec::<&str>::new());
        assert_eq!(detect_pk(&table, DetectionMode::Content), None);
    }

    #[test]
    fn test_detect_keys_manual_uses_both() {
        let tables = vec![
            Table::new("customers").with_column("customer_id", [1, 2]),
            Table::new("notes").with_column("body", ["a", "a"]),
        ];
        let keys = detect_keys(&tables, DetectionMode::Manual);
        assert_eq!(keys.get("customers"), Some("customer_id"));
        assert_eq!(keys.get("notes"), None);
        assert!(keys.contains_table("notes"));
        assert_eq!(keys.len(), 2);
    }

    #[test]
    fn test_key_map_serializes_as_object() {
        let mut keys = KeyColumnMap::new();
        keys.insert("a", Some("id".into()));
        keys.insert("b", None);
        assert_eq!(
            serde_json::to_string(&keys).unwrap(),
            r#"{"a":"id","b":null}"#
        );
    }
}
