//! Column profiles.
//!
//! Every statistic a signal needs is computed once per column per detection
//! run, so the pairwise search only compares precomputed summaries.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::table::{Column, Table, TypeClass};

use super::keys::KeyColumnMap;
use super::resolver::Relationship;
use super::signals::format::FormatCatalog;
use super::signals::normalize::normalize;

/// Knobs for profile construction.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ProfileOptions<'a> {
    /// Keep at most this many distinct values for overlap.
    pub distinct_cap: usize,
    /// Number of values sampled by the format fingerprint.
    pub format_sample: usize,
    /// Format catalog; `None` skips fingerprinting.
    pub formats: Option<&'a FormatCatalog>,
}

/// Precomputed statistics for one column.
#[derive(Debug, Clone)]
pub struct ColumnProfile {
    pub name: String,
    pub canonical: String,
    /// Canonical name of the owning table.
    pub table_canonical: String,
    pub type_class: TypeClass,
    /// Row count of the owning table.
    pub row_count: usize,
    /// `true` where the cell is null.
    pub null_mask: Vec<bool>,
    /// First `distinct_cap` distinct values in order of appearance.
    pub distinct_capped: HashSet<String>,
    /// Value frequencies over all non-null cells.
    pub frequencies: BTreeMap<String, usize>,
    /// Format fingerprint, when one was requested and matched.
    pub format: Option<String>,
}

impl ColumnProfile {
    pub(crate) fn build(
        column: &Column,
        table_canonical: &str,
        row_count: usize,
        options: &ProfileOptions<'_>,
    ) -> Self {
        let null_mask: Vec<bool> = column.values.iter().map(|v| v.is_null()).collect();

        let mut distinct_capped = HashSet::new();
        let mut frequencies: BTreeMap<String, usize> = BTreeMap::new();
        let mut rendered = Vec::with_capacity(column.len());

        for value in column.rendered() {
            if distinct_capped.len() < options.distinct_cap && !distinct_capped.contains(&*value) {
                distinct_capped.insert(value.to_string());
            }
            *frequencies.entry(value.to_string()).or_insert(0) += 1;
            rendered.push(value);
        }

        let format = match options.formats {
            Some(catalog) if row_count > 0 => catalog
                .fingerprint(&rendered, options.format_sample)
                .map(str::to_string),
            _ => None,
        };

        Self {
            name: column.name.clone(),
            canonical: normalize(&column.name),
            table_canonical: table_canonical.to_string(),
            type_class: column.type_class(),
            row_count,
            null_mask,
            distinct_capped,
            frequencies,
            format,
        }
    }

    pub fn null_count(&self) -> usize {
        self.null_mask.iter().filter(|n| **n).count()
    }

    pub fn distinct_count(&self) -> usize {
        self.frequencies.len()
    }

    /// Fully non-null with one distinct value per row.
    pub fn is_key_like(&self) -> bool {
        self.row_count > 0 && self.null_count() == 0 && self.distinct_count() == self.row_count
    }
}

/// Profiles for every column of one table.
#[derive(Debug, Clone)]
pub struct TableProfile {
    pub name: String,
    pub canonical: String,
    pub row_count: usize,
    pub columns: Vec<ColumnProfile>,
}

impl TableProfile {
    pub(crate) fn build(table: &Table, options: &ProfileOptions<'_>) -> Self {
        let canonical = normalize(&table.name);
        let row_count = table.row_count();
        let columns = table
            .columns
            .iter()
            .map(|c| ColumnProfile::build(c, &canonical, row_count, options))
            .collect();

        Self {
            name: table.name.clone(),
            canonical,
            row_count,
            columns,
        }
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, name: &str) -> Option<&ColumnProfile> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Structurally unique columns.
    pub fn key_like(&self) -> impl Iterator<Item = &ColumnProfile> {
        self.columns.iter().filter(|c| c.is_key_like())
    }
}

/// One row of a per-table column report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnSummary {
    pub table: String,
    pub column: String,
    #[serde(rename = "type")]
    pub type_class: TypeClass,
    pub non_null: usize,
    pub unique: usize,
    pub primary_key: bool,
    pub foreign_key: bool,
}

/// Column report for every table, in table then column order.
///
/// A column is a primary key when `keys` names it, and a foreign key when a
/// relationship starts from it.
pub fn summarize(
    tables: &[Table],
    keys: &KeyColumnMap,
    relationships: &[Relationship],
) -> Vec<ColumnSummary> {
    let options = ProfileOptions {
        distinct_cap: 0,
        format_sample: 0,
        formats: None,
    };

    tables
        .iter()
        .flat_map(|table| {
            let pk = keys.get(&table.name);
            TableProfile::build(table, &options)
                .columns
                .into_iter()
                .map(move |c| ColumnSummary {
                    table: table.name.clone(),
                    primary_key: pk == Some(c.name.as_str()),
                    foreign_key: relationships
                        .iter()
                        .any(|r| r.from_table == table.name && r.from_column == c.name),
                    type_class: c.type_class,
                    non_null: c.row_count - c.null_count(),
                    unique: c.distinct_count(),
                    column: c.name,
                })
        })
        .collect()
}
