//! Naming signals.
//!
//! Two rules, tried in order:
//!
//! 1. **Exact convention** - the source column is `{target_table}_id`, or ends
//!    in `_id` with a stem the target table name starts with
//!    (`customer_id` → `customers`).
//! 2. **Fuzzy similarity** - Jaro-Winkler of the stemmed source and target
//!    column names.
//!
//! Exact matching ignores the target column; it only says the source column
//! points at the target table.

use crate::inference::thresholds;

use super::normalize::{id_stem, stem};
use super::similarity::jaro_winkler;
use super::{ColumnPair, SignalBucket, SignalHit};

/// True if canonical column `column` follows the FK convention for canonical
/// table `table`.
pub fn is_fk_name_for(column: &str, table: &str) -> bool {
    if column == format!("{table}_id") {
        return true;
    }
    column.ends_with("_id") && table.starts_with(id_stem(column))
}

/// Score canonical names directly.
pub fn score_names(
    source_column: &str,
    target_column: &str,
    target_table: &str,
) -> Option<SignalHit> {
    if is_fk_name_for(source_column, target_table) {
        return Some(SignalHit::new(SignalBucket::NamingExact, 1.0, "exact FK naming"));
    }

    let sim = jaro_winkler(stem(source_column), stem(target_column));
    if sim >= thresholds::naming::STRONG {
        Some(SignalHit::new(
            SignalBucket::NamingStrong,
            sim,
            format!("name similarity {sim:.2}"),
        ))
    } else if sim >= thresholds::naming::WEAK {
        Some(SignalHit::new(
            SignalBucket::NamingWeak,
            sim,
            format!("weak name similarity {sim:.2}"),
        ))
    } else {
        None
    }
}

pub(crate) fn evaluate(pair: &ColumnPair<'_>) -> Option<SignalHit> {
    score_names(
        &pair.source.canonical,
        &pair.target.canonical,
        &pair.target.table_canonical,
    )
}
