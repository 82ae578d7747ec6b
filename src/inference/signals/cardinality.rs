//! Cardinality signal: both columns hold exactly the same set of values.

use std::collections::BTreeMap;

use super::{ColumnPair, SignalBucket, SignalHit};

/// True if both value sets are non-empty and identical.
///
/// Takes the frequency maps so the comparison walks sorted keys.
pub fn same_value_set(
    source: &BTreeMap<String, usize>,
    target: &BTreeMap<String, usize>,
) -> bool {
    !source.is_empty() && source.len() == target.len() && source.keys().eq(target.keys())
}

pub(crate) fn evaluate(pair: &ColumnPair<'_>) -> Option<SignalHit> {
    if !pair.both_populated() {
        return None;
    }
    same_value_set(&pair.source.frequencies, &pair.target.frequencies).then(|| {
        SignalHit::new(SignalBucket::CardinalityMatch, 1.0, "identical value sets")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(values: &[(&str, usize)]) -> BTreeMap<String, usize> {
        values.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_equal_sets_ignore_frequencies() {
        let a = counts(&[("x", 1), ("y", 5)]);
        let b = counts(&[("y", 1), ("x", 2)]);
        assert!(same_value_set(&a, &b));
    }

    #[test]
    fn test_subset_is_not_a_match() {
        let a = counts(&[("x", 1)]);
        let b = counts(&[("x", 1), ("y", 1)]);
        assert!(!same_value_set(&a, &b));
    }

    #[test]
    fn test_empty_sets_never_match() {
        assert!(!same_value_set(&BTreeMap::new(), &BTreeMap::new()));
    }
}
