//! Null-position correlation signal.
//!
//! Only meaningful for tables of equal length, where row `i` on one side can
//! be lined up with row `i` on the other.

use crate::inference::thresholds;

use super::{ColumnPair, SignalBucket, SignalHit};

/// Pearson correlation of two null masks.
///
/// `None` when the lengths differ, there are fewer than two rows, or either
/// mask has zero variance (all null or no nulls at all).
pub fn pearson(a: &[bool], b: &[bool]) -> Option<f64> {
    let n = a.len();
    if n != b.len() || n < 2 {
        return None;
    }
    let as_f = |x: bool| if x { 1.0 } else { 0.0 };
    let mean_a = a.iter().filter(|x| **x).count() as f64 / n as f64;
    let mean_b = b.iter().filter(|x| **x).count() as f64 / n as f64;

    let (mut cov, mut var_a, mut var_b) = (0.0, 0.0, 0.0);
    for (x, y) in a.iter().zip(b) {
        let dx = as_f(*x) - mean_a;
        let dy = as_f(*y) - mean_b;
        cov += dx * dy;
        var_a += dx * dx;
        var_b += dy * dy;
    }
    if var_a == 0.0 || var_b == 0.0 {
        return None;
    }
    Some(cov / (var_a.sqrt() * var_b.sqrt()))
}

pub(crate) fn evaluate(pair: &ColumnPair<'_>) -> Option<SignalHit> {
    if pair.source.row_count != pair.target.row_count {
        return None;
    }
    let r = pearson(&pair.source.null_mask, &pair.target.null_mask)?;
    (r >= thresholds::null_pattern::MIN).then(|| {
        SignalHit::new(
            SignalBucket::NullPattern,
            r,
            format!("null pattern corr {r:.2}"),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_masks() {
        let m = [true, false, false, true];
        assert!((pearson(&m, &m).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_inverted_masks() {
        let a = [true, false, true, false];
        let b = [false, true, false, true];
        assert!((pearson(&a, &b).unwrap() + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_variance_is_skipped() {
        assert!(pearson(&[false, false, false], &[true, false, false]).is_none());
        assert!(pearson(&[true, true], &[true, false]).is_none());
    }

    #[test]
    fn test_length_mismatch() {
        assert!(pearson(&[true, false], &[true, false, false]).is_none());
    }

    #[test]
    fn test_partial_correlation() {
        // One disagreement in six rows.
        let a = [true, true, false, false, false, false];
        let b = [true, false, false, false, false, false];
        let r = pearson(&a, &b).unwrap();
        assert!(r > 0.5 && r < 0.8, "r = {r}");
    }
}
