//! Jaro-Winkler string similarity.
//!
//! The Jaro core comes from `strsim`. The Winkler boost is applied here, at
//! every Jaro level, and counts equal characters at each of the first four
//! positions, so the result stays continuous around the weak-similarity
//! threshold.

/// Maximum prefix length rewarded by the Winkler adjustment.
const WINKLER_PREFIX_CAP: usize = 4;

/// Boost per rewarded prefix character.
const WINKLER_SCALE: f64 = 0.1;

/// Jaro similarity in `[0, 1]`.
pub fn jaro(a: &str, b: &str) -> f64 {
    strsim::jaro(a, b)
}

/// Jaro-Winkler similarity in `[0, 1]`.
///
/// ```
/// use cartographer::inference::signals::similarity::jaro_winkler;
///
/// assert_eq!(jaro_winkler("customer", "customer"), 1.0);
/// assert!(jaro_winkler("customer", "cust") > 0.85);
/// ```
pub fn jaro_winkler(a: &str, b: &str) -> f64 {
    let sim = jaro(a, b);
    if sim == 1.0 {
        return sim;
    }

    let prefix = a
        .chars()
        .zip(b.chars())
        .take(WINKLER_PREFIX_CAP)
        .filter(|(x, y)| x == y)
        .count();

    sim + prefix as f64 * WINKLER_SCALE * (1.0 - sim)
}
