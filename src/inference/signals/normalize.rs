//! Identifier canonicalization.
//!
//! Every naming rule works on canonical names: lowercase ASCII alphanumerics
//! separated by single underscores.

/// Key-ish suffixes removed by [`stem`].
const STEM_SUFFIXES: [&str; 5] = ["_id", "_key", "_code", "_num", "_no"];

/// Canonicalize a table or column name.
///
/// Lowercases, turns every run of non-alphanumeric characters into a single
/// underscore and trims underscores at both ends.
///
/// ```
/// use cartographer::inference::signals::normalize::normalize;
///
/// assert_eq!(normalize("Customer ID"), "customer_id");
/// assert_eq!(normalize("__Order--Lines__"), "order_lines");
/// ```
pub fn normalize(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_sep = false;

    for ch in name.chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            out.push(ch);
        } else {
            pending_sep = true;
        }
    }

    out
}

/// Strip one trailing `_id`, `_key`, `_code`, `_num` or `_no`.
pub fn stem(canonical: &str) -> &str {
    STEM_SUFFIXES
        .iter()
        .find_map(|suffix| canonical.strip_suffix(suffix))
        .unwrap_or(canonical)
}

/// Strip one trailing `_id` only.
pub fn id_stem(canonical: &str) -> &str {
    canonical.strip_suffix("_id").unwrap_or(canonical)
}

/// True if `canonical` ends in one of the key-ish suffixes.
pub fn has_key_suffix(canonical: &str) -> bool {
    STEM_SUFFIXES.iter().any(|suffix| canonical.ends_with(suffix))
}
