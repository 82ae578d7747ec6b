//! Value-format fingerprint signal.
//!
//! A column's fingerprint is the first catalog format that matches at least
//! 80% of a sample. Two columns match when they share a fingerprint.
//! The catalog is plain data: callers may extend it without touching the
//! scorer.

use std::sync::LazyLock;

use regex::Regex;

use crate::inference::thresholds;

use super::{ColumnPair, SignalBucket, SignalHit};

/// A named value format.
#[derive(Debug, Clone)]
pub struct FormatPattern {
    pub name: String,
    pub regex: Regex,
}

impl FormatPattern {
    pub fn new(name: impl Into<String>, pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            name: name.into(),
            regex: Regex::new(pattern)?,
        })
    }
}

static BUILTIN_PATTERNS: LazyLock<Vec<FormatPattern>> = LazyLock::new(|| {
    [
        (
            "uuid",
            r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$",
        ),
        ("email", r"^[^@\s]+@[^@\s]+\.[^@\s]+$"),
        ("zip_us", r"^\d{5}(-\d{4})?$"),
        ("phone", r"^\+?[\d\s\-().]{7,15}$"),
        ("iso_date", r"^\d{4}-\d{2}-\d{2}$"),
        ("iso_ts", r"^\d{4}-\d{2}-\d{2}[ T]\d{2}:\d{2}"),
        ("hex_color", r"(?i)^#[0-9a-f]{3,6}$"),
        ("int_code", r"^\d{1,6}$"),
        ("alpha_code", r"^[A-Z]{2,4}$"),
    ]
    .into_iter()
    .map(|(name, pattern)| FormatPattern {
        name: name.to_string(),
        regex: Regex::new(pattern).expect("builtin format pattern is valid"),
    })
    .collect()
});

/// An ordered list of formats; earlier entries win.
#[derive(Debug, Clone)]
pub struct FormatCatalog {
    patterns: Vec<FormatPattern>,
}

impl Default for FormatCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl FormatCatalog {
    /// uuid, email, zip_us, phone, iso_date, iso_ts, hex_color, int_code,
    /// alpha_code.
    pub fn builtin() -> Self {
        Self {
            patterns: BUILTIN_PATTERNS.clone(),
        }
    }

    pub fn empty() -> Self {
        Self {
            patterns: Vec::new(),
        }
    }

    /// Append a format after the existing ones.
    pub fn push(&mut self, pattern: FormatPattern) {
        self.patterns.push(pattern);
    }

    /// Builder: append a format compiled from `pattern`.
    pub fn with_pattern(
        mut self,
        name: impl Into<String>,
        pattern: &str,
    ) -> Result<Self, regex::Error> {
        self.push(FormatPattern::new(name, pattern)?);
        Ok(self)
    }

    pub fn patterns(&self) -> &[FormatPattern] {
        &self.patterns
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(|p| p.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// First format matched by at least 80% of `sample`.
    pub fn classify<S: AsRef<str>>(&self, sample: &[S]) -> Option<&str> {
        if sample.is_empty() {
            return None;
        }
        let total = sample.len() as f64;
        self.patterns
            .iter()
            .find(|p| {
                let hits = sample.iter().filter(|v| p.regex.is_match(v.as_ref())).count();
                hits as f64 / total >= thresholds::format::MATCH_RATIO
            })
            .map(|p| p.name.as_str())
    }

    /// Classify a deterministic sample of at most `sample_size` values.
    pub fn fingerprint<S: AsRef<str>>(&self, values: &[S], sample_size: usize) -> Option<&str> {
        if values.len() <= sample_size {
            return self.classify(values);
        }
        let sample: Vec<&str> = strided_sample(values.len(), sample_size)
            .map(|i| values[i].as_ref())
            .collect();
        self.classify(&sample)
    }
}

/// `n` evenly spaced indices into `0..len`, starting at 0.
fn strided_sample(len: usize, n: usize) -> impl Iterator<Item = usize> {
    (0..n).map(move |i| i * len / n)
}

pub(crate) fn evaluate(pair: &ColumnPair<'_>) -> Option<SignalHit> {
    if !pair.both_populated() {
        return None;
    }
    match (&pair.source.format, &pair.target.format) {
        (Some(a), Some(b)) if a == b => Some(SignalHit::new(
            SignalBucket::FormatMatch,
            1.0,
            format!("shared format [{a}]"),
        )),
        _ => None,
    }
}
