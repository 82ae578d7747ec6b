//! Content hashing utilities for cache keys.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::inference::{ConfidenceTier, DetectionFlags, DetectionMode, EngineConfig, SearchLimits};
use crate::table::Table;

/// Compute SHA256 hash of a serializable value.
///
/// The value is serialized to JSON before hashing, ensuring deterministic output.
/// Returns a 64-character lowercase hexadecimal string.
///
/// # Errors
/// Returns an error if the value cannot be serialized to JSON.
pub fn compute_hash<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let json = serde_json::to_string(value)?;
    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

/// Every engine parameter that can change a detection result.
#[derive(Serialize)]
struct DetectionParams<'a> {
    mode: DetectionMode,
    min_confidence: ConfidenceTier,
    flags: DetectionFlags,
    limits: &'a SearchLimits,
    formats: Vec<(&'a str, &'a str)>,
}

impl<'a> DetectionParams<'a> {
    fn of(config: &'a EngineConfig) -> Self {
        Self {
            mode: config.mode,
            min_confidence: config.min_confidence,
            flags: config.effective_flags(),
            limits: &config.limits,
            formats: config
                .formats
                .patterns()
                .iter()
                .map(|p| (p.name.as_str(), p.regex.as_str()))
                .collect(),
        }
    }
}

/// Fingerprint of a detection input: table names, shapes, column names,
/// cell contents and engine parameters.
///
/// Fields are length-prefixed so adjacent values cannot run together.
pub fn fingerprint(tables: &[Table], config: &EngineConfig) -> Result<String, serde_json::Error> {
    let mut hasher = Sha256::new();
    let mut field = |bytes: &[u8]| {
        hasher.update((bytes.len() as u64).to_le_bytes());
        hasher.update(bytes);
    };

    for table in tables {
        field(table.name.as_bytes());
        field(&(table.row_count() as u64).to_le_bytes());
        field(&(table.column_count() as u64).to_le_bytes());
        for column in &table.columns {
            field(column.name.as_bytes());
            field(column.type_class().to_string().as_bytes());
            for value in &column.values {
                match value.render() {
                    Some(text) => field(text.as_bytes()),
                    // Eight 0xFF bytes, a field no UTF-8 rendering can equal.
                    None => field(&u64::MAX.to_le_bytes()),
                }
            }
        }
    }
    field(compute_hash(&DetectionParams::of(config))?.as_bytes());

    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_compute_hash_deterministic() {
        let value = json!({"name": "test", "value": 42});
        let hash1 = compute_hash(&value).unwrap();
        let hash2 = compute_hash(&value).unwrap();
        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64); // SHA256 hex = 64 chars
    }

    #[test]
    fn test_compute_hash_different_values() {
        let v1 = json!({"a": 1});
        let v2 = json!({"a": 2});
        assert_ne!(compute_hash(&v1).unwrap(), compute_hash(&v2).unwrap());
    }

    fn tables() -> Vec<Table> {
        vec![
            Table::new("orders").with_column("customer_id", [1, 2]),
            Table::new("customers").with_column("id", [1, 2]),
        ]
    }

    #[test]
    fn test_fingerprint_is_stable() {
        let config = EngineConfig::default();
        assert_eq!(
            fingerprint(&tables(), &config).unwrap(),
            fingerprint(&tables(), &config).unwrap()
        );
    }

    #[test]
    fn test_fingerprint_tracks_parameters() {
        let base = fingerprint(&tables(), &EngineConfig::default()).unwrap();
        let stricter = EngineConfig::default().with_min_confidence(ConfidenceTier::High);
        assert_ne!(base, fingerprint(&tables(), &stricter).unwrap());

        let naming = EngineConfig::new(DetectionMode::Naming);
        assert_ne!(base, fingerprint(&tables(), &naming).unwrap());
    }

    #[test]
    fn test_fingerprint_tracks_contents() {
        let config = EngineConfig::default();
        let mut changed = tables();
        changed[1] = Table::new("customers").with_column("id", [1, 3]);
        assert_ne!(
            fingerprint(&tables(), &config).unwrap(),
            fingerprint(&changed, &config).unwrap()
        );
    }

    #[test]
    fn test_fingerprint_separates_null_from_text() {
        let config = EngineConfig::default();
        let a = [Table::new("t").with_column("v", [None, Some("x")])];
        let b = [Table::new("t").with_column("v", [Some("x"), None])];
        assert_ne!(fingerprint(&a, &config).unwrap(), fingerprint(&b, &config).unwrap());
    }

    #[test]
    fn test_fingerprint_separates_null_from_empty_text() {
        let config = EngineConfig::default();
        let null = [Table::new("t").with_column("v", [None::<&str>])];
        let empty = [Table::new("t").with_column("v", [Some("")])];
        assert_ne!(fingerprint(&null, &config).unwrap(), fingerprint(&empty, &config).unwrap());
    }
}
