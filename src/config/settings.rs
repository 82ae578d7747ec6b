//! TOML-based configuration for Cartographer.
//!
//! Example configuration:
//! ```toml
//! [detection]
//! mode = "both"
//! min_confidence = "medium"
//!
//! # Optional; replaces the flags implied by `mode`.
//! [detection.signals]
//! naming = true
//! null_pattern = false
//!
//! [limits]
//! large_table_rows = 150000
//! large_table_columns = 300
//! overlap_distinct_cap = 50000
//! format_sample_size = 200
//! near_best_margin = 0.05
//!
//! [[formats]]
//! name = "sku"
//! pattern = "^SKU-\\d+$"
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::inference::signals::format::{FormatCatalog, FormatPattern};
use crate::inference::{ConfidenceTier, DetectionFlags, DetectionMode, EngineConfig, SearchLimits};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "CARTOGRAPHER_CONFIG";

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid pattern for format '{name}': {source}")]
    InvalidPattern {
        name: String,
        #[source]
        source: regex::Error,
    },
}

/// Main settings structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub detection: DetectionSettings,
    pub limits: SearchLimits,
    /// Extra formats, tried after the built-in catalog.
    pub formats: Vec<FormatSpec>,
}

/// Detection parameters.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct DetectionSettings {
    pub mode: DetectionMode,
    pub min_confidence: ConfidenceTier,
    /// Missing keys inside the table default to enabled.
    pub signals: Option<DetectionFlags>,
}

/// A user-defined value format.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FormatSpec {
    pub name: String,
    pub pattern: String,
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate settings from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, SettingsError> {
        let settings: Settings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `CARTOGRAPHER_CONFIG`
    /// 2. `./cartographer.toml`
    /// 3. `~/.config/cartographer/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var(CONFIG_ENV_VAR) {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("cartographer.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("cartographer").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        Ok(Settings::default())
    }

    /// Check value ranges and compile every custom pattern once.
    pub fn validate(&self) -> Result<(), SettingsError> {
        let limits = &self.limits;
        if !(0.0..=1.0).contains(&limits.near_best_margin) {
            return Err(SettingsError::InvalidConfig(format!(
                "limits.near_best_margin must be within [0, 1], got {}",
                limits.near_best_margin
            )));
        }
        if limits.format_sample_size == 0 {
            return Err(SettingsError::InvalidConfig(
                "limits.format_sample_size must be positive".to_string(),
            ));
        }
        if limits.overlap_distinct_cap == 0 {
            return Err(SettingsError::InvalidConfig(
                "limits.overlap_distinct_cap must be positive".to_string(),
            ));
        }
        self.format_catalog().map(|_| ())
    }

    /// The built-in catalog followed by the configured formats.
    pub fn format_catalog(&self) -> Result<FormatCatalog, SettingsError> {
        let mut catalog = FormatCatalog::builtin();
        for format in &self.formats {
            let pattern =
                FormatPattern::new(format.name.clone(), &format.pattern).map_err(|source| {
                    SettingsError::InvalidPattern {
                        name: format.name.clone(),
                        source,
                    }
                })?;
            catalog.push(pattern);
        }
        Ok(catalog)
    }

    /// Map settings onto engine parameters.
    pub fn engine_config(&self) -> Result<EngineConfig, SettingsError> {
        let mut config = EngineConfig::new(self.detection.mode)
            .with_min_confidence(self.detection.min_confidence)
            .with_limits(self.limits)
            .with_formats(self.format_catalog()?);
        config.flags = self.detection.signals;
        Ok(config)
    }
}
