//! Configuration module for Cartographer.
//!
//! Handles the TOML settings file and its mapping onto engine parameters.

mod settings;

pub use settings::{DetectionSettings, FormatSpec, Settings, SettingsError, CONFIG_ENV_VAR};
