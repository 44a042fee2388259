//! Configuration file parsing.
//!
//! Parses individual `.scout.toml` files into intermediate `RawConfig` structures
//! that preserve the optional nature of all fields before merging.

use std::{fs, path::Path, time::Duration};

use serde::Deserialize;
use serde_with::{DurationMilliSeconds, serde_as};
#[cfg(test)]
use toml::de::Error as TomlError;

use crate::ConfigError;

/// Raw configuration as parsed directly from a TOML file.
///
/// All fields are optional to support partial configs that will be merged.
/// This mirrors the TOML schema exactly.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawConfig {
    /// When true, stop discovery here - ignore parent and global configs.
    pub root: Option<bool>,
    /// Backend endpoints section.
    pub endpoints: Option<RawEndpoints>,
    /// Search pipeline section.
    pub search: Option<RawSearchSettings>,
    /// Feature toggles section.
    pub features: Option<RawFeatureSettings>,
}

/// Raw endpoint addresses, kept as strings until merge so errors can name their file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawEndpoints {
    /// Relational data API base address.
    pub database_url: Option<String>,
    /// Interpretation service base address.
    pub nlp_url: Option<String>,
    /// Image server base address.
    pub img_url: Option<String>,
}

/// Raw search pipeline settings.
#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawSearchSettings {
    /// Per-request deadline in milliseconds.
    #[serde_as(as = "Option<DurationMilliSeconds<u64>>")]
    pub request_timeout: Option<Duration>,
    /// Whole-cycle deadline in milliseconds.
    #[serde_as(as = "Option<DurationMilliSeconds<u64>>")]
    pub cycle_timeout: Option<Duration>,
    /// Default entity type to display.
    pub return_type: Option<String>,
    /// Record field used for deduplication.
    pub id_field: Option<String>,
    /// Maximum records printed per entity type.
    pub limit: Option<usize>,
}

/// Raw feature toggles.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawFeatureSettings {
    /// Query autosuggestion.
    pub autosuggest: Option<bool>,
    /// Result visualization.
    pub visualization: Option<bool>,
}

/// Parses a configuration file from disk.
///
/// Returns a `RawConfig` with all fields as optionals, ready for merging.
pub fn parse_config_file(path: &Path) -> Result<RawConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;

    parse_config_str(&contents, path)
}

/// Parses configuration from a TOML string.
///
/// The `path` parameter is used for error reporting.
pub fn parse_config_str(contents: &str, path: &Path) -> Result<RawConfig, ConfigError> {
    toml::from_str(contents).map_err(|source| ConfigError::ParseToml {
        path: path.to_path_buf(),
        source,
    })
}

/// Parses configuration from a TOML string without path context.
#[cfg(test)]
pub fn parse_config(contents: &str) -> Result<RawConfig, TomlError> {
    toml::from_str(contents)
}

/// Checks if a config file has `root = true` set.
///
/// Returns false if the file cannot be read or parsed.
pub fn is_root_config(path: &Path) -> bool {
    let Ok(contents) = fs::read_to_string(path) else {
        return false;
    };
    let Ok(config) = toml::from_str::<RawConfig>(&contents) else {
        return false;
    };
    config.root == Some(true)
}
