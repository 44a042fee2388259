//! Configuration system for scout.
//!
//! scout uses TOML configuration files named `.scout.toml`. Configuration is resolved by walking
//! up the directory tree from the current working directory, collecting any `.scout.toml` files
//! found, then loading `~/.scout.toml` as the global config with lowest precedence.
//!
//! The configuration externalizes the three backend base addresses (data API, interpretation
//! service, image server), the request and cycle deadlines used by the search pipeline, and the
//! default feature toggles.

#![warn(missing_docs)]

mod discovery;
mod error;
mod merge;
mod parse;
mod templates;
#[cfg(test)]
mod test_support;
mod validate;

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

pub use discovery::{CONFIG_FILENAME, discover_config_files, global_config_path, is_global_config};
pub use error::ConfigError;
pub use merge::{ParsedConfig, merge_configs};
pub use parse::{
    RawConfig, RawEndpoints, RawFeatureSettings, RawSearchSettings, parse_config_file,
    parse_config_str,
};
use serde::{Deserialize, Serialize};
use serde_with::{DurationMilliSeconds, serde_as};
pub use templates::{global_template, local_template};
use url::Url;
pub use validate::ConfigWarning;
use validate::validate_config;

/// Default data API base address.
pub const DEFAULT_DATABASE_URL: &str = "http://localhost:5000/";
/// Default natural-language interpretation service base address.
pub const DEFAULT_NLP_URL: &str = "http://localhost:4000/";
/// Default image server base address.
pub const DEFAULT_IMG_URL: &str = "http://localhost:2000/";

/// Entity type names accepted for `search.return_type`.
pub const RETURN_TYPES: &[&str] = &["scene", "level", "room"];

/// Returns the entity type a `search.return_type` value names, if any.
///
/// Case and surrounding whitespace are ignored, and the plural (`rooms`) is accepted.
pub fn canonical_return_type(value: &str) -> Option<&'static str> {
    let value = value.trim().to_ascii_lowercase();
    let singular = value.strip_suffix('s').unwrap_or(&value);
    RETURN_TYPES.iter().copied().find(|name| *name == singular)
}

/// Top-level merged configuration for scout.
///
/// This represents the fully resolved configuration after merging all discovered
/// `.scout.toml` files according to precedence rules.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Backend service base addresses.
    pub endpoints: Endpoints,
    /// Search pipeline settings.
    pub search: SearchSettings,
    /// Default feature toggles.
    pub features: FeatureSettings,
    /// Directory containing the most specific config file.
    pub config_root: Option<PathBuf>,
}

impl Config {
    /// Loads configuration by discovering and merging all relevant `.scout.toml` files.
    ///
    /// This is the main entry point for loading configuration. It:
    /// 1. Discovers all `.scout.toml` files from `cwd` up to the filesystem root
    /// 2. Appends `~/.scout.toml` if it exists
    /// 3. Parses each file
    /// 4. Merges them according to precedence rules (closest to `cwd` wins)
    ///
    /// Returns `Ok(Config::default())` if no configuration files are found.
    pub fn load(cwd: &Path) -> Result<Self, ConfigError> {
        let config_files = discover_config_files(cwd);
        Self::load_from_files(&config_files)
    }

    /// Loads configuration from a specific list of config file paths.
    ///
    /// Files should be provided in precedence order: highest precedence first.
    ///
    /// Returns `Ok(Config::default())` if the list is empty.
    pub fn load_from_files(files: &[PathBuf]) -> Result<Self, ConfigError> {
        if files.is_empty() {
            return Ok(Self::default());
        }

        let parsed: Vec<ParsedConfig> = files
            .iter()
            .map(|path| {
                let config = parse_config_file(path)?;
                Ok(ParsedConfig {
                    path: path.clone(),
                    config,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        merge_configs(&parsed)
    }

    /// Validates the configuration and returns any warnings.
    ///
    /// This checks for:
    /// - Endpoints that are not http(s) addresses
    /// - Zero timeouts, and a cycle timeout shorter than the request timeout
    /// - A return type that is not one of the known entity types
    /// - An empty id field
    pub fn validate(&self) -> Vec<ConfigWarning> {
        validate_config(self)
    }

    /// Serializes the effective settings to TOML format.
    ///
    /// The output has the same layout as a `.scout.toml` file, so it can be pasted back into one.
    pub fn settings_to_toml(&self) -> String {
        let serializable = SerializableSettings {
            endpoints: &self.endpoints,
            search: &self.search,
            features: &self.features,
        };
        toml::to_string_pretty(&serializable).expect("settings serialization should not fail")
    }
}

/// Base addresses of the backend services.
///
/// Every address is normalized to end in `/` so endpoint paths can be joined onto it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Endpoints {
    /// Relational data API.
    pub database_url: Url,
    /// Natural-language query interpreter.
    pub nlp_url: Url,
    /// Image server for scene thumbnails.
    pub img_url: Url,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            database_url: Url::parse(DEFAULT_DATABASE_URL).expect("default database url is valid"),
            nlp_url: Url::parse(DEFAULT_NLP_URL).expect("default nlp url is valid"),
            img_url: Url::parse(DEFAULT_IMG_URL).expect("default img url is valid"),
        }
    }
}

/// Settings for the search pipeline.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Deadline for a single HTTP request.
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub request_timeout: Duration,
    /// Deadline for the whole aggregation barrier of one cycle.
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub cycle_timeout: Duration,
    /// Entity type shown by default.
    pub return_type: String,
    /// Record field used to identify duplicate records across batches.
    pub id_field: String,
    /// Maximum records printed per entity type.
    pub limit: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
            cycle_timeout: Duration::from_secs(30),
            return_type: String::from("scene"),
            id_field: String::from("id"),
            limit: 10,
        }
    }
}

/// Feature toggles exposed to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct FeatureSettings {
    /// Query autosuggestion.
    pub autosuggest: bool,
    /// Result visualization (thumbnails).
    pub visualization: bool,
}

impl Default for FeatureSettings {
    fn default() -> Self {
        Self {
            autosuggest: true,
            visualization: true,
        }
    }
}

/// Internal struct for TOML serialization of settings.
#[derive(Serialize)]
struct SerializableSettings<'a> {
    /// Backend endpoints.
    endpoints: &'a Endpoints,
    /// Search pipeline settings.
    search: &'a SearchSettings,
    /// Feature toggles.
    features: &'a FeatureSettings,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_defaults() {
        let endpoints = Endpoints::default();
        assert_eq!(endpoints.database_url.as_str(), "http://localhost:5000/");
        assert_eq!(endpoints.nlp_url.as_str(), "http://localhost:4000/");
        assert_eq!(endpoints.img_url.as_str(), "http://localhost:2000/");
    }

    #[test]
    fn test_search_settings_defaults() {
        let search = SearchSettings::default();
        assert_eq!(search.request_timeout, Duration::from_secs(10));
        assert_eq!(search.cycle_timeout, Duration::from_secs(30));
        assert_eq!(search.return_type, "scene");
        assert_eq!(search.id_field, "id");
        assert_eq!(search.limit, 10);
    }

    #[test]
    fn test_feature_defaults() {
        let features = FeatureSettings::default();
        assert!(features.autosuggest);
        assert!(features.visualization);
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.config_root.is_none());
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_settings_to_toml() {
        let config = Config::default();
        let toml = config.settings_to_toml();

        assert!(toml.contains("[endpoints]"));
        assert!(toml.contains("[search]"));
        assert!(toml.contains("[features]"));

        assert!(toml.contains("database_url = \"http://localhost:5000/\""));
        assert!(toml.contains("request_timeout = 10000"));
        assert!(toml.contains("return_type = \"scene\""));

        let parsed: toml::Value =
            toml::from_str(&toml).expect("settings_to_toml should produce valid TOML");
        assert!(parsed.get("endpoints").is_some());
        assert!(parsed.get("search").is_some());
        assert!(parsed.get("features").is_some());
    }

    #[test]
    fn test_settings_to_toml_round_trips_through_parser() {
        let config = Config::default();
        let raw = parse_config_str(&config.settings_to_toml(), Path::new("effective.toml"))
            .expect("effective settings should parse as a config file");
        let search = raw.search.unwrap();
        assert_eq!(search.cycle_timeout, Some(Duration::from_secs(30)));
        assert_eq!(search.id_field.as_deref(), Some("id"));
    }
}
