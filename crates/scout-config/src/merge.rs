//! Configuration merging.
//!
//! Merges multiple `RawConfig` files into a single resolved `Config`,
//! applying precedence rules and resolving endpoint addresses.

use std::path::{Path, PathBuf};

use url::Url;

use crate::{
    Config, ConfigError, Endpoints, FeatureSettings, SearchSettings, canonical_return_type,
    parse::{RawConfig, RawEndpoints, RawFeatureSettings, RawSearchSettings},
};

/// A parsed config file with its source path.
pub struct ParsedConfig {
    /// Path to the config file.
    pub path: PathBuf,
    /// Parsed raw configuration.
    pub config: RawConfig,
}

/// Merges multiple configuration files into a single resolved `Config`.
///
/// Configs should be provided in precedence order: highest precedence first (closest to CWD),
/// lowest precedence last (global config). Every scalar takes the first defined value.
pub fn merge_configs(configs: &[ParsedConfig]) -> Result<Config, ConfigError> {
    if configs.is_empty() {
        return Ok(Config::default());
    }

    let endpoints = merge_endpoints(configs)?;
    let search = merge_search_settings(configs);
    let features = merge_features(configs);
    let config_root = configs
        .first()
        .and_then(|c| c.path.parent())
        .map(Path::to_path_buf);

    Ok(Config {
        endpoints,
        search,
        features,
        config_root,
    })
}

/// Merges endpoint addresses, parsing each winning value.
fn merge_endpoints(configs: &[ParsedConfig]) -> Result<Endpoints, ConfigError> {
    let mut result = Endpoints::default();

    // Lowest precedence first so higher precedence overwrites
    for parsed in configs.iter().rev() {
        if let Some(ref endpoints) = parsed.config.endpoints {
            apply_raw_endpoints(&mut result, endpoints, &parsed.path)?;
        }
    }

    Ok(result)
}

/// Applies raw endpoints to result, overwriting any present values.
fn apply_raw_endpoints(
    result: &mut Endpoints,
    raw: &RawEndpoints,
    path: &Path,
) -> Result<(), ConfigError> {
    if let Some(ref v) = raw.database_url {
        result.database_url = parse_base_url("database_url", v, path)?;
    }
    if let Some(ref v) = raw.nlp_url {
        result.nlp_url = parse_base_url("nlp_url", v, path)?;
    }
    if let Some(ref v) = raw.img_url {
        result.img_url = parse_base_url("img_url", v, path)?;
    }
    Ok(())
}

/// Parses an endpoint and normalizes its path to end in `/`.
///
/// Without the trailing slash, `Url::join` would replace the last path segment instead of
/// appending to it.
fn parse_base_url(name: &'static str, value: &str, path: &Path) -> Result<Url, ConfigError> {
    let mut url = Url::parse(value.trim()).map_err(|source| ConfigError::InvalidEndpoint {
        name,
        value: value.to_string(),
        path: path.to_path_buf(),
        source,
    })?;

    if url.cannot_be_a_base() {
        return Err(ConfigError::NotABaseUrl {
            name,
            value: value.to_string(),
            path: path.to_path_buf(),
        });
    }

    if !url.path().ends_with('/') {
        let normalized = format!("{}/", url.path());
        url.set_path(&normalized);
    }

    Ok(url)
}

/// Merges search settings.
fn merge_search_settings(configs: &[ParsedConfig]) -> SearchSettings {
    let mut result = SearchSettings::default();

    for parsed in configs.iter().rev() {
        if let Some(ref search) = parsed.config.search {
            apply_raw_search(&mut result, search);
        }
    }

    result
}

/// Applies raw search settings to result.
fn apply_raw_search(result: &mut SearchSettings, raw: &RawSearchSettings) {
    if let Some(v) = raw.request_timeout {
        result.request_timeout = v;
    }
    if let Some(v) = raw.cycle_timeout {
        result.cycle_timeout = v;
    }
    if let Some(ref v) = raw.return_type {
        result.return_type = canonical_return_type(v)
            .map_or_else(|| v.trim().to_ascii_lowercase(), str::to_string);
    }
    if let Some(ref v) = raw.id_field {
        result.id_field = v.clone();
    }
    if let Some(v) = raw.limit {
        result.limit = v;
    }
}

/// Merges feature toggles.
fn merge_features(configs: &[ParsedConfig]) -> FeatureSettings {
    let mut result = FeatureSettings::default();

    for parsed in configs.iter().rev() {
        if let Some(ref features) = parsed.config.features {
            apply_raw_features(&mut result, features);
        }
    }

    result
}

/// Applies raw feature toggles to result.
fn apply_raw_features(result: &mut FeatureSettings, raw: &RawFeatureSettings) {
    if let Some(v) = raw.autosuggest {
        result.autosuggest = v;
    }
    if let Some(v) = raw.visualization {
        result.visualization = v;
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::parse::parse_config;

    fn parsed(path: &str, toml: &str) -> ParsedConfig {
        ParsedConfig {
            path: PathBuf::from(path),
            config: parse_config(toml).unwrap(),
        }
    }

    #[test]
    fn test_merge_empty() {
        let config = merge_configs(&[]).unwrap();
        assert_eq!(config.endpoints, Endpoints::default());
        assert!(config.config_root.is_none());
    }

    #[test]
    fn test_first_defined_value_wins() {
        let configs = vec![
            parsed("/project/.scout.toml", "[search]\nlimit = 3\n"),
            parsed(
                "/home/user/.scout.toml",
                "[search]\nlimit = 50\nid_field = \"uid\"\n",
            ),
        ];
        let config = merge_configs(&configs).unwrap();
        assert_eq!(config.search.limit, 3);
        assert_eq!(config.search.id_field, "uid");
        assert_eq!(config.config_root, Some(PathBuf::from("/project")));
    }

    #[test]
    fn test_endpoint_gets_trailing_slash() {
        let configs = vec![parsed(
            "/p/.scout.toml",
            "[endpoints]\ndatabase_url = \"http://db:5000/v1\"\n",
        )];
        let config = merge_configs(&configs).unwrap();
        assert_eq!(config.endpoints.database_url.as_str(), "http://db:5000/v1/");
        assert_eq!(
            config.endpoints.database_url.join("scenes").unwrap().as_str(),
            "http://db:5000/v1/scenes"
        );
    }

    #[test]
    fn test_invalid_endpoint_names_key_and_file() {
        let configs = vec![parsed(
            "/p/.scout.toml",
            "[endpoints]\nnlp_url = \"not a url\"\n",
        )];
        let err = merge_configs(&configs).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEndpoint { name: "nlp_url", .. }));
        assert!(err.to_string().contains("/p/.scout.toml"));
    }

    #[test]
    fn test_non_base_endpoint_is_rejected() {
        let configs = vec![parsed(
            "/p/.scout.toml",
            "[endpoints]\nimg_url = \"mailto:someone@example.com\"\n",
        )];
        let err = merge_configs(&configs).unwrap_err();
        assert!(matches!(err, ConfigError::NotABaseUrl { name: "img_url", .. }));
    }

    #[test]
    fn test_return_type_is_normalized() {
        let configs = vec![parsed("/p/.scout.toml", "[search]\nreturn_type = \" Level \"\n")];
        let config = merge_configs(&configs).unwrap();
        assert_eq!(config.search.return_type, "level");

        let configs = vec![parsed("/p/.scout.toml", "[search]\nreturn_type = \"Rooms\"\n")];
        let config = merge_configs(&configs).unwrap();
        assert_eq!(config.search.return_type, "room");
    }

    #[test]
    fn test_timeouts_and_features_merge() {
        let configs = vec![
            parsed(
                "/p/.scout.toml",
                "[search]\ncycle_timeout = 500\n[features]\nautosuggest = false\n",
            ),
            parsed("/g/.scout.toml", "[search]\nrequest_timeout = 100\n"),
        ];
        let config = merge_configs(&configs).unwrap();
        assert_eq!(config.search.request_timeout, Duration::from_millis(100));
        assert_eq!(config.search.cycle_timeout, Duration::from_millis(500));
        assert!(!config.features.autosuggest);
        assert!(config.features.visualization);
    }
}
