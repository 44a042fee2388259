//! Error types for scout configuration.

use std::io;
use std::path::PathBuf;

use thiserror::Error;
use toml::de;

/// Errors that can occur when loading or processing configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        /// Path to the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Failed to parse TOML configuration.
    #[error("failed to parse config file {path}: {source}")]
    ParseToml {
        /// Path to the file that could not be parsed.
        path: PathBuf,
        /// Underlying TOML parse error.
        source: de::Error,
    },

    /// An endpoint is not a valid absolute URL.
    #[error("invalid {name} '{value}' in {path}: {source}")]
    InvalidEndpoint {
        /// Config key of the endpoint (`database_url`, `nlp_url`, `img_url`).
        name: &'static str,
        /// The value as written in the file.
        value: String,
        /// File the value came from.
        path: PathBuf,
        /// Underlying URL parse error.
        source: url::ParseError,
    },

    /// An endpoint URL cannot serve as a base for joining request paths.
    #[error("{name} '{value}' in {path} cannot be used as a base address")]
    NotABaseUrl {
        /// Config key of the endpoint.
        name: &'static str,
        /// The value as written in the file.
        value: String,
        /// File the value came from.
        path: PathBuf,
    },
}
