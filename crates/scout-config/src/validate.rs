//! Configuration validation.
//!
//! Validates a loaded configuration and reports warnings for potential issues.

use std::fmt;

use url::Url;

use crate::{Config, RETURN_TYPES, canonical_return_type};

/// A non-fatal warning about the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// An endpoint does not use http or https.
    EndpointNotHttp {
        /// Config key of the endpoint.
        name: &'static str,
        /// The resolved address.
        url: String,
    },
    /// A timeout is zero, so every request would fail immediately.
    ZeroTimeout {
        /// Config key of the timeout.
        name: &'static str,
    },
    /// The cycle deadline expires before a single request could time out.
    CycleShorterThanRequest {
        /// Cycle timeout in milliseconds.
        cycle_ms: u128,
        /// Request timeout in milliseconds.
        request_ms: u128,
    },
    /// `return_type` is not one of the known entity types.
    UnknownReturnType {
        /// The configured value.
        value: String,
    },
    /// `id_field` is empty, so duplicate records cannot be recognized by id.
    EmptyIdField,
    /// `limit` is zero, so no records would be printed.
    ZeroLimit,
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EndpointNotHttp { name, url } => {
                write!(f, "{name} is not an http(s) address: {url}")
            }
            Self::ZeroTimeout { name } => write!(f, "{name} is zero"),
            Self::CycleShorterThanRequest {
                cycle_ms,
                request_ms,
            } => write!(
                f,
                "cycle_timeout ({cycle_ms}ms) is shorter than request_timeout ({request_ms}ms)"
            ),
            Self::UnknownReturnType { value } => write!(
                f,
                "return_type '{value}' is not one of: {}",
                RETURN_TYPES.join(", ")
            ),
            Self::EmptyIdField => write!(f, "id_field is empty"),
            Self::ZeroLimit => write!(f, "limit is zero"),
        }
    }
}

/// Validates the configuration and returns any warnings.
pub fn validate_config(config: &Config) -> Vec<ConfigWarning> {
    let mut warnings = Vec::new();

    let endpoints = [
        ("database_url", &config.endpoints.database_url),
        ("nlp_url", &config.endpoints.nlp_url),
        ("img_url", &config.endpoints.img_url),
    ];
    for (name, url) in endpoints {
        if !is_http(url) {
            warnings.push(ConfigWarning::EndpointNotHttp {
                name,
                url: url.to_string(),
            });
        }
    }

    let search = &config.search;
    if search.request_timeout.is_zero() {
        warnings.push(ConfigWarning::ZeroTimeout {
            name: "request_timeout",
        });
    }
    if search.cycle_timeout.is_zero() {
        warnings.push(ConfigWarning::ZeroTimeout {
            name: "cycle_timeout",
        });
    } else if search.cycle_timeout < search.request_timeout {
        warnings.push(ConfigWarning::CycleShorterThanRequest {
            cycle_ms: search.cycle_timeout.as_millis(),
            request_ms: search.request_timeout.as_millis(),
        });
    }

    if canonical_return_type(&search.return_type).is_none() {
        warnings.push(ConfigWarning::UnknownReturnType {
            value: search.return_type.clone(),
        });
    }
    if search.id_field.trim().is_empty() {
        warnings.push(ConfigWarning::EmptyIdField);
    }
    if search.limit == 0 {
        warnings.push(ConfigWarning::ZeroLimit);
    }

    warnings
}

/// Returns true for http and https addresses.
fn is_http(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}
