//! Error types for the search pipeline.

use std::time::Duration;

use thiserror::Error;

/// Coarse classification of a [`SearchError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request did not complete: connection, status, or deadline failure.
    Transport,
    /// The response arrived but was not the expected JSON shape.
    Decode,
}

/// Errors raised while talking to the interpretation service or the data API.
///
/// None of these is fatal to a search. A failed dispatch contributes no results; a failed
/// interpretation ends the cycle with an error message in the state.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The HTTP client could not be constructed.
    #[error("failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// The request could not be sent or its body could not be read.
    #[error("request to {url} failed: {source}")]
    Transport {
        /// Requested address.
        url: String,
        /// Underlying HTTP error.
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("{url} answered with status {status}")]
    Status {
        /// Requested address.
        url: String,
        /// HTTP status code.
        status: u16,
    },

    /// The request did not finish within its deadline.
    #[error("request to {target} timed out after {}ms", .timeout.as_millis())]
    Timeout {
        /// Requested address or endpoint.
        target: String,
        /// The deadline that elapsed.
        timeout: Duration,
    },

    /// The response body was not the expected JSON shape.
    #[error("unexpected response from {url}: {message}")]
    Decode {
        /// Requested address.
        url: String,
        /// What was wrong with the body.
        message: String,
    },

    /// A request address could not be built from a base URL and an endpoint.
    #[error("cannot build request url for '{endpoint}': {source}")]
    InvalidUrl {
        /// Endpoint path that failed to join.
        endpoint: String,
        /// Underlying URL error.
        source: url::ParseError,
    },
}

impl SearchError {
    /// Returns whether this is a transport or a decode failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Decode { .. } => ErrorKind::Decode,
            Self::Client(_)
            | Self::Transport { .. }
            | Self::Status { .. }
            | Self::Timeout { .. }
            | Self::InvalidUrl { .. } => ErrorKind::Transport,
        }
    }

    /// Wraps a reqwest error raised while requesting `url`.
    pub fn transport(url: &url::Url, source: reqwest::Error) -> Self {
        Self::Transport {
            url: url.to_string(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_is_the_only_decode_kind() {
        let decode = SearchError::Decode {
            url: "http://db/scenes".into(),
            message: "missing field".into(),
        };
        assert_eq!(decode.kind(), ErrorKind::Decode);

        let status = SearchError::Status {
            url: "http://db/scenes".into(),
            status: 502,
        };
        assert_eq!(status.kind(), ErrorKind::Transport);
    }

    #[test]
    fn timeout_message_is_in_milliseconds() {
        let err = SearchError::Timeout {
            target: "scenes".into(),
            timeout: Duration::from_millis(1500),
        };
        assert_eq!(err.to_string(), "request to scenes timed out after 1500ms");
    }
}
