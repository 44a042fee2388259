//! Client for the natural-language interpretation service.

use std::future::Future;

use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::{Interpretation, SearchError, http::get_json};

/// Turns a free-text query into structured data API calls.
pub trait Interpreter: Send + Sync {
    /// Interprets `query`.
    ///
    /// Returns [`Interpretation::NotFound`] when the service reports that nothing matched.
    /// Transport and decode failures are errors, never `NotFound`.
    fn resolve(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<Interpretation, SearchError>> + Send;
}

/// Interpreter backed by the HTTP interpretation service.
#[derive(Debug, Clone)]
pub struct HttpInterpreter {
    /// Shared HTTP client.
    client: Client,
    /// Service base address, ending in `/`.
    base: Url,
}

impl HttpInterpreter {
    /// Creates an interpreter for the service at `base`.
    pub fn new(client: Client, base: Url) -> Self {
        Self { client, base }
    }
}

impl Interpreter for HttpInterpreter {
    async fn resolve(&self, query: &str) -> Result<Interpretation, SearchError> {
        let url = interpretation_url(&self.base, query)?;
        let body = get_json(&self.client, url.clone()).await?;
        let interpretation =
            Interpretation::from_json(body).map_err(|message| SearchError::Decode {
                url: url.to_string(),
                message,
            })?;

        if let Interpretation::Resolved(calls) = &interpretation {
            debug!(calls = calls.len(), "query resolved");
        }
        Ok(interpretation)
    }
}

/// Builds `<base>api?query=<text>`, with spaces encoded as `+`.
pub fn interpretation_url(base: &Url, query: &str) -> Result<Url, SearchError> {
    let mut url = base.join("api").map_err(|source| SearchError::InvalidUrl {
        endpoint: "api".to_string(),
        source,
    })?;
    url.query_pairs_mut().clear().append_pair("query", query);
    Ok(url)
}
