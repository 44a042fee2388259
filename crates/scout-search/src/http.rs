//! Shared HTTP plumbing for the interpretation and data clients.

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::SearchError;

/// Builds the HTTP client shared by both backends.
///
/// `request_timeout` bounds every request, including reading the body.
pub fn http_client(request_timeout: Duration) -> Result<Client, SearchError> {
    Client::builder()
        .user_agent(concat!("scout/", env!("CARGO_PKG_VERSION")))
        .timeout(request_timeout)
        .build()
        .map_err(SearchError::Client)
}

/// Issues a GET request and parses the body as JSON.
pub async fn get_json(client: &Client, url: Url) -> Result<Value, SearchError> {
    debug!(%url, "GET");

    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| SearchError::transport(&url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(SearchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| SearchError::transport(&url, e))?;

    serde_json::from_slice(&body).map_err(|e| SearchError::Decode {
        url: url.to_string(),
        message: e.to_string(),
    })
}
