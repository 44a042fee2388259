//! Client for the relational data API.

use std::future::Future;

use reqwest::Client;
use scout_results::{EntityType, PerEntity, ResultRecord};
use serde_json::Value;
use url::Url;

use crate::{ResolvedCall, SearchError, http::get_json};

/// Executes resolved calls against the data API.
///
/// Implementations are shared between the concurrent requests of a cycle.
pub trait DataSource: Send + Sync + 'static {
    /// Fetches the raw records of every entity type for one call.
    fn fetch(
        &self,
        call: &ResolvedCall,
    ) -> impl Future<Output = Result<PerEntity<Vec<ResultRecord>>, SearchError>> + Send;
}

/// Data source backed by the HTTP data API.
#[derive(Debug, Clone)]
pub struct HttpDataSource {
    /// Shared HTTP client.
    client: Client,
    /// Data API base address, ending in `/`.
    base: Url,
}

impl HttpDataSource {
    /// Creates a data source for the API at `base`.
    pub fn new(client: Client, base: Url) -> Self {
        Self { client, base }
    }
}

impl DataSource for HttpDataSource {
    async fn fetch(
        &self,
        call: &ResolvedCall,
    ) -> Result<PerEntity<Vec<ResultRecord>>, SearchError> {
        let url = data_url(&self.base, call)?;
        let body = get_json(&self.client, url.clone()).await?;
        parse_data_response(body).map_err(|message| SearchError::Decode {
            url: url.to_string(),
            message,
        })
    }
}

/// Builds `<base>/<endpoint>?<params>`.
///
/// The endpoint is always a path below `base`: its `/`-separated segments are appended to the
/// base path, empty and dot segments are dropped, and anything resembling a scheme or host stays
/// part of the path. Parameters are form-encoded in name order. No `?` is appended when there
/// are none.
pub fn data_url(base: &Url, call: &ResolvedCall) -> Result<Url, SearchError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| SearchError::InvalidUrl {
            endpoint: call.endpoint.clone(),
            source: url::ParseError::RelativeUrlWithCannotBeABaseBase,
        })?
        .pop_if_empty()
        .extend(call.endpoint.split('/').filter(|segment| !segment.is_empty()));

    if !call.params.is_empty() {
        url.query_pairs_mut()
            .extend_pairs(call.params.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    }
    Ok(url)
}

/// Splits a data API response into the record arrays of each entity type.
///
/// All three arrays must be present and every element must be a JSON object.
pub fn parse_data_response(body: Value) -> Result<PerEntity<Vec<ResultRecord>>, String> {
    let Value::Object(mut fields) = body else {
        return Err("expected a JSON object".to_string());
    };

    let mut records = PerEntity::default();
    for entity in EntityType::ALL {
        let key = entity.response_key();
        let Some(Value::Array(items)) = fields.remove(key) else {
            return Err(format!("missing array '{key}'"));
        };
        *records.get_mut(entity) = items
            .into_iter()
            .enumerate()
            .map(|(i, item)| {
                ResultRecord::from_value(item).ok_or_else(|| format!("{key}[{i}] is not an object"))
            })
            .collect::<Result<Vec<_>, _>>()?;
    }
    Ok(records)
}
