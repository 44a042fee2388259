//! Structured calls produced by the interpretation service.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One parameterized data API request derived from the free-text query.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ResolvedCall {
    /// Data API path, relative to the data API base address.
    #[serde(rename = "apiCall")]
    pub endpoint: String,
    /// Query parameters, sorted by name.
    #[serde(default, deserialize_with = "params_as_strings")]
    pub params: BTreeMap<String, String>,
    /// Whether the call's records are selected (`true`) or excluded (`false`).
    #[serde(rename = "toInclude", default = "default_to_include")]
    pub to_include: bool,
}

impl ResolvedCall {
    /// Creates a selecting call without parameters.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            params: BTreeMap::new(),
            to_include: true,
        }
    }

    /// Adds a query parameter.
    #[must_use]
    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Marks the call's records as excluded from the merged list.
    #[must_use]
    pub fn excluding(mut self) -> Self {
        self.to_include = false;
        self
    }
}

/// `toInclude` defaults to selecting.
fn default_to_include() -> bool {
    true
}

/// Accepts parameter values of any scalar JSON type and stores their text.
///
/// The interpretation service emits numbers for counts and sizes; they are sent to the data
/// API exactly as written.
fn params_as_strings<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<BTreeMap<String, Value>>::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|(name, value)| {
            let text = match value {
                Value::String(s) => s,
                Value::Null => String::new(),
                other => other.to_string(),
            };
            (name, text)
        })
        .collect())
}

/// Result of interpreting a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interpretation {
    /// The service found nothing it could turn into calls.
    NotFound,
    /// The calls to dispatch, possibly none.
    Resolved(Vec<ResolvedCall>),
}

impl Interpretation {
    /// Reads an interpretation service response body.
    ///
    /// Any `error` key, whatever its value, means not found. Otherwise `apiCalls` lists the calls;
    /// a missing or null `apiCalls` is an empty list.
    pub fn from_json(body: Value) -> Result<Self, String> {
        let Value::Object(mut fields) = body else {
            return Err("expected a JSON object".to_string());
        };

        if fields.contains_key("error") {
            return Ok(Self::NotFound);
        }

        match fields.remove("apiCalls") {
            None | Some(Value::Null) => Ok(Self::Resolved(Vec::new())),
            Some(calls) => serde_json::from_value(calls)
                .map(Self::Resolved)
                .map_err(|e| format!("invalid apiCalls: {e}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn error_marker_means_not_found() {
        assert_eq!(
            Interpretation::from_json(json!({"error": "no parse"})),
            Ok(Interpretation::NotFound)
        );
        assert_eq!(
            Interpretation::from_json(json!({"error": null, "apiCalls": []})),
            Ok(Interpretation::NotFound)
        );
    }

    #[test]
    fn reads_api_calls() {
        let body = json!({
            "apiCalls": [
                {"apiCall": "scenes/by_room", "params": {"type": "kitchen", "min": 2}, "toInclude": true},
                {"apiCall": "scenes/by_object", "params": {"object": "piano"}, "toInclude": false}
            ]
        });
        let Ok(Interpretation::Resolved(calls)) = Interpretation::from_json(body) else {
            panic!("expected resolved calls");
        };
        assert_eq!(
            calls,
            vec![
                ResolvedCall::new("scenes/by_room")
                    .param("min", "2")
                    .param("type", "kitchen"),
                ResolvedCall::new("scenes/by_object")
                    .param("object", "piano")
                    .excluding(),
            ]
        );
    }

    #[test]
    fn missing_fields_take_defaults() {
        let body = json!({"apiCalls": [{"apiCall": "scenes"}]});
        assert_eq!(
            Interpretation::from_json(body),
            Ok(Interpretation::Resolved(vec![ResolvedCall::new("scenes")]))
        );
        assert_eq!(
            Interpretation::from_json(json!({})),
            Ok(Interpretation::Resolved(Vec::new()))
        );
    }

    #[test]
    fn malformed_bodies_are_errors() {
        assert!(Interpretation::from_json(json!([1, 2])).is_err());
        let err = Interpretation::from_json(json!({"apiCalls": [{"params": {}}]})).unwrap_err();
        assert!(err.contains("apiCall"));
    }
}
