//! Request payload normalization for API Gateway proxy events.
//!
//! Path and query parameters arrive as strings; [`infer_value`] turns them
//! back into typed JSON values (`"2"` becomes `2`, `"[]"` an array, `"null"`
//! null, URL-encoded text is decoded).

use std::collections::{BTreeMap, HashMap};

use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("Failed to parse \"body\" to JSON!")]
    InvalidBody(#[source] serde_json::Error),

    #[error("Failed to parse \"body\" to JSON! Expected an object but got an array.")]
    BodyIsArray,
}

/// The parts of an API Gateway proxy event the payload and CORS logic read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiGatewayEvent {
    pub http_method: String,
    pub path_parameters: Option<HashMap<String, Option<String>>>,
    pub query_string_parameters: Option<HashMap<String, Option<String>>>,
    pub body: Option<String>,
    pub headers: Option<HashMap<String, String>>,
}

impl ApiGatewayEvent {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.as_ref().and_then(|headers| {
            headers
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.as_str())
        })
    }
}

/// Infer the JSON value carried by a raw string parameter.
///
/// Returns `None` for `"undefined"`, meaning the key is dropped.
pub fn infer_value(raw: Option<&str>) -> Option<Value> {
    let raw = match raw {
        None | Some("null") => return Some(Value::Null),
        Some("undefined") => return None,
        Some(raw) => raw,
    };

    // Malformed escapes are kept verbatim
    let decoded = percent_decode_str(raw)
        .decode_utf8()
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| raw.to_string());

    Some(serde_json::from_str(&decoded).unwrap_or(Value::String(decoded)))
}

/// Normalized request data keyed by parameter name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Payload(BTreeMap<String, Value>);

impl Payload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the payload appropriate for the request method:
    ///
    /// - PUT, POST: path and body
    /// - GET, DELETE, HEAD: path and query parameters
    /// - anything else: path, query parameters and body
    ///
    /// Later sources override keys from earlier ones.
    pub fn from_method(event: &ApiGatewayEvent) -> Result<Self, PayloadError> {
        let mut payload = Self::from_path(event);
        match event.http_method.to_ascii_uppercase().as_str() {
            "PUT" | "POST" => payload.extend(Self::from_body(event)?),
            "GET" | "DELETE" | "HEAD" => payload.extend(Self::from_query_params(event)),
            _ => {
                payload.extend(Self::from_query_params(event));
                payload.extend(Self::from_body(event)?);
            }
        }
        Ok(payload)
    }

    /// Parse the request body as a JSON object.
    ///
    /// An absent or empty body, `null`, or a scalar gives an empty payload.
    /// Only invalid JSON and arrays are errors.
    pub fn from_body(event: &ApiGatewayEvent) -> Result<Self, PayloadError> {
        let body = match event.body.as_deref() {
            None | Some("") => return Ok(Self::new()),
            Some(body) => body,
        };

        match serde_json::from_str::<Value>(body).map_err(PayloadError::InvalidBody)? {
            Value::Object(map) => Ok(map
                .into_iter()
                .filter_map(|(k, v)| match v {
                    Value::String(s) => infer_value(Some(&s)).map(|v| (k, v)),
                    other => Some((k, other)),
                })
                .collect()),
            Value::Array(_) => Err(PayloadError::BodyIsArray),
            _ => Ok(Self::new()),
        }
    }

    pub fn from_path(event: &ApiGatewayEvent) -> Self {
        Self::from_params(event.path_parameters.as_ref())
    }

    pub fn from_query_params(event: &ApiGatewayEvent) -> Self {
        Self::from_params(event.query_string_parameters.as_ref())
    }

    fn from_params(params: Option<&HashMap<String, Option<String>>>) -> Self {
        params
            .into_iter()
            .flatten()
            .filter_map(|(k, v)| infer_value(v.as_deref()).map(|v| (k.clone(), v)))
            .collect()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn into_inner(self) -> BTreeMap<String, Value> {
        self.0
    }
}

impl FromIterator<(String, Value)> for Payload {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<(String, Value)> for Payload {
    fn extend<I: IntoIterator<Item = (String, Value)>>(&mut self, iter: I) {
        self.0.extend(iter)
    }
}

impl IntoIterator for Payload {
    type Item = (String, Value);
    type IntoIter = std::collections::btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
