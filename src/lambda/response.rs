//! Standard API Gateway proxy responses.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::{ApiGatewayEvent, LambdaConfig, Logger};

pub const CORS_ALLOW_HEADERS: &str =
    "Content-Type,X-Amz-Date,Authorization,X-Api-Key,X-Amz-Security-Token,X-Amz-User-Agent";

/// A proxy integration response: `{"statusCode", "body", "headers"}`.
///
/// The body is always `{"message": ...}`, with `"data"` added unless it is
/// absent or one of `null`, `false`, `0`, `""`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub status_code: u16,
    pub body: String,
    pub headers: BTreeMap<String, String>,
}

impl Response {
    pub fn new(status_code: u16, message: &str, data: Option<Value>) -> Self {
        let body = match data {
            Some(data) if !is_empty_data(&data) => json!({ "message": message, "data": data }),
            _ => json!({ "message": message }),
        };
        Self {
            status_code,
            body: body.to_string(),
            headers: BTreeMap::new(),
        }
    }

    pub fn with_headers(mut self, headers: BTreeMap<String, String>) -> Self {
        self.headers.extend(headers);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// 200: the request succeeded.
    pub fn success(logger: &Logger, message: &str, data: Option<Value>) -> Self {
        let response = Self::new(200, message, data);
        logger.internal().debug(&response.body);
        response
    }

    /// Build an error response and log it with its status.
    pub fn error(logger: &Logger, status_code: u16, message: &str, data: Option<Value>) -> Self {
        let response = Self::new(status_code, message, data);
        logger.error_with_status(status_code, &response.body);
        response
    }

    /// 400: malformed or otherwise invalid request.
    pub fn bad_request(logger: &Logger, message: &str, data: Option<Value>) -> Self {
        Self::error(logger, 400, message, data)
    }

    /// 401: the client must authenticate.
    pub fn unauthorized(logger: &Logger, message: &str, data: Option<Value>) -> Self {
        Self::error(logger, 401, message, data)
    }

    /// 403: the client is known but not allowed.
    pub fn forbidden(logger: &Logger, message: &str, data: Option<Value>) -> Self {
        Self::error(logger, 403, message, data)
    }

    pub fn not_found(logger: &Logger, message: &str, data: Option<Value>) -> Self {
        Self::error(logger, 404, message, data)
    }

    /// 405: the method is known but not supported by the resource.
    pub fn method_not_allowed(logger: &Logger, message: &str, data: Option<Value>) -> Self {
        Self::error(logger, 405, message, data)
    }

    pub fn internal_error(logger: &Logger, message: &str, data: Option<Value>) -> Self {
        Self::error(logger, 500, message, data)
    }

    /// 501: the method is not supported by the server at all.
    pub fn not_implemented(logger: &Logger, message: &str, data: Option<Value>) -> Self {
        Self::error(logger, 501, message, data)
    }

    /// Add CORS headers for `event`.
    ///
    /// The request origin is echoed back when it is in `allowed_origins`. On the
    /// `dev` stage any other origin falls back to `http://localhost:<port>`.
    pub fn with_cors(
        mut self,
        event: &ApiGatewayEvent,
        allowed_origins: &[&str],
        allowed_methods: &[&str],
        config: &LambdaConfig,
    ) -> Self {
        self.headers.insert(
            "Access-Control-Allow-Headers".to_string(),
            CORS_ALLOW_HEADERS.to_string(),
        );
        self.headers.insert(
            "Access-Control-Allow-Methods".to_string(),
            allowed_methods.join(","),
        );

        let origin = event
            .header("origin")
            .filter(|origin| allowed_origins.contains(origin));
        if let Some(origin) = origin {
            self.headers
                .insert("Access-Control-Allow-Origin".to_string(), origin.to_string());
        } else if config.is_dev() {
            self.headers.insert(
                "Access-Control-Allow-Origin".to_string(),
                format!("http://localhost:{}", config.localhost_port),
            );
        }
        self
    }
}

fn is_empty_data(data: &Value) -> bool {
    match data {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}
