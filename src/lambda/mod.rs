//! Helpers for serverless HTTP handlers: payload normalization, response
//! formatting and structured logging.

mod env;
mod logger;
mod payload;
mod response;
mod status;

pub use env::{DEFAULT_LOCALHOST_PORT, DEFAULT_STAGE, LambdaConfig};
pub use logger::{LogKind, Logger};
pub use payload::{ApiGatewayEvent, Payload, PayloadError, infer_value};
pub use response::{CORS_ALLOW_HEADERS, Response};
pub use status::reason_phrase;
