//! Structured logging for serverless handlers.
//!
//! Every line carries a `[TYPE][FUNCTION_NAME]` prefix. Whether a line is
//! written depends on the [`LambdaConfig`] the logger was built with:
//!
//! - `LOG`, `WARNING`, `DEPRECATED`, `ERROR`: always
//! - `DEBUG`: `DEBUG=true`, or stage `dev`/`demo`
//! - `VERBOSE`: `VERBOSE=true`
//! - `SENSITIVE`: always, with the data redacted unless `SENSITIVE=true` or stage `dev`
//!
//! Handles obtained through [`Logger::internal`] are for library diagnostics
//! and stay silent unless `INTERNAL=true`; warnings, deprecations and errors
//! are still written.

use std::fmt::Display;
use std::sync::Arc;

use log::Level;
use serde_json::Value;

use super::LambdaConfig;
use super::status::reason_phrase;

const REDACTED: &str = "<REDACTED>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogKind {
    Log,
    Debug,
    Verbose,
    Sensitive,
    Error,
    Warning,
    Deprecated,
}

impl LogKind {
    pub fn label(self) -> &'static str {
        match self {
            LogKind::Log => "LOG",
            LogKind::Debug => "DEBUG",
            LogKind::Verbose => "VERBOSE",
            LogKind::Sensitive => "SENSITIVE",
            LogKind::Error => "ERROR",
            LogKind::Warning => "WARNING",
            LogKind::Deprecated => "DEPRECATED",
        }
    }

    fn level(self) -> Level {
        match self {
            LogKind::Error => Level::Error,
            LogKind::Warning | LogKind::Deprecated => Level::Warn,
            _ => Level::Info,
        }
    }

    /// Kinds that ignore the internal gate.
    fn always_written(self) -> bool {
        matches!(self, LogKind::Error | LogKind::Warning | LogKind::Deprecated)
    }
}

fn part(value: impl Display) -> String {
    format!("[{}]", value)
}

#[derive(Debug, Clone)]
pub struct Logger {
    config: Arc<LambdaConfig>,
    internal: bool,
}

impl Logger {
    pub fn new(config: LambdaConfig) -> Self {
        Self {
            config: Arc::new(config),
            internal: false,
        }
    }

    pub fn from_env() -> Self {
        Self::new(LambdaConfig::from_env())
    }

    pub fn config(&self) -> &LambdaConfig {
        &self.config
    }

    /// A handle for library-internal diagnostics sharing this logger's config.
    pub fn internal(&self) -> Logger {
        Logger {
            config: Arc::clone(&self.config),
            internal: true,
        }
    }

    pub fn is_internal(&self) -> bool {
        self.internal
    }

    fn enabled(&self, kind: LogKind) -> bool {
        if kind.always_written() {
            return true;
        }
        let condition = match kind {
            LogKind::Debug => {
                self.config.debug || self.config.stage == "dev" || self.config.stage == "demo"
            }
            LogKind::Verbose => self.config.verbose,
            _ => true,
        };
        condition && (self.config.internal || !self.internal)
    }

    fn prefix(&self, kind: LogKind) -> String {
        let mut prefix = part(kind.label());
        if let Some(name) = &self.config.function_name {
            prefix.push_str(&part(name));
        }
        prefix
    }

    /// The line that would be written for `message`, or `None` if suppressed.
    pub fn format_line(&self, kind: LogKind, message: impl Display) -> Option<String> {
        self.enabled(kind)
            .then(|| format!("{} {}", self.prefix(kind), message))
    }

    fn write(&self, kind: LogKind, message: impl Display) {
        if let Some(line) = self.format_line(kind, message) {
            log::log!(kind.level(), "{}", line);
        }
    }

    pub fn log(&self, message: impl Display) {
        self.write(LogKind::Log, message)
    }

    pub fn debug(&self, message: impl Display) {
        self.write(LogKind::Debug, message)
    }

    pub fn verbose(&self, message: impl Display) {
        self.write(LogKind::Verbose, message)
    }

    /// Use when a non-breaking error occurred.
    pub fn warning(&self, message: impl Display) {
        self.write(LogKind::Warning, message)
    }

    pub fn deprecated(&self, message: impl Display) {
        self.write(LogKind::Deprecated, message)
    }

    pub fn format_sensitive(&self, label: &str, data: &Value) -> Option<String> {
        let shown = if self.config.sensitive || self.config.is_dev() {
            data.to_string()
        } else {
            REDACTED.to_string()
        };
        self.format_line(LogKind::Sensitive, format!("{}: {}", label, shown))
    }

    /// Log `data` under `label`, redacted outside of `dev` unless `SENSITIVE=true`.
    pub fn sensitive(&self, label: &str, data: &Value) {
        if let Some(line) = self.format_sensitive(label, data) {
            log::log!(LogKind::Sensitive.level(), "{}", line);
        }
    }

    pub fn error(&self, message: impl Display) {
        self.write(LogKind::Error, message)
    }

    /// `[ERROR][fn][404][Not Found] message`
    pub fn format_status_error(&self, status: u16, message: impl Display) -> String {
        let mut prefix = self.prefix(LogKind::Error);
        prefix.push_str(&part(status));
        if let Some(reason) = reason_phrase(status) {
            prefix.push_str(&part(reason));
        }
        format!("{} {}", prefix, message)
    }

    pub fn error_with_status(&self, status: u16, message: impl Display) {
        log::error!("{}", self.format_status_error(status, message));
    }

    /// Format an AWS SDK error value, reading `$metadata.httpStatusCode` and `name`.
    pub fn format_aws_error(&self, error: &Value) -> String {
        let mut prefix = self.prefix(LogKind::Error);
        let status = error
            .pointer("/$metadata/httpStatusCode")
            .and_then(Value::as_u64)
            .and_then(|s| u16::try_from(s).ok());
        if let Some(status) = status {
            prefix.push_str(&part(status));
            if let Some(reason) = reason_phrase(status) {
                prefix.push_str(&part(reason));
            }
        }
        if let Some(name) = error.get("name").and_then(Value::as_str) {
            prefix.push_str(&part(name));
        }
        format!("{} {}", prefix, error)
    }

    pub fn aws_error(&self, error: &Value) {
        log::error!("{}", self.format_aws_error(error));
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new(LambdaConfig::default())
    }
}
