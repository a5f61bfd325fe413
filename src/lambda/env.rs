//! Serverless handler settings read from environment variables.

use std::env;

pub const DEFAULT_STAGE: &str = "dev";
pub const DEFAULT_LOCALHOST_PORT: u16 = 8100;

/// Settings shared by the logger and the response formatter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LambdaConfig {
    pub stage: String,
    pub debug: bool,
    pub verbose: bool,
    pub internal: bool,
    pub sensitive: bool,
    pub region: Option<String>,
    pub function_name: Option<String>,
    pub localhost_port: u16,
}

impl Default for LambdaConfig {
    fn default() -> Self {
        Self {
            stage: DEFAULT_STAGE.to_string(),
            debug: false,
            verbose: false,
            internal: false,
            sensitive: false,
            region: None,
            function_name: None,
            localhost_port: DEFAULT_LOCALHOST_PORT,
        }
    }
}

impl LambdaConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup. Flags are enabled only by the
    /// exact value `true`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let flag = |key: &str| lookup(key).as_deref() == Some("true");

        Self {
            stage: lookup("STAGE")
                .or_else(|| lookup("stage"))
                .unwrap_or_else(|| DEFAULT_STAGE.to_string()),
            debug: flag("DEBUG"),
            verbose: flag("VERBOSE"),
            internal: flag("INTERNAL"),
            sensitive: flag("SENSITIVE"),
            region: lookup("AWS_REGION").or_else(|| lookup("AWS_DEFAULT_REGION")),
            function_name: lookup("AWS_LAMBDA_FUNCTION_NAME").filter(|s| !s.is_empty()),
            localhost_port: lookup("LOCALHOST_PORT")
                .or_else(|| lookup("localhost_port"))
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_LOCALHOST_PORT),
        }
    }

    pub fn is_dev(&self) -> bool {
        self.stage == "dev"
    }
}
