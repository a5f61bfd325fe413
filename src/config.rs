//! Release configuration (`deploy.toml`).
//!
//! ```toml
//! settle_delay_ms = 5000
//!
//! [toolchain]
//! package_manager = "npm"
//!
//! [[application]]
//! name = "@scope/logger"
//! path = "../logger"
//!
//! [[application]]
//! name = "@scope/api"
//! path = "../api"
//! tests = true
//! depends_on = ["@scope/logger"]
//! ```

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use log::debug;
use serde::Deserialize;

use crate::deploy::{Application, DEFAULT_SETTLE_DELAY, DeployError, Deployment, Toolchain};
use crate::runtime::Runtime;

pub const DEFAULT_CONFIG_FILE: &str = "deploy.toml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeployConfig {
    pub settle_delay_ms: u64,
    pub skip_publishing: bool,
    pub toolchain: Toolchain,
    #[serde(rename = "application")]
    pub applications: Vec<ApplicationConfig>,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: DEFAULT_SETTLE_DELAY.as_millis() as u64,
            skip_publishing: false,
            toolchain: Toolchain::default(),
            applications: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApplicationConfig {
    pub name: String,
    /// Location relative to the directory holding the configuration file.
    pub path: PathBuf,
    #[serde(default)]
    pub tests: bool,
    #[serde(default)]
    pub depends_on: Vec<String>,
}

impl DeployConfig {
    pub fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("Failed to parse deployment configuration")
    }

    pub fn load<R: Runtime>(runtime: &R, path: &Path) -> Result<Self> {
        debug!("Loading deployment configuration from {}", path.display());
        let contents = runtime.read_to_string(path)?;
        Self::parse(&contents).with_context(|| format!("Invalid configuration in {}", path.display()))
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    /// Build the application graph rooted at `root`.
    ///
    /// Rejects duplicate names, unknown dependencies and cycles before anything
    /// is executed.
    pub fn to_deployment(&self, root: &Path) -> Result<Deployment, DeployError> {
        let mut seen = HashSet::new();
        for app in &self.applications {
            if !seen.insert(app.name.as_str()) {
                return Err(DeployError::DuplicateApplication(app.name.clone()));
            }
        }

        let handles: HashMap<&str, Application> = self
            .applications
            .iter()
            .map(|app| {
                (
                    app.name.as_str(),
                    Application::new(&app.name, root.join(&app.path), app.tests),
                )
            })
            .collect();

        for app in &self.applications {
            let handle = &handles[app.name.as_str()];
            for dependency in &app.depends_on {
                let target = handles.get(dependency.as_str()).ok_or_else(|| {
                    DeployError::UnknownDependency {
                        application: app.name.clone(),
                        dependency: dependency.clone(),
                    }
                })?;
                handle.add_dependency(target);
            }
        }

        let deployment = self
            .applications
            .iter()
            .fold(Deployment::new(root), |deployment, app| {
                deployment.add_application(handles[app.name.as_str()].clone())
            });
        deployment.check_for_cycles()?;
        Ok(deployment)
    }
}
