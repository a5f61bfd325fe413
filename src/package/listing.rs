//! Package manager dependency listing (`npm list --json`).

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Root of the JSON document printed by the package manager's list command.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct PackageListing {
    pub version: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub dependencies: BTreeMap<String, ListedDependency>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ListedDependency {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub resolved: Option<String>,
    #[serde(default)]
    pub overridden: bool,
}

impl PackageListing {
    pub fn parse(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Unable to determine the dependencies of this project.")
    }

    /// `(name, version)` pairs for every direct dependency, sorted by name.
    pub fn dependency_versions(&self) -> Vec<(&str, Option<&str>)> {
        self.dependencies
            .iter()
            .map(|(name, dep)| (name.as_str(), dep.version.as_deref()))
            .collect()
    }
}
