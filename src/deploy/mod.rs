//! Dependency-ordered deployment of a set of packages.
//!
//! A [`Deployment`] validates the requested version, installs tooling and runs
//! tests for every [`Application`], then publishes them in order. Each
//! application deploys its own undeployed dependencies first.

mod application;
mod deployment;
mod error;
mod graph;
mod progress;
mod toolchain;

use std::time::Duration;

use crate::runtime::Runtime;

pub use application::Application;
pub use deployment::{DeployOptions, DeployOutcome, Deployment, DeploymentStage};
pub use error::DeployError;
pub use graph::find_cycle;
pub use toolchain::Toolchain;

/// Default pause after each publish so the registry can index the package.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(5000);

/// Everything an application needs to run its external commands.
pub struct DeployContext<'a, R: Runtime> {
    pub runtime: &'a R,
    pub toolchain: &'a Toolchain,
    pub settle_delay: Duration,
}
