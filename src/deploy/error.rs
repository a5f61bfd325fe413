//! Typed deployment errors.
//!
//! Command failures are reported as [`crate::runtime::CommandError`] and
//! version problems as [`crate::package::VersionError`]; both travel through
//! `anyhow` alongside these.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeployError {
    #[error("Cyclic dependency detected: {}", .0.join(" -> "))]
    CyclicDependency(Vec<String>),

    #[error("Application \"{0}\" is declared more than once.")]
    DuplicateApplication(String),

    #[error("Application \"{application}\" depends on unknown application \"{dependency}\".")]
    UnknownDependency {
        application: String,
        dependency: String,
    },

    #[error("One or more test failed! Applications won't be deployed! ({})", .0.join(", "))]
    TestsFailed(Vec<String>),

    #[error("This deployment has already run.")]
    AlreadyRun,
}
