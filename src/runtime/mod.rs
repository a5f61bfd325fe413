//! Runtime abstraction for system operations.
//!
//! Every side effect the deployer performs goes through the [`Runtime`]
//! trait, so the orchestration logic can be exercised against a mock.
//!
//! # Structure
//!
//! - `env` - Working directory
//! - `fs` - File reads used for configuration
//! - `process` - External command execution and the settle delay

mod env;
mod fs;
mod process;

use anyhow::Result;
use async_trait::async_trait;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub use process::CommandError;

/// A program plus its arguments, executed without a shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandLine {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Runtime: Send + Sync {
    // Environment
    fn current_dir(&self) -> Result<PathBuf>;

    // File System
    fn read_to_string(&self, path: &Path) -> Result<String>;
    fn exists(&self, path: &Path) -> bool;

    // Processes
    /// Run a command in `cwd` with inherited stdio, failing on a non-zero exit.
    async fn run(&self, command: &CommandLine, cwd: &Path) -> Result<()>;

    /// Run a command in `cwd` and return its captured stdout, failing on a non-zero exit.
    async fn output(&self, command: &CommandLine, cwd: &Path) -> Result<String>;

    async fn sleep(&self, duration: Duration);
}

pub struct RealRuntime;

#[async_trait]
impl Runtime for RealRuntime {
    fn current_dir(&self) -> Result<PathBuf> {
        self.current_dir_impl()
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        self.read_to_string_impl(path)
    }

    fn exists(&self, path: &Path) -> bool {
        self.exists_impl(path)
    }

    async fn run(&self, command: &CommandLine, cwd: &Path) -> Result<()> {
        self.run_impl(command, cwd).await
    }

    async fn output(&self, command: &CommandLine, cwd: &Path) -> Result<String> {
        self.output_impl(command, cwd).await
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await
    }
}
