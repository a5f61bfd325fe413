//! External command execution.

use anyhow::Result;
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use thiserror::Error;
use tokio::process::Command;

use super::{CommandLine, RealRuntime};

/// Failure of an external command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Failed to start `{command}` in {cwd}: {source}")]
    Spawn {
        command: String,
        cwd: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` exited with {status} in {cwd}")]
    Failed {
        command: String,
        cwd: String,
        status: ExitStatus,
    },

    #[error("`{command}` produced output that is not valid UTF-8")]
    InvalidOutput { command: String },
}

fn build(command: &CommandLine, cwd: &Path) -> Command {
    let mut cmd = Command::new(&command.program);
    cmd.args(&command.args).current_dir(cwd).kill_on_drop(true);
    cmd
}

fn spawn_error(command: &CommandLine, cwd: &Path, source: std::io::Error) -> CommandError {
    CommandError::Spawn {
        command: command.to_string(),
        cwd: cwd.display().to_string(),
        source,
    }
}

fn check_status(command: &CommandLine, cwd: &Path, status: ExitStatus) -> Result<(), CommandError> {
    if status.success() {
        Ok(())
    } else {
        Err(CommandError::Failed {
            command: command.to_string(),
            cwd: cwd.display().to_string(),
            status,
        })
    }
}

impl RealRuntime {
    #[tracing::instrument(skip(self, command), fields(command = %command))]
    pub(crate) async fn run_impl(&self, command: &CommandLine, cwd: &Path) -> Result<()> {
        let status = build(command, cwd)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| spawn_error(command, cwd, e))?;

        check_status(command, cwd, status)?;
        Ok(())
    }

    #[tracing::instrument(skip(self, command), fields(command = %command))]
    pub(crate) async fn output_impl(&self, command: &CommandLine, cwd: &Path) -> Result<String> {
        let output = build(command, cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .output()
            .await
            .map_err(|e| spawn_error(command, cwd, e))?;

        check_status(command, cwd, output.status)?;
        String::from_utf8(output.stdout).map_err(|_| {
            CommandError::InvalidOutput {
                command: command.to_string(),
            }
            .into()
        })
    }
}
