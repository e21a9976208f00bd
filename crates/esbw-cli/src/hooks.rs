//! Running before-all and after-all hooks.
//!
//! Command hooks run through the platform shell (`sh -c`, or `cmd /C` on
//! Windows) in the project directory with inherited stdio. Action hooks are
//! awaited directly.

use std::io;
use std::path::{Path, PathBuf};

use esbw_config::Hook;
use thiserror::Error;
use tokio::process::Command;

#[derive(Debug, Error)]
pub enum HookError {
    #[error("failed to start hook `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("hook `{command}` exited with {}", exit_description(.code))]
    Exit { command: String, code: Option<i32> },

    #[error("hook failed: {0:#}")]
    Action(anyhow::Error),
}

fn exit_description(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "no status (terminated by a signal)".to_string(),
    }
}

/// Runs hooks relative to a working directory.
#[derive(Debug, Clone)]
pub struct HookRunner {
    cwd: PathBuf,
}

impl HookRunner {
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self { cwd: cwd.into() }
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub async fn run(&self, hook: &Hook) -> Result<(), HookError> {
        match hook {
            Hook::Command(command) => self.run_command(command).await,
            Hook::Action(action) => action().await.map_err(HookError::Action),
        }
    }

    async fn run_command(&self, command: &str) -> Result<(), HookError> {
        tracing::debug!(command, "running hook");

        let status = shell(command)
            .current_dir(&self.cwd)
            .status()
            .await
            .map_err(|source| HookError::Spawn {
                command: command.to_string(),
                source,
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(HookError::Exit {
                command: command.to_string(),
                code: status.code(),
            })
        }
    }
}

#[cfg(windows)]
fn shell(command: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(command);
    cmd
}

#[cfg(not(windows))]
fn shell(command: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command);
    cmd
}
