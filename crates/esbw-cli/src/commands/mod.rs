//! Command implementations.
//!
//! - [`modes`] - build, watch, serve and run
//! - [`generate`] - project scaffolding

pub mod generate;
pub mod modes;
mod templates;

use crate::cli::{Command, GlobalArgs};
use crate::error::Result;

/// Execute `command` with the shared options in `global`.
pub async fn execute(global: &GlobalArgs, command: Command) -> Result<()> {
    match command {
        Command::Generate(args) => generate::execute(&global.cwd, &args),
        other => match other.mode() {
            Some(mode) => modes::execute(global, mode).await,
            None => Ok(()),
        },
    }
}
