//! esbw CLI - one config, four ways to run esbuild.
//!
//! This crate provides the `esbw` command-line tool. It loads a project's
//! artifact configuration and then, depending on the mode:
//!
//! - `build` - builds every selected artifact once
//! - `watch` - rebuilds on every change to the watched files
//! - `serve` - like watch, plus a dev server with live reload
//! - `run` - like watch, plus (re)starting the built program as a child process
//!
//! # Architecture
//!
//! - [`orchestrator`] - one build cycle: hooks, concurrent builds, completion signal
//! - [`supervisor`] - child processes of run mode and their stop escalation
//! - [`dev`] - dev server, live-reload stream and the file watcher
//! - [`watch_loop`] - turns change events into serialized build cycles
//! - [`commands`] - mode execution and project scaffolding
//! - [`error`], [`logger`], [`ui`] - the usual CLI plumbing
//!
//! # Example
//!
//! ```rust,no_run
//! use esbw_cli::{error::Result, logger};
//!
//! fn main() -> Result<()> {
//!     logger::init_logger(false, false, false);
//!     // mode execution...
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod dev;
pub mod error;
pub mod hooks;
pub mod logger;
pub mod orchestrator;
pub mod supervisor;
pub mod ui;
pub mod watch_loop;

pub use error::{CliError, Result, ResultExt};
