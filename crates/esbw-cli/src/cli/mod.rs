//! Command-line interface definition for esbw.
//!
//! - `esbw build` - build the selected artifacts once
//! - `esbw watch` - rebuild on change
//! - `esbw serve` - rebuild on change and serve with live reload
//! - `esbw run` - rebuild on change and (re)start the built program
//! - `esbw generate` - scaffold a starter config

mod commands;

use std::path::PathBuf;

use clap::{CommandFactory, Parser};

pub use commands::{Command, GenerateArgs, Lang, Platform};

/// esbw - build, watch, serve and run esbuild artifacts from one config
#[derive(Parser, Debug, Clone)]
#[command(
    name = "esbw",
    version,
    about = "Build, watch, serve and run esbuild artifacts from one config",
    long_about = "esbw reads a project's artifact configuration (esbw.toml, esbw.json or the\n\
                  \"esbw\" field of package.json) and drives esbuild in one of four modes."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Project directory (defaults to the current directory)
    #[arg(long, global = true, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// Config file to use instead of searching the project directory
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// esbuild executable
    #[arg(long, global = true, value_name = "BIN", env = "ESBW_ESBUILD")]
    pub esbuild: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Options shared by every command.
#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub cwd: PathBuf,
    pub config: Option<PathBuf>,
    pub esbuild: Option<PathBuf>,
}

impl Cli {
    pub fn global(&self) -> GlobalArgs {
        GlobalArgs {
            cwd: self.cwd.clone().unwrap_or_else(|| PathBuf::from(".")),
            config: self.config.clone(),
            esbuild: self.esbuild.clone(),
        }
    }
}

/// Usage text printed for a missing or unknown command.
pub fn usage() -> String {
    Cli::command().render_help().to_string()
}

/// Parse the process arguments.
///
/// `--help` and `--version` behave as usual. Any other parse failure prints
/// usage to stdout and yields `None`.
pub fn parse_or_usage() -> Option<Cli> {
    parse_from_or_usage(std::env::args_os())
}

pub fn parse_from_or_usage<I, T>(args: I) -> Option<Cli>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    match Cli::try_parse_from(args) {
        Ok(cli) => Some(cli),
        Err(err) => {
            use clap::error::ErrorKind;
            match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => err.exit(),
                _ => {
                    tracing::debug!(%err, "unrecognised arguments");
                    print!("{}", usage());
                    None
                }
            }
        }
    }
}
