//! Subcommands and their arguments.

use clap::{Args, Subcommand, ValueEnum};
use esbw_config::Mode;

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Create artifacts
    Build,

    /// Watch files and create artifacts on change
    Watch,

    /// Same as watch, but with a livereload dev server
    Serve,

    /// Same as watch, but runs an artifact after each build
    Run,

    /// Scaffold a config
    Generate(GenerateArgs),
}

impl Command {
    /// The build mode this command runs, `None` for `generate`.
    pub fn mode(&self) -> Option<Mode> {
        match self {
            Command::Build => Some(Mode::Build),
            Command::Watch => Some(Mode::Watch),
            Command::Serve => Some(Mode::Serve),
            Command::Run => Some(Mode::Run),
            Command::Generate(_) => None,
        }
    }
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct GenerateArgs {
    /// Where the bundle will run
    #[arg(long, value_enum, default_value_t = Platform::Browser)]
    pub platform: Platform,

    /// Source language of the project
    #[arg(long, value_enum, default_value_t = Lang::Ts)]
    pub lang: Lang,

    /// Overwrite an existing esbw.toml
    #[arg(long)]
    pub force: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Browser,
    Node,
}

impl Platform {
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Browser => "browser",
            Platform::Node => "node",
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lang {
    Ts,
    Js,
}

impl Lang {
    pub fn extension(self) -> &'static str {
        match self {
            Lang::Ts => "ts",
            Lang::Js => "js",
        }
    }

    /// Extensions matched by the generated watch patterns.
    pub fn watch_extensions(self) -> &'static str {
        match self {
            Lang::Ts => "ts,tsx",
            Lang::Js => "js,jsx",
        }
    }
}
