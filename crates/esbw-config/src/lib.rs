//! Configuration model for esbw.
//!
//! An esbw project declares a set of named *artifacts* (bundles handed to
//! esbuild) plus per-mode sections (`buildMode`, `watchMode`, `serveMode`,
//! `runMode`) that override bundler options and carry lifecycle settings.
//!
//! The usual path through this crate is:
//!
//! 1. [`ConfigDiscovery`] finds and parses the config file into an [`EsbwConfig`]
//! 2. [`validate`] checks artifact references and formats for the active [`Mode`]
//! 3. [`apply_defaults`] fills gaps and produces an immutable [`ResolvedConfig`]
//! 4. [`Resolver`] turns the resolved config into concrete build specs each cycle
//!
//! ```no_run
//! use esbw_config::{ConfigDiscovery, GlobExpander, Mode, Resolver};
//!
//! let loaded = ConfigDiscovery::new(".").load_resolved(Mode::Build).unwrap();
//! let expander = GlobExpander::new(".");
//! let artifacts = Resolver::new(&loaded.config, &expander).resolve(Mode::Build).unwrap();
//! for artifact in &artifacts {
//!     println!("{} -> {:?}", artifact.name, artifact.entry_points);
//! }
//! ```

pub mod config;
pub mod defaults;
pub mod discovery;
pub mod error;
pub mod glob;
pub mod hook;
pub mod mode;
pub mod options;
pub mod resolve;
pub mod validation;

pub use config::{EsbwConfig, ModeConfig};
pub use defaults::{
    DEFAULT_INDEX, DEFAULT_RUNNER, ResolvedConfig, ResolvedMode, RunSettings, ServeSettings,
    apply_defaults,
};
pub use discovery::{CONFIG_FILE_NAMES, ConfigDiscovery, LoadedConfig};
pub use error::{ConfigError, ResolveError, Result};
pub use glob::{Expander, GlobExpander};
pub use hook::{Hook, HookFn, HookFuture};
pub use mode::Mode;
pub use options::{BuildOptions, Format, LIFECYCLE_KEYS};
pub use resolve::{
    ResolvedArtifact, Resolver, compute_watch_paths, expand_entry_points, merge_spec,
    select_artifacts,
};
pub use validation::{ConfigWarning, validate};
