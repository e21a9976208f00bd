//! # esbw-bundler
//!
//! The build capability used by esbw. A [`Bundler`] takes one resolved
//! artifact and produces the sizes of the files it wrote; [`EsbuildCli`]
//! does that by driving the `esbuild` binary.
//!
//! ```no_run
//! use esbw_bundler::{Bundler, EsbuildCli};
//! use esbw_config::{ConfigDiscovery, GlobExpander, Mode, Resolver};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let loaded = ConfigDiscovery::new(".").load_resolved(Mode::Build)?;
//! let expander = GlobExpander::new(".");
//! let bundler = EsbuildCli::new(".");
//!
//! for artifact in Resolver::new(&loaded.config, &expander).resolve(Mode::Build)? {
//!     let output = bundler.compile(&artifact).await?;
//!     println!("{}: {} bytes", artifact.name, output.total_bytes());
//! }
//! # Ok(()) }
//! ```

pub mod error;
pub mod esbuild;
pub mod output;

pub use error::{BuildError, Result};
pub use esbuild::{ESBUILD_ENV, EsbuildCli, translate_options};
pub use output::BuildOutput;

use async_trait::async_trait;
use esbw_config::ResolvedArtifact;

/// Compiles one artifact.
///
/// Implementations must not interpret lifecycle keys; by the time an
/// artifact reaches `compile` they have already been removed.
#[async_trait]
pub trait Bundler: Send + Sync {
    async fn compile(&self, artifact: &ResolvedArtifact) -> Result<BuildOutput>;
}
