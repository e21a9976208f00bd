//! Generate command implementation.
//!
//! Writes a starter config into the project directory, plus an index
//! document for browser projects and an entry file when none exists.

use std::fs;
use std::path::{Path, PathBuf};

use crate::cli::{GenerateArgs, Platform};
use crate::commands::templates;
use crate::error::{CliError, Result, ResultExt};
use crate::ui;

/// Name of the generated config file.
pub const CONFIG_FILE: &str = "esbw.toml";

/// Execute the generate command in `root`.
///
/// # Errors
///
/// Returns [`CliError::AlreadyExists`] if `esbw.toml` exists and `--force`
/// was not given, or an I/O error if a file cannot be written.
pub fn execute(root: &Path, args: &GenerateArgs) -> Result<()> {
    if !root.is_dir() {
        return Err(CliError::FileNotFound(root.to_path_buf()));
    }

    let config_path = root.join(CONFIG_FILE);
    if config_path.exists() && !args.force {
        return Err(CliError::AlreadyExists(config_path));
    }

    fs::write(&config_path, templates::config_toml(args.platform, args.lang))
        .with_path(&config_path)?;
    ui::success(&format!("Created {CONFIG_FILE}"));

    if args.platform == Platform::Browser {
        let name = project_name(root);
        write_if_absent(
            root,
            Path::new("public/index.html"),
            &templates::index_html(&name),
        )?;
    }

    let entry = PathBuf::from(format!("src/index.{}", args.lang.extension()));
    write_if_absent(
        root,
        &entry,
        templates::source_file(args.platform, args.lang),
    )?;

    ui::info("Next: run `esbw build`");
    Ok(())
}

fn write_if_absent(root: &Path, relative: &Path, content: &str) -> Result<()> {
    let path = root.join(relative);
    if path.exists() {
        tracing::debug!(path = %path.display(), "keeping existing file");
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, content).with_path(&path)?;
    ui::success(&format!("Created {}", relative.display()));
    Ok(())
}

fn project_name(root: &Path) -> String {
    root.canonicalize()
        .ok()
        .as_deref()
        .and_then(Path::file_name)
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "app".to_string())
}
