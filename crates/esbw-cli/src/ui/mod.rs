//! Terminal output for status lines, sizes and durations.
//!
//! Every status line carries a `HH:MM:SS` prefix. Output goes to stderr so
//! that stdout stays free for usage text and child processes.
//!
//! ```no_run
//! use esbw_cli::ui;
//!
//! ui::init(false, false);
//! ui::info("Building artifacts...");
//! ui::warning("config: serveMode.injectArtifacts empty");
//! ```

mod format;
mod messages;

use std::sync::atomic::{AtomicBool, Ordering};

pub use format::{format_duration, format_size, print_size_report};
pub use messages::{error, info, log_with_time, success, warning};

static COLORS: AtomicBool = AtomicBool::new(true);
static QUIET: AtomicBool = AtomicBool::new(false);

/// Configure color and verbosity for the rest of the process.
///
/// Colors are on unless `no_color` is set or the environment says otherwise
/// (see [`crate::logger::should_use_colors`]). `quiet` silences everything
/// except errors.
pub fn init(no_color: bool, quiet: bool) {
    COLORS.store(!no_color && crate::logger::should_use_colors(), Ordering::Relaxed);
    QUIET.store(quiet, Ordering::Relaxed);
}

pub fn colors_enabled() -> bool {
    COLORS.load(Ordering::Relaxed)
}

pub fn is_quiet() -> bool {
    QUIET.load(Ordering::Relaxed)
}
