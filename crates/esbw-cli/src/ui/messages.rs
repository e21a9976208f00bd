//! Timestamped status messages.

use owo_colors::OwoColorize;

use super::{colors_enabled, is_quiet};

#[derive(Clone, Copy)]
enum Level {
    Info,
    Success,
    Warn,
    Error,
}

fn timestamp() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}

fn render(message: &str, level: Level) -> String {
    let t = timestamp();
    if !colors_enabled() {
        return format!("{t}: {message}");
    }
    match level {
        Level::Info => format!("{}: {message}", t.dimmed()),
        Level::Success => format!("{}: {}", t.dimmed(), message.green()),
        Level::Warn => format!("{}: {}", t.dimmed(), message.yellow()),
        Level::Error => format!("{}: {}", t.dimmed(), message.red()),
    }
}

fn emit(message: &str, level: Level) {
    if is_quiet() && !matches!(level, Level::Error) {
        return;
    }
    eprintln!("{}", render(message, level));
}

/// Print `message` with a time prefix.
pub fn log_with_time(message: &str) {
    emit(message, Level::Info);
}

pub fn info(message: &str) {
    emit(message, Level::Info);
}

pub fn success(message: &str) {
    emit(message, Level::Success);
}

pub fn warning(message: &str) {
    emit(message, Level::Warn);
}

/// Printed even in quiet mode.
pub fn error(message: &str) {
    emit(message, Level::Error);
}
