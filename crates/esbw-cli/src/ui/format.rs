//! Formatting utilities for sizes and durations.

use std::time::Duration;

use esbw_bundler::BuildOutput;

use super::log_with_time;

/// Format a byte count with the most appropriate unit.
///
/// ```
/// use esbw_cli::ui::format_size;
///
/// assert_eq!(format_size(0), "0 B");
/// assert_eq!(format_size(500), "500 B");
/// assert_eq!(format_size(1024), "1.00 KB");
/// assert_eq!(format_size(1_572_864), "1.50 MB");
/// ```
pub fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];

    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut size = bytes as f64;
    let mut unit_idx = 0;

    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    if unit_idx == 0 {
        format!("{} {}", size as u64, UNITS[unit_idx])
    } else {
        format!("{:.2} {}", size, UNITS[unit_idx])
    }
}

/// Format a duration: milliseconds below one second, then seconds, then
/// minutes and seconds.
///
/// ```
/// use std::time::Duration;
/// use esbw_cli::ui::format_duration;
///
/// assert_eq!(format_duration(Duration::from_millis(50)), "50ms");
/// assert_eq!(format_duration(Duration::from_millis(1500)), "1.50s");
/// assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
/// ```
pub fn format_duration(duration: Duration) -> String {
    let total_ms = duration.as_millis();

    if total_ms < 1000 {
        format!("{}ms", total_ms)
    } else if total_ms < 60_000 {
        format!("{:.2}s", duration.as_secs_f64())
    } else {
        let secs = duration.as_secs();
        format!("{}m {}s", secs / 60, secs % 60)
    }
}

/// Log every output file of a build with its size, then the total.
pub fn print_size_report(output: &BuildOutput) {
    for (path, bytes) in output.iter() {
        log_with_time(&format!("{path}: {}", format_size(bytes)));
    }
    let total = output.total_bytes();
    if total > 0 {
        log_with_time(&format!("total {}", format_size(total)));
    }
}
