//! Common utilities and helpers

pub mod logging;

/// Format a duration in seconds for display, e.g. `21.0s` or `1m 03.5s`
pub fn format_seconds(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "-".to_string();
    }
    let minutes = (seconds / 60.0).floor();
    if minutes < 1.0 {
        format!("{:.1}s", seconds)
    } else {
        format!("{}m {:04.1}s", minutes, seconds - minutes * 60.0)
    }
}

/// Format file size for display
pub fn format_file_size(size: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = size as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", size as u64, UNITS[unit_index])
    } else {
        format!("{:.2} {}", size, UNITS[unit_index])
    }
}
