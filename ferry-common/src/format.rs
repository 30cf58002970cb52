//! Human-readable formatting helpers
//!
//! Listing rows carry file sizes as display strings; the same formatting
//! is reused for client-side progress output.

/// Format a byte count with binary units and one decimal place
///
/// Examples: `"0.0 B"`, `"10.0 B"`, `"1.5 KiB"`, `"2.0 GiB"`.
#[must_use]
pub fn human_size(bytes: u64) -> String {
    let mut size = bytes as f64;
    for unit in ["", "Ki", "Mi", "Gi", "Ti"] {
        if size < 1024.0 {
            return format!("{:.1} {}B", size, unit);
        }
        size /= 1024.0;
    }
    format!("{:.1} PiB", size)
}

/// Format a transfer rate as a per-second size string
#[must_use]
pub fn human_speed(bytes_per_second: f64) -> String {
    if bytes_per_second <= 0.0 {
        return "0.0 B/s".to_string();
    }
    format!("{}/s", human_size(bytes_per_second as u64))
}

/// Format an ETA in seconds as `MM:SS`, or `--:--` when unknown
#[must_use]
pub fn human_eta(eta_seconds: Option<f64>) -> String {
    match eta_seconds {
        Some(eta) if eta.is_finite() && eta >= 0.0 => {
            let total = eta.round() as u64;
            format!("{:02}:{:02}", total / 60, total % 60)
        }
        _ => "--:--".to_string(),
    }
}
