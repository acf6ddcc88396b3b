// src/utils/format.rs
//! Human-readable formatting for logs and CLI output

use std::time::Duration;

/// Parameter count with a K/M/B suffix
pub fn format_params(n: usize) -> String {
    if n >= 1_000_000_000 {
        format!("{:.2}B", n as f64 / 1e9)
    } else if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1e6)
    } else if n >= 1_000 {
        format!("{:.1}K", n as f64 / 1e3)
    } else {
        n.to_string()
    }
}

/// Wall-clock time as `1h2m5s`, `2m5s` or `4.2s`
pub fn format_duration(elapsed: Duration) -> String {
    let total = elapsed.as_secs();
    let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);

    match (h, m) {
        (0, 0) => format!("{:.1}s", elapsed.as_secs_f64()),
        (0, _) => format!("{}m{}s", m, s),
        _ => format!("{}h{}m{}s", h, m, s),
    }
}
