// src/decoder/eta.rs

//! Remaining-time estimate for a running suite.

/// Extrapolate the time left from the average duration so far.
///
/// `elapsed` runs from the start of the first test to the end of the most
/// recent one. An unknown or exceeded total yields zero.
pub fn estimate_remaining(first_start: f64, last_end: f64, completed: usize, total: usize) -> f64 {
    if completed == 0 || total <= completed {
        return 0.0;
    }
    let elapsed = (last_end - first_start).max(0.0);
    let per_test = elapsed / completed as f64;
    per_test * (total - completed) as f64
}

/// Render an estimate in the coarsest sensible unit.
///
/// Bucket boundaries are strict: exactly 60s is still "60s".
pub fn format_remaining(seconds: f64) -> String {
    let seconds = seconds.max(0.0);
    if seconds > 4800.0 {
        format!("{} hours", (seconds / 3600.0).ceil() as u64)
    } else if seconds > 2400.0 {
        "1 hour".to_string()
    } else if seconds > 120.0 {
        format!("{} mins", (seconds / 60.0) as u64)
    } else if seconds > 60.0 {
        "1 min".to_string()
    } else {
        format!("{}s", seconds as u64)
    }
}
