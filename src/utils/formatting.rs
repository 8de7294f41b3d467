//! Formatting utilities used for CLI outputs.

pub fn ml(v: f64) -> String {
    format!("{v:.1} ml")
}

pub fn ml_opt(v: Option<f64>) -> String {
    v.map(ml).unwrap_or_else(|| "--".to_string())
}

pub fn percent(v: f64) -> String {
    format!("{v:.0}%")
}

/// "3d 04h" style duration from fractional days.
pub fn days2readable(days: f64) -> String {
    if !days.is_finite() || days < 0.0 {
        return "--".to_string();
    }
    let total_hours = (days * 24.0).floor() as i64;
    let (d, h) = (total_hours / 24, total_hours % 24);
    if d > 0 {
        format!("{d}d {h:02}h")
    } else {
        format!("{h}h")
    }
}

/// Ten-cell gauge, e.g. "[######----]".
pub fn gauge(fill_percent: f64) -> String {
    let filled = ((fill_percent.clamp(0.0, 100.0) / 10.0).round()) as usize;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(10 - filled))
}
