/// ANSI color helper utilities for terminal output.
pub const RESET: &str = "\x1b[0m";
pub const BOLD: &str = "\x1b[1m";

pub const GREY: &str = "\x1b[90m";
pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";
pub const YELLOW: &str = "\x1b[33m";
pub const BLUE: &str = "\x1b[34m";
pub const CYAN: &str = "\x1b[36m";

/// Fill level color:
/// empty → red
/// under the low threshold → yellow
/// otherwise → green
pub fn color_for_level(fill_percent: f64, low_percent: f64) -> &'static str {
    if fill_percent <= 0.0 {
        RED
    } else if fill_percent < low_percent {
        YELLOW
    } else {
        GREEN
    }
}

/// Grey out placeholder cells ("--").
pub fn colorize_optional(value: &str) -> String {
    if value.trim().is_empty() || value.trim() == "--" {
        format!("{GREY}--{RESET}")
    } else {
        value.to_string()
    }
}
