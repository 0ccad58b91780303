//! Shared styling utilities for terminal output.

use console::Style;

/// Create a success-styled string (green with checkmark).
pub fn success(msg: &str) -> String {
    let style = Style::new().green();
    format!("{} {}", style.apply_to("✓"), msg)
}

/// Create an error-styled string (red with cross).
pub fn error(msg: &str) -> String {
    let style = Style::new().red();
    format!("{} {}", style.apply_to("✗"), msg)
}

/// Create a warning-styled string (yellow).
pub fn warn(msg: &str) -> String {
    let style = Style::new().yellow();
    format!("{} {}", style.apply_to("⚠"), msg)
}

/// Create a header-styled string (bold).
pub fn header(msg: &str) -> String {
    let style = Style::new().bold();
    style.apply_to(msg).to_string()
}

/// Create a dim-styled string.
pub fn dim(msg: &str) -> String {
    let style = Style::new().dim();
    style.apply_to(msg).to_string()
}

/// Yes/no rendered green or red.
pub fn yes_no(value: bool) -> String {
    if value {
        Style::new().green().apply_to("yes").to_string()
    } else {
        Style::new().red().apply_to("no").to_string()
    }
}

/// Severity label coloured by rank.
pub fn severity(label: &str) -> String {
    let style = match label {
        "high" => Style::new().red().bold(),
        "medium" => Style::new().yellow(),
        _ => Style::new().dim(),
    };
    style.apply_to(label).to_string()
}
