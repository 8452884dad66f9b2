//! One-line status messages written to stderr.

use owo_colors::OwoColorize;

/// Print a success message with a green checkmark.
pub fn success(message: &str) {
    eprintln!("{} {}", "✓".green().bold(), message);
}

/// Print an informational message.
pub fn info(message: &str) {
    eprintln!("{} {}", "ℹ".blue().bold(), message);
}

/// Print a warning.
pub fn warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow().bold(), message.yellow());
}

/// Print an error. Multi-line build output is indented under the marker.
pub fn error(message: &str) {
    let mut lines = message.lines();
    let first = lines.next().unwrap_or_default();
    eprintln!("{} {}", "✗".red().bold(), first.red());
    for line in lines {
        eprintln!("  {}", line);
    }
}
