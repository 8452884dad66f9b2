//! Terminal output helpers.
//!
//! Status lines go to stderr so stdout stays clean for machine-readable
//! output such as `solhmr check --schema`.
//!
//! ```no_run
//! use solhmr_cli::ui;
//!
//! ui::init_colors_with(false);
//! let spinner = ui::Spinner::new("Building contracts...");
//! spinner.finish("Build succeeded");
//! ui::warning("No client connected");
//! ```

mod format;
mod messages;
mod spinner;

pub use format::{format_duration, print_contract_summary};
pub use messages::{error, info, success, warning};
pub use spinner::Spinner;

/// Whether we are running under a CI system.
pub fn is_ci() -> bool {
    std::env::var("CI").is_ok()
        || std::env::var("GITHUB_ACTIONS").is_ok()
        || std::env::var("GITLAB_CI").is_ok()
}

/// Whether status lines should be colored.
///
/// Respects `NO_COLOR` and `FORCE_COLOR`, then falls back to terminal
/// detection on stderr.
pub fn should_use_color() -> bool {
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    console::user_attended_stderr()
}

/// Apply the color decision globally.
///
/// `--no-color` always wins.
pub fn init_colors_with(no_color: bool) {
    let enabled = !no_color && should_use_color();
    owo_colors::set_override(enabled);
}
