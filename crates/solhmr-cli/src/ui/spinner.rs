//! Spinner for one-shot passes.

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use std::time::Duration;

pub struct Spinner {
    pb: ProgressBar,
}

impl Spinner {
    /// Create and start a spinner.
    ///
    /// Outside a terminal, or under CI, the spinner stays hidden.
    pub fn new(message: &str) -> Self {
        let pb = if super::is_ci() || !console::user_attended_stderr() {
            ProgressBar::hidden()
        } else {
            ProgressBar::new_spinner()
        };

        let style = ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["◐", "◓", "◑", "◒"]);
        pb.set_style(style);
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));

        Self { pb }
    }

    /// Finish with a green checkmark.
    pub fn finish(&self, message: &str) {
        self.pb
            .finish_with_message(format!("{} {}", "✓".green(), message));
    }

    /// Finish with a red cross.
    pub fn fail(&self, message: &str) {
        self.pb.finish_with_message(format!("{} {}", "✗".red(), message));
    }
}
