//! Logging setup for the solhmr CLI.
//!
//! Built on `tracing`. `--verbose` enables debug output for the solhmr
//! crates, `--quiet` limits output to errors, and `RUST_LOG` overrides the
//! default filter when neither flag is given.
//!
//! # Example
//!
//! ```rust,no_run
//! use solhmr_cli::logger::init_logger;
//!
//! init_logger(false, false, false);
//! tracing::info!("watching contracts");
//! ```

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const VERBOSE_FILTER: &str = "solhmr=debug,solhmr_cli=debug,tower_http=debug";
const QUIET_FILTER: &str = "solhmr=error,solhmr_cli=error";
const DEFAULT_FILTER: &str = "solhmr=info,solhmr_cli=info";

/// Build the filter for the given flags.
///
/// `verbose` wins over `quiet`.
pub fn filter_for(verbose: bool, quiet: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else if quiet {
        EnvFilter::new(QUIET_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}

/// Initialize the global tracing subscriber.
///
/// Call once, before anything logs.
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    init_logger_with_filter(filter_for(verbose, quiet), no_color);
}

/// Initialize the global tracing subscriber with an explicit filter.
pub fn init_logger_with_filter(filter: EnvFilter, no_color: bool) {
    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color && should_use_colors())
        .compact();

    // A subscriber may already be installed (tests).
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

/// Whether log output should be colored.
///
/// `NO_COLOR` disables and `FORCE_COLOR` forces colors; otherwise the
/// terminal decides.
pub fn should_use_colors() -> bool {
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    console::Term::stderr().features().colors_supported()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_no_color_disables_colors() {
        unsafe {
            std::env::remove_var("FORCE_COLOR");
            std::env::set_var("NO_COLOR", "1");
        }
        assert!(!should_use_colors());
        unsafe {
            std::env::remove_var("NO_COLOR");
        }
    }

    #[test]
    #[serial]
    fn test_force_color_enables_colors() {
        unsafe {
            std::env::remove_var("NO_COLOR");
            std::env::set_var("FORCE_COLOR", "1");
        }
        assert!(should_use_colors());
        unsafe {
            std::env::remove_var("FORCE_COLOR");
        }
    }

    #[test]
    fn test_verbose_filter_wins_over_quiet() {
        let filter = filter_for(true, true);
        assert!(filter.to_string().contains("solhmr=debug"));
    }

    #[test]
    fn test_quiet_filter() {
        let filter = filter_for(false, true);
        assert!(filter.to_string().contains("solhmr=error"));
    }
}
