//! Miette diagnostic conversion for CLI errors.

use crate::error::CliError;
use miette::Report;

/// Convert CliError to miette Report
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Config(e) => miette::miette!("Configuration error: {}", e),
        CliError::Core(e) => core_error_to_miette(e),
        CliError::PassFailed(error) => {
            miette::miette!("Pass failed:\n{}", error)
        }
        CliError::Watch(error) => miette::miette!(
            "File watcher stopped: {}\n\nHint: Restart `solhmr dev` once the contracts directory is reachable",
            error
        ),
        _ => miette::miette!("{}", err),
    }
}

/// Convert a pipeline error to miette Report
pub fn core_error_to_miette(err: solhmr::Error) -> Report {
    match err {
        solhmr::Error::Ledger { path, reason } => miette::miette!(
            "Cannot use deployment ledger {}: {}\n\nHint: The ledger must be a JSON object keyed by contract name",
            path.display(),
            reason
        ),
        solhmr::Error::Resolver(solhmr::ResolverError::UnsupportedNetwork(network)) => {
            miette::miette!(
                "No block explorer configured for network {}\n\nHint: Add it under \"explorers\" in solhmr.config.json",
                network
            )
        }
        _ => miette::miette!("{}", err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_network_has_hint() {
        let err = CliError::from(solhmr::ResolverError::UnsupportedNetwork("99".to_string()));
        let report = cli_error_to_miette(err);
        let text = report.to_string();
        assert!(text.contains("network 99"));
        assert!(text.contains("explorers"));
    }

    #[test]
    fn test_generic_error_keeps_message() {
        let report = cli_error_to_miette(CliError::Server("address in use".to_string()));
        assert_eq!(report.to_string(), "Server error: address in use");
    }
}
