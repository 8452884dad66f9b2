//! `solhmr sync`: run exactly one pass.

use crate::cli::SyncArgs;
use crate::commands::utils::build_pipeline;
use crate::config::SolhmrConfig;
use crate::dev::report_outcome;
use crate::error::{CliError, Result};
use crate::ui;
use solhmr::OutboundMessage;
use std::time::Instant;

/// Execute the sync command.
///
/// Reconciles remote ledger entries, runs the build and merges the local
/// deployments into the ledger, as a single watch-triggered pass would.
///
/// # Errors
///
/// Returns [`CliError::PassFailed`] when reconciliation or the build fails.
pub async fn execute(args: SyncArgs) -> Result<()> {
    let config = SolhmrConfig::load(&args.project)?;
    let pipeline = build_pipeline(&config)?;

    let spinner = ui::Spinner::new("Reconciling ledger and building contracts...");
    let started = Instant::now();
    let message = pipeline.run_pass().await;
    let elapsed = ui::format_duration(started.elapsed());

    match message? {
        OutboundMessage::CompileFailed { error } => {
            spinner.fail(&format!("Pass failed after {}", elapsed));
            Err(CliError::PassFailed(error))
        }
        message => {
            spinner.finish(&format!("Pass finished in {}", elapsed));
            report_outcome(&message, &config.network_id);
            Ok(())
        }
    }
}
