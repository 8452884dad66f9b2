//! The loop that turns watch events into pipeline passes.

use crate::dev::WatchEvent;
use crate::error::{CliError, Result};
use crate::ui;
use solhmr::{OutboundMessage, Pipeline};
use tokio::sync::mpsc;

/// Run one pass per content write until the channel closes.
///
/// Events are handled strictly one after another: the next event is only
/// dequeued once the current pass has published its result.
///
/// # Errors
///
/// A watcher fault is published as `server-error` and then ends the loop
/// with [`CliError::Watch`]. A pass that cannot persist the ledger also
/// ends the loop.
pub async fn run_watch_loop(
    pipeline: &Pipeline,
    events: &mut mpsc::Receiver<WatchEvent>,
) -> Result<()> {
    while let Some(event) = events.recv().await {
        match event {
            WatchEvent::Write(path) => {
                tracing::info!("{} changed, rebuilding", path.display());
                let message = pipeline.run_pass().await?;
                report_outcome(&message, &pipeline.layout().local_network_id);
            }
            WatchEvent::Fault(error) => {
                tracing::error!("file watcher failed: {}", error);
                let message = pipeline.report_watcher_fault(&error)?;
                report_outcome(&message, &pipeline.layout().local_network_id);
                return Err(CliError::Watch(error));
            }
        }
    }

    tracing::debug!("watch channel closed");
    Ok(())
}

/// Print the result of a pass for the developer.
pub fn report_outcome(message: &OutboundMessage, network_id: &str) {
    match message {
        OutboundMessage::NewVersion { contracts } => {
            ui::success(&format!(
                "Deployed {} contract{}",
                contracts.len(),
                if contracts.len() == 1 { "" } else { "s" }
            ));
            ui::print_contract_summary(contracts, network_id);
        }
        OutboundMessage::CompileFailed { error } => ui::error(error),
        OutboundMessage::ServerError { error } => ui::error(&format!("Server error: {}", error)),
    }
}
