//! `solhmr dev`: watch, rebuild, push.
//!
//! Lifecycle:
//! - load configuration and wire the pipeline
//! - start the contracts watcher and the push server
//! - optionally run a first pass right away
//! - run one pass per content write until Ctrl+C, a server failure or a
//!   watcher fault

use crate::cli::DevArgs;
use crate::commands::utils::build_pipeline;
use crate::config::SolhmrConfig;
use crate::dev::server::open_browser;
use crate::dev::{
    report_outcome, run_watch_loop, ContractWatcher, DevConfig, DevServer, DevServerState,
};
use crate::error::{CliError, Result, ResultExt};
use crate::ui;
use std::sync::Arc;
use tokio::signal;

/// Execute the dev command.
///
/// # Errors
///
/// Returns errors for invalid configuration, a missing contracts directory,
/// a port that cannot be bound and watcher faults. Build failures are not
/// errors; they are pushed to the client and the loop keeps running.
pub async fn execute(args: DevArgs) -> Result<()> {
    ui::info("Starting solhmr dev...");

    let config = SolhmrConfig::load_for_dev(&args)?;
    let dev_config = DevConfig::from_config(&config);
    let pipeline = Arc::new(build_pipeline(&config)?);
    let layout = pipeline.layout().clone();

    ui::info(&format!("Project directory: {}", layout.project_dir.display()));
    ui::info(&format!("Ledger: {}", layout.ledger_path.display()));

    let (watcher, mut events) = ContractWatcher::new(layout.contracts_dir.clone())
        .with_hint("Create the contracts directory or point contractsDir at it")?;
    ui::info(&format!("Watching {}", watcher.root().display()));

    let state = Arc::new(DevServerState::new(Arc::clone(&pipeline)));
    let server = DevServer::new(dev_config.clone(), state);
    let mut server_handle = tokio::spawn(server.start());

    if dev_config.open_browser {
        open_browser(&dev_config.server_url());
    }

    if !args.no_initial_pass {
        ui::info("Running initial pass...");
        let message = pipeline.run_pass().await?;
        report_outcome(&message, &layout.local_network_id);
    }

    ui::info("Press Ctrl+C to stop");

    let result = tokio::select! {
        result = run_watch_loop(&pipeline, &mut events) => result,

        _ = signal::ctrl_c() => {
            ui::info("Shutting down...");
            Ok(())
        }

        joined = &mut server_handle => match joined {
            Ok(Ok(())) => Err(CliError::Server("push server stopped unexpectedly".to_string())),
            Ok(Err(e)) => Err(e),
            Err(e) => Err(CliError::Server(format!("push server task failed: {}", e))),
        },
    };

    server_handle.abort();
    drop(watcher);

    if result.is_ok() {
        ui::success("solhmr dev stopped");
    }
    result
}
