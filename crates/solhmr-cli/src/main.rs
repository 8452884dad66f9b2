//! solhmr - live reload for smart-contract development.
//!
//! Parses arguments, sets up logging and colors, and dispatches to the
//! command implementations.

use clap::Parser;
use miette::Result;
use solhmr_cli::{cli, commands, error, logger, ui};

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    logger::init_logger(args.verbose, args.quiet, args.no_color);
    ui::init_colors_with(args.no_color);

    let result = match args.command {
        cli::Command::Dev(dev_args) => commands::dev_execute(dev_args).await,
        cli::Command::Sync(sync_args) => commands::sync_execute(sync_args).await,
        cli::Command::Check(check_args) => commands::check_execute(check_args).await,
    };

    result.map_err(error::cli_error_to_miette)
}
