//! Command-line interface definition.
//!
//! - `solhmr dev` - watch contracts, rebuild on change and push results
//! - `solhmr sync` - run a single reconcile/build/publish pass
//! - `solhmr check` - validate configuration and project layout

mod commands;
mod validation;

use clap::Parser;

pub use commands::{CheckArgs, Command, DevArgs, ProjectArgs, SyncArgs};
pub use validation::parse_network_id;

/// solhmr - live reload for smart-contract development
#[derive(Parser, Debug)]
#[command(
    name = "solhmr",
    version,
    about = "Live reload for smart-contract development",
    long_about = "solhmr watches your Solidity sources, pulls verified sources of contracts\n\
                  deployed on public networks, re-runs your build/deploy tool and pushes the\n\
                  freshly deployed addresses and ABIs to the browser over a WebSocket."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}
