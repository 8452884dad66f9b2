use super::validation::parse_network_id;
use clap::{Args, Subcommand};
use std::path::PathBuf;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Watch contracts and push rebuilt deployments to the browser
    ///
    /// Starts the push server, then re-runs the reconcile/build/publish
    /// pipeline whenever a file in the contracts directory is written.
    Dev(DevArgs),

    /// Run one reconcile/build/publish pass and exit
    ///
    /// Exits with a non-zero status when reconciliation or the build fails.
    Sync(SyncArgs),

    /// Validate configuration and project layout
    Check(CheckArgs),
}

/// Options shared by every command that operates on a project.
#[derive(Args, Debug, Clone, Default)]
pub struct ProjectArgs {
    /// Project directory (where the build tool runs)
    ///
    /// Relative paths in the configuration are resolved against it.
    /// Defaults to the current directory.
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// Path to solhmr.config.json
    ///
    /// Defaults to solhmr.config.json in the project directory, if present.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Network id of the local development chain
    #[arg(long, value_name = "ID", value_parser = parse_network_id)]
    pub network_id: Option<String>,
}

#[derive(Args, Debug)]
pub struct DevArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Port for the push server
    #[arg(short, long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Directory of a prebuilt UI to serve next to the push endpoint
    #[arg(long, value_name = "DIR")]
    pub ui_dir: Option<PathBuf>,

    /// Open the browser once the server is listening
    #[arg(long)]
    pub open: bool,

    /// Skip the pass that normally runs at startup
    ///
    /// Without it the first build only happens after the first change.
    #[arg(long)]
    pub no_initial_pass: bool,
}

#[derive(Args, Debug)]
pub struct SyncArgs {
    #[command(flatten)]
    pub project: ProjectArgs,
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Print the configuration JSON schema and exit
    #[arg(long)]
    pub schema: bool,
}
