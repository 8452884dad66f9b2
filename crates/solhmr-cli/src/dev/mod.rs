//! Development mode: watch the contracts, rerun the pipeline, push results.
//!
//! - [`watcher`] turns file system notifications into [`WatchEvent`]s
//! - [`watch_loop`] runs one pipeline pass per content write
//! - [`server`] exposes the push WebSocket and pass status over HTTP

pub mod config;
pub mod server;
pub mod state;
pub mod watch_loop;
pub mod watcher;

pub use config::DevConfig;
pub use server::DevServer;
pub use state::{DevServerState, SharedState};
pub use watch_loop::{report_outcome, run_watch_loop};
pub use watcher::{is_content_write, ContractWatcher, WatchEvent};
