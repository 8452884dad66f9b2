//! solhmr CLI - live reload for smart-contract development.
//!
//! Wraps the `solhmr` pipeline with a file watcher, a WebSocket push server
//! and a configuration layer.
//!
//! - [`cli`] - argument parsing
//! - [`config`] - `solhmr.config.json`, `SOLHMR_*` variables and flags
//! - [`dev`] - watcher, watch loop and push server
//! - [`commands`] - `dev`, `sync` and `check`
//! - [`error`] - error types with actionable messages
//! - [`logger`] - tracing setup
//! - [`ui`] - terminal output
//!
//! # Example
//!
//! ```rust
//! use solhmr_cli::{error::Result, logger};
//!
//! fn main() -> Result<()> {
//!     logger::init_logger(false, false, true);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod dev;
pub mod error;
pub mod logger;
pub mod ui;

pub use config::SolhmrConfig;
pub use error::{CliError, ConfigError, Result, ResultExt};
