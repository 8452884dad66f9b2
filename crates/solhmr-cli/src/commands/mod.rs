//! Command implementations.
//!
//! - [`dev`] - watch, rebuild and push
//! - [`sync`] - a single pass
//! - [`check`] - configuration validation
//!
//! Each module exposes an `execute` function taking the parsed arguments.

pub mod check;
pub mod dev;
pub mod sync;
pub(crate) mod utils;

pub use check::execute as check_execute;
pub use dev::execute as dev_execute;
pub use sync::execute as sync_execute;
