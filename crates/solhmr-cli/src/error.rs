//! Error handling for the solhmr CLI.
//!
//! `CliError` is the top-level error returned by commands. Configuration
//! problems get their own `ConfigError` with actionable hints, and errors
//! from the pipeline library convert automatically through `#[from]`.
//!
//! # Example
//!
//! ```rust,no_run
//! use solhmr_cli::error::{Result, ResultExt};
//! use std::path::Path;
//!
//! fn read_ledger(path: &Path) -> Result<String> {
//!     std::fs::read_to_string(path).with_path(path)
//! }
//! ```

mod miette;

pub use self::miette::cli_error_to_miette;

use std::path::PathBuf;
use thiserror::Error;

/// Top-level CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration-related errors (file not found, invalid values, etc.)
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Errors from the reconcile/build/publish pipeline
    #[error("{0}")]
    Core(#[from] solhmr::Error),

    /// Invalid command-line arguments or options
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// File or directory not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// I/O errors from file system operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Push server errors
    #[error("Server error: {0}")]
    Server(String),

    /// The file watcher failed; unrecoverable
    #[error("File watcher error: {0}")]
    Watch(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A pipeline pass ended in failure (used by one-shot commands)
    #[error("{0}")]
    PassFailed(String),

    /// Generic errors with custom messages
    #[error("{0}")]
    Custom(String),
}

impl From<notify::Error> for CliError {
    fn from(err: notify::Error) -> Self {
        CliError::Watch(err.to_string())
    }
}

impl From<solhmr::ResolverError> for CliError {
    fn from(err: solhmr::ResolverError) -> Self {
        CliError::Core(err.into())
    }
}

/// Configuration-specific errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file doesn't exist at the expected location
    #[error("Config file not found: {}\n\nHint: Create a solhmr.config.json file or drop --config", .0.display())]
    NotFound(PathBuf),

    /// Config file has invalid JSON syntax
    #[error("Invalid JSON in config file: {0}\n\nHint: Use a JSON validator to check syntax")]
    InvalidJson(#[from] serde_json::Error),

    /// Config file fails JSON schema validation
    #[error("Schema validation failed:\n{errors}\n\nHint: Run 'solhmr check --schema' to print the expected schema")]
    ValidationFailed {
        /// Formatted validation error messages
        errors: String,
    },

    /// Missing required configuration field
    #[error("Missing required field: {field}\n\nHint: {hint}")]
    MissingField {
        /// Name of the missing field
        field: String,
        /// Helpful hint for providing the field
        hint: String,
    },

    /// Invalid value for a configuration option
    #[error("Invalid value for '{field}': {value}\n\nHint: {hint}")]
    InvalidValue {
        /// Name of the field with invalid value
        field: String,
        /// The invalid value
        value: String,
        /// Helpful hint for correct values
        hint: String,
    },

    /// I/O error while reading config
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using `CliError` as the default error type.
pub type Result<T, E = CliError> = std::result::Result<T, E>;

/// Extension trait for adding context to `Result` types.
pub trait ResultExt<T> {
    /// Turn a not-found I/O error into [`CliError::FileNotFound`] for `path`.
    fn with_path(self, path: impl AsRef<std::path::Path>) -> Result<T>;

    /// Append a hint to the error message.
    fn with_hint(self, hint: impl std::fmt::Display) -> Result<T>;

    /// Prefix the error message with `msg`.
    fn context(self, msg: impl std::fmt::Display) -> Result<T>;
}

impl<T, E: Into<CliError>> ResultExt<T> for std::result::Result<T, E> {
    fn with_path(self, path: impl AsRef<std::path::Path>) -> Result<T> {
        self.map_err(|e| {
            let err: CliError = e.into();
            match err {
                CliError::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound => {
                    CliError::FileNotFound(path.as_ref().to_path_buf())
                }
                other => other,
            }
        })
    }

    fn with_hint(self, hint: impl std::fmt::Display) -> Result<T> {
        self.map_err(|e| {
            let err: CliError = e.into();
            CliError::Custom(format!("{}\n\nHint: {}", err, hint))
        })
    }

    fn context(self, msg: impl std::fmt::Display) -> Result<T> {
        self.map_err(|e| {
            let err: CliError = e.into();
            CliError::Custom(format!("{}: {}", msg, err))
        })
    }
}
