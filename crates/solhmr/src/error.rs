//! Error types for the reconcile/build/publish pipeline.
//!
//! A failed build is an expected outcome of a pass and is modelled as a
//! value ([`BuildFailure`]) rather than only as an error, so the pipeline can
//! turn it into a `compile-failed` message without unwinding.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// The ledger file exists but could not be read or parsed
    #[error("failed to load ledger {}: {reason}", .path.display())]
    Ledger { path: PathBuf, reason: String },

    /// A remote source lookup failed; the pass is aborted
    #[error(transparent)]
    Resolver(#[from] ResolverError),

    /// The external build tool failed
    #[error(transparent)]
    Build(#[from] BuildFailure),

    /// A build artifact could not be read or parsed
    #[error("invalid build artifact {}: {reason}", .path.display())]
    Artifact { path: PathBuf, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure to resolve the source of a contract deployed on a remote network.
#[derive(Debug, Error)]
pub enum ResolverError {
    #[error("no block explorer configured for network {0}")]
    UnsupportedNetwork(String),

    #[error("request to block explorer failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("block explorer rejected request for {address} on network {network_id}: {message}")]
    Api {
        address: String,
        network_id: String,
        message: String,
    },

    #[error("contract {address} on network {network_id} has no verified source")]
    Unverified { address: String, network_id: String },

    #[error("no bytecode deployed at {address} on network {network_id}")]
    NoBytecode { address: String, network_id: String },

    #[error("refusing to write source for contract with unsafe name '{0}'")]
    InvalidName(String),

    #[error("invalid block explorer url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// The build tool did not succeed.
///
/// `message` carries the diagnostic text shown to the developer verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct BuildFailure {
    pub message: String,
}

impl BuildFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
