//! Messages pushed to the connected development client.

use crate::artifacts::BuiltContract;
use serde::{Deserialize, Serialize};

/// Outcome of a pipeline pass, or a watcher malfunction, as seen by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum OutboundMessage {
    /// The file watcher failed; the server is about to exit
    ServerError { error: String },

    /// Reconciliation or the build failed
    CompileFailed { error: String },

    /// The build succeeded and deployed this contract set
    NewVersion { contracts: Vec<BuiltContract> },
}

impl OutboundMessage {
    pub fn server_error(error: impl ToString) -> Self {
        Self::ServerError {
            error: error.to_string(),
        }
    }

    pub fn compile_failed(error: impl ToString) -> Self {
        Self::CompileFailed {
            error: error.to_string(),
        }
    }

    pub fn new_version(contracts: Vec<BuiltContract>) -> Self {
        Self::NewVersion { contracts }
    }

    /// Wire name of the message type.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ServerError { .. } => "server-error",
            Self::CompileFailed { .. } => "compile-failed",
            Self::NewVersion { .. } => "new-version",
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
