//! One reconcile → build → publish pass.
//!
//! The ledger is loaded from disk at the start of every pass and handed
//! explicitly from stage to stage. Passes never overlap: a second caller
//! waits for the running pass to finish.

use crate::artifacts;
use crate::build::{BuildOutcome, BuildRunner};
use crate::error::Result;
use crate::ledger::DeploymentLedger;
use crate::message::OutboundMessage;
use crate::publish::ResultPublisher;
use crate::reconcile::Reconciler;
use crate::resolver::SourceResolver;
use crate::subscriber::SubscriberSlot;
use parking_lot::RwLock;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;

/// Where the pipeline is in the current pass.
///
/// `Succeeded` and `Failed` are idle states that remember how the last pass
/// ended; the pipeline is ready for the next event in all three of `Idle`,
/// `Succeeded` and `Failed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "kebab-case")]
pub enum PassStatus {
    Idle,
    Reconciling,
    Building,
    Succeeded { duration_ms: u64 },
    Failed { error: String },
}

impl PassStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, PassStatus::Succeeded { .. })
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            PassStatus::Failed { error } => Some(error),
            _ => None,
        }
    }
}

/// Filesystem layout of the project the pipeline works on.
#[derive(Debug, Clone)]
pub struct ProjectLayout {
    /// Directory the build tool runs in
    pub project_dir: PathBuf,
    /// Directory holding contract sources (watched)
    pub contracts_dir: PathBuf,
    /// Directory the build tool writes artifacts to
    pub build_dir: PathBuf,
    /// Ledger file
    pub ledger_path: PathBuf,
    /// Network id of the local development chain
    pub local_network_id: String,
}

pub struct Pipeline {
    layout: ProjectLayout,
    reconciler: Reconciler,
    publisher: ResultPublisher,
    resolver: Arc<dyn SourceResolver>,
    builder: Arc<dyn BuildRunner>,
    subscribers: Arc<SubscriberSlot>,
    status: RwLock<PassStatus>,
    pass_lock: Mutex<()>,
}

impl Pipeline {
    pub fn new(
        layout: ProjectLayout,
        resolver: Arc<dyn SourceResolver>,
        builder: Arc<dyn BuildRunner>,
        subscribers: Arc<SubscriberSlot>,
    ) -> Self {
        let reconciler = Reconciler::new(
            &layout.contracts_dir,
            &layout.ledger_path,
            &layout.local_network_id,
        );
        let publisher = ResultPublisher::new(
            &layout.ledger_path,
            &layout.local_network_id,
            Arc::clone(&subscribers),
        );

        Self {
            layout,
            reconciler,
            publisher,
            resolver,
            builder,
            subscribers,
            status: RwLock::new(PassStatus::Idle),
            pass_lock: Mutex::new(()),
        }
    }

    pub fn layout(&self) -> &ProjectLayout {
        &self.layout
    }

    pub fn subscribers(&self) -> &Arc<SubscriberSlot> {
        &self.subscribers
    }

    pub fn status(&self) -> PassStatus {
        self.status.read().clone()
    }

    fn set_status(&self, status: PassStatus) {
        *self.status.write() = status;
    }

    /// Run one full pass and publish its outcome.
    ///
    /// Reconciliation and build failures are outcomes, not errors: they are
    /// published as `compile-failed` and returned. `Err` is reserved for
    /// failures to persist the ledger after a successful build or to encode
    /// a message. A build only counts as succeeded once its ledger is saved;
    /// if saving fails the client gets `compile-failed` instead.
    pub async fn run_pass(&self) -> Result<OutboundMessage> {
        let _guard = self.pass_lock.lock().await;
        let started = Instant::now();

        self.set_status(PassStatus::Reconciling);
        let ledger = match self.reconcile().await {
            Ok(ledger) => ledger,
            Err(e) => {
                let error = e.to_string();
                tracing::error!("reconciliation failed: {}", error);
                self.set_status(PassStatus::Failed {
                    error: error.clone(),
                });
                return self.publisher.aborted(error);
            }
        };

        self.set_status(PassStatus::Building);
        let outcome = self.build().await;

        match &outcome {
            BuildOutcome::Success { contracts } => {
                tracing::info!(
                    "build succeeded in {}ms with {} deployed contracts",
                    started.elapsed().as_millis(),
                    contracts.len()
                );
            }
            BuildOutcome::Failure { error } => {
                tracing::error!("build failed: {}", error);
                self.set_status(PassStatus::Failed {
                    error: error.clone(),
                });
            }
        }

        if !outcome.is_success() {
            return self.publisher.publish(ledger, outcome).await;
        }

        match self.publisher.publish(ledger, outcome).await {
            Ok(message) => {
                let duration_ms = started.elapsed().as_millis() as u64;
                self.set_status(PassStatus::Succeeded { duration_ms });
                Ok(message)
            }
            Err(e) => {
                let error = format!("failed to save deployment ledger: {}", e);
                tracing::error!("{}", error);
                self.set_status(PassStatus::Failed {
                    error: error.clone(),
                });
                self.publisher.aborted(error)?;
                Err(e)
            }
        }
    }

    /// Report a watcher malfunction to the client.
    pub fn report_watcher_fault(&self, error: impl ToString) -> Result<OutboundMessage> {
        let error = error.to_string();
        self.set_status(PassStatus::Failed {
            error: error.clone(),
        });
        self.publisher.server_error(error)
    }

    async fn reconcile(&self) -> Result<DeploymentLedger> {
        let ledger = DeploymentLedger::load(&self.layout.ledger_path).await?;
        self.reconciler
            .reconcile(ledger, self.resolver.as_ref())
            .await
    }

    async fn build(&self) -> BuildOutcome {
        if let Err(failure) = self.builder.run(&self.layout.project_dir).await {
            return BuildOutcome::Failure {
                error: failure.message,
            };
        }

        match artifacts::load_deployed(&self.layout.build_dir, &self.layout.local_network_id).await
        {
            Ok(contracts) => BuildOutcome::Success { contracts },
            Err(e) => BuildOutcome::Failure {
                error: format!("failed to read build artifacts: {}", e),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_predicates() {
        assert!(!PassStatus::Idle.is_success());
        assert!(PassStatus::Building.error().is_none());

        let ok = PassStatus::Succeeded { duration_ms: 12 };
        assert!(ok.is_success());
        assert!(ok.error().is_none());

        let failed = PassStatus::Failed {
            error: "syntax error".to_string(),
        };
        assert!(!failed.is_success());
        assert_eq!(failed.error(), Some("syntax error"));
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_value(PassStatus::Succeeded { duration_ms: 5 }).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"state": "succeeded", "duration_ms": 5})
        );

        let json = serde_json::to_value(PassStatus::Idle).unwrap();
        assert_eq!(json, serde_json::json!({"state": "idle"}));
    }
}
