//! Turning pass outcomes into client messages.
//!
//! Every pass yields exactly one [`OutboundMessage`]. It is delivered only if
//! a client is attached; ledger updates happen regardless.

use crate::artifacts::BuiltContract;
use crate::build::BuildOutcome;
use crate::error::Result;
use crate::ledger::{DeploymentLedger, DeploymentRecord};
use crate::message::OutboundMessage;
use crate::subscriber::SubscriberSlot;
use std::path::PathBuf;
use std::sync::Arc;

pub struct ResultPublisher {
    ledger_path: PathBuf,
    local_network_id: String,
    subscribers: Arc<SubscriberSlot>,
}

impl ResultPublisher {
    pub fn new(
        ledger_path: impl Into<PathBuf>,
        local_network_id: impl Into<String>,
        subscribers: Arc<SubscriberSlot>,
    ) -> Self {
        Self {
            ledger_path: ledger_path.into(),
            local_network_id: local_network_id.into(),
            subscribers,
        }
    }

    /// Publish the result of a build.
    ///
    /// On success the deployed addresses are merged into `ledger` and the
    /// ledger is persisted before `new-version` is sent. On failure the
    /// ledger is not touched.
    ///
    /// # Returns
    ///
    /// The message that was produced, whether or not it was delivered
    pub async fn publish(
        &self,
        ledger: DeploymentLedger,
        outcome: BuildOutcome,
    ) -> Result<OutboundMessage> {
        let message = match outcome {
            BuildOutcome::Success { contracts } => {
                let ledger = merge_deployments(ledger, &contracts, &self.local_network_id);
                ledger.save(&self.ledger_path).await?;
                OutboundMessage::new_version(contracts)
            }
            BuildOutcome::Failure { error } => OutboundMessage::compile_failed(error),
        };

        self.deliver(&message)?;
        Ok(message)
    }

    /// Report a pass that was aborted before the build ran.
    pub fn aborted(&self, error: impl ToString) -> Result<OutboundMessage> {
        let message = OutboundMessage::compile_failed(error);
        self.deliver(&message)?;
        Ok(message)
    }

    /// Report a file watcher malfunction.
    pub fn server_error(&self, error: impl ToString) -> Result<OutboundMessage> {
        let message = OutboundMessage::server_error(error);
        self.deliver(&message)?;
        Ok(message)
    }

    /// Send `message` to the attached client, if any.
    fn deliver(&self, message: &OutboundMessage) -> Result<bool> {
        if !self.subscribers.is_connected() {
            tracing::debug!("no client connected, {} not sent", message.kind());
            return Ok(false);
        }

        let delivered = self.subscribers.send(message.to_json()?);
        if delivered {
            tracing::debug!("sent {} to client", message.kind());
        }
        Ok(delivered)
    }
}

/// Record every freshly deployed contract as a local deployment.
///
/// Existing records with the same name are overwritten, whatever network they
/// pointed at before; records for contracts absent from the build are kept.
pub fn merge_deployments(
    mut ledger: DeploymentLedger,
    contracts: &[BuiltContract],
    local_network_id: &str,
) -> DeploymentLedger {
    for contract in contracts {
        let address = contract.address_on(local_network_id).unwrap_or_default();
        ledger.upsert(
            contract.contract_name.clone(),
            DeploymentRecord::new(local_network_id, address),
        );
    }
    ledger
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::LOCAL_NETWORK_ID;

    fn built(name: &str, address: &str) -> BuiltContract {
        serde_json::from_value(serde_json::json!({
            "contractName": name,
            "networks": {"1337": {"address": address}}
        }))
        .unwrap()
    }

    #[test]
    fn test_merge_overwrites_and_clears_code() {
        let mut ledger = DeploymentLedger::new();
        let mut remote = DeploymentRecord::new("4", "0x111");
        remote.code = "0x6001".to_string();
        ledger.upsert("Bar", remote);
        ledger.upsert("Stale", DeploymentRecord::new("5", "0x222"));

        let ledger = merge_deployments(
            ledger,
            &[built("Bar", "0xbbb"), built("Foo", "0xdef")],
            LOCAL_NETWORK_ID,
        );

        assert_eq!(
            ledger.get("Bar"),
            Some(&DeploymentRecord::new(LOCAL_NETWORK_ID, "0xbbb"))
        );
        assert_eq!(
            ledger.get("Foo"),
            Some(&DeploymentRecord::new(LOCAL_NETWORK_ID, "0xdef"))
        );
        assert_eq!(ledger.get("Stale").unwrap().network_id, "5");
    }

    #[tokio::test]
    async fn test_failure_is_sent_to_attached_client() {
        let temp = tempfile::TempDir::new().unwrap();
        let slot = Arc::new(SubscriberSlot::new());
        let (_id, mut rx) = slot.attach();

        let publisher =
            ResultPublisher::new(temp.path().join("deployments.json"), LOCAL_NETWORK_ID, slot);
        let message = publisher
            .publish(
                DeploymentLedger::new(),
                BuildOutcome::Failure {
                    error: "syntax error".to_string(),
                },
            )
            .await
            .unwrap();

        assert_eq!(message, OutboundMessage::compile_failed("syntax error"));
        let sent = rx.recv().await.unwrap();
        assert_eq!(
            serde_json::from_str::<serde_json::Value>(&sent).unwrap(),
            serde_json::json!({"type": "compile-failed", "error": "syntax error"})
        );
        assert!(!temp.path().join("deployments.json").exists());
    }

    #[tokio::test]
    async fn test_success_without_client_still_saves_ledger() {
        let temp = tempfile::TempDir::new().unwrap();
        let ledger_path = temp.path().join("deployments.json");
        let slot = Arc::new(SubscriberSlot::new());

        let publisher = ResultPublisher::new(&ledger_path, LOCAL_NETWORK_ID, slot);
        let message = publisher
            .publish(
                DeploymentLedger::new(),
                BuildOutcome::Success {
                    contracts: vec![built("Foo", "0xdef")],
                },
            )
            .await
            .unwrap();

        assert_eq!(message.kind(), "new-version");
        let saved = DeploymentLedger::load(&ledger_path).await.unwrap();
        assert_eq!(saved.get("Foo").unwrap().address, "0xdef");
    }

    #[test]
    fn test_server_error_without_client() {
        let temp = tempfile::TempDir::new().unwrap();
        let publisher = ResultPublisher::new(
            temp.path().join("deployments.json"),
            LOCAL_NETWORK_ID,
            Arc::new(SubscriberSlot::new()),
        );

        let message = publisher.server_error("watch queue overflow").unwrap();
        assert_eq!(message, OutboundMessage::server_error("watch queue overflow"));
    }
}
