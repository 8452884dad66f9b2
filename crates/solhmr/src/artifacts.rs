//! Build artifact loading.
//!
//! Reads the truffle-style JSON artifacts the build tool leaves in the build
//! directory (one `<Contract>.json` per contract) and keeps the contracts
//! that were deployed on a given network.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tokio::fs;

/// Artifacts larger than this are skipped rather than loaded into memory.
const MAX_ARTIFACT_SIZE: u64 = 64 * 1024 * 1024;

/// Deployment of a contract on one network.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkDeployment {
    #[serde(default)]
    pub address: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<String>,
}

/// A compiled contract as described by its build artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuiltContract {
    pub contract_name: String,

    #[serde(default)]
    pub abi: serde_json::Value,

    #[serde(default)]
    pub bytecode: String,

    #[serde(default)]
    pub deployed_bytecode: String,

    #[serde(default)]
    pub networks: BTreeMap<String, NetworkDeployment>,
}

impl BuiltContract {
    /// Address the contract was deployed at on `network_id`, if any.
    pub fn address_on(&self, network_id: &str) -> Option<&str> {
        self.networks
            .get(network_id)
            .map(|deployment| deployment.address.as_str())
            .filter(|address| !address.is_empty())
    }
}

/// Load every artifact in `build_dir` that has a deployment on `network_id`.
///
/// Contracts are returned sorted by name. Non-JSON files and oversized files
/// are skipped; a JSON file that is not a valid artifact is an error.
pub async fn load_deployed(build_dir: &Path, network_id: &str) -> Result<Vec<BuiltContract>> {
    let mut contracts = Vec::new();
    let mut entries = fs::read_dir(build_dir).await?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();

        if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
            continue;
        }

        let metadata = entry.metadata().await?;
        if !metadata.is_file() {
            continue;
        }
        if metadata.len() > MAX_ARTIFACT_SIZE {
            tracing::warn!(
                "skipping large artifact {}: {} bytes",
                path.display(),
                metadata.len()
            );
            continue;
        }

        let content = fs::read_to_string(&path).await?;
        let contract: BuiltContract =
            serde_json::from_str(&content).map_err(|e| Error::Artifact {
                path: path.clone(),
                reason: e.to_string(),
            })?;

        if contract.address_on(network_id).is_none() {
            tracing::debug!(
                "{} has no deployment on network {}",
                contract.contract_name,
                network_id
            );
            continue;
        }

        contracts.push(contract);
    }

    contracts.sort_by(|a, b| a.contract_name.cmp(&b.contract_name));
    Ok(contracts)
}
