//! Deployment ledger: contract name to deployment record, persisted as JSON.
//!
//! The ledger is loaded fresh at the start of every pass and threaded through
//! reconciliation and publishing by value. Entries are kept in name order so
//! that saving the same ledger twice produces byte-identical files.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Network identifier of the local development chain.
pub const LOCAL_NETWORK_ID: &str = "1337";

/// Where and on which network a single contract is deployed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentRecord {
    #[serde(rename = "networkID")]
    pub network_id: String,

    #[serde(default)]
    pub address: String,

    /// `0x`-prefixed bytecode for remote contracts, empty for local ones
    #[serde(default)]
    pub code: String,
}

impl DeploymentRecord {
    /// Record with no resolved bytecode yet.
    pub fn new(network_id: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            network_id: network_id.into(),
            address: address.into(),
            code: String::new(),
        }
    }

    pub fn is_on(&self, network_id: &str) -> bool {
        self.network_id == network_id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeploymentLedger {
    records: BTreeMap<String, DeploymentRecord>,
}

impl DeploymentLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the ledger from `path`.
    ///
    /// A missing file is an empty ledger; a file that exists but does not
    /// parse is an error.
    pub async fn load(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("ledger {} not found, starting empty", path.display());
                return Ok(Self::new());
            }
            Err(e) => return Err(e.into()),
        };

        if content.trim().is_empty() {
            return Ok(Self::new());
        }

        serde_json::from_str(&content).map_err(|e| Error::Ledger {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Persist the ledger to `path`, replacing the previous file.
    ///
    /// Written to a sibling temp file first and renamed into place so a crash
    /// mid-write never leaves a truncated ledger.
    pub async fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let tmp = tmp_path(path);
        fs::write(&tmp, self.to_json()?).await?;
        fs::rename(&tmp, path).await?;

        tracing::debug!("saved {} ledger entries to {}", self.len(), path.display());
        Ok(())
    }

    /// Persist the ledger unless `path` already holds the same entries.
    ///
    /// The comparison is on parsed entries, so a hand-formatted file that
    /// matches is left byte-for-byte alone, and an empty ledger never creates
    /// a missing file. Returns whether a write happened.
    pub async fn save_if_changed(&self, path: &Path) -> Result<bool> {
        if Self::load(path).await? == *self {
            tracing::debug!("ledger {} is up to date", path.display());
            return Ok(false);
        }
        self.save(path).await?;
        Ok(true)
    }

    /// Serialized form of the ledger as written to disk.
    pub fn to_json(&self) -> Result<String> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }

    pub fn get(&self, name: &str) -> Option<&DeploymentRecord> {
        self.records.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut DeploymentRecord> {
        self.records.get_mut(name)
    }

    /// Insert or overwrite the record for `name`.
    pub fn upsert(&mut self, name: impl Into<String>, record: DeploymentRecord) {
        self.records.insert(name.into(), record);
    }

    /// Entries that must be resolved against a remote network.
    pub fn remote_entries<'a>(
        &'a self,
        local_network_id: &'a str,
    ) -> impl Iterator<Item = (&'a String, &'a DeploymentRecord)> + 'a {
        self.records
            .iter()
            .filter(move |(_, record)| !record.is_on(local_network_id))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<(String, DeploymentRecord)> for DeploymentLedger {
    fn from_iter<I: IntoIterator<Item = (String, DeploymentRecord)>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
