//! Reconciliation of remote-network ledger entries.
//!
//! Every entry not on the local network is resolved against its block
//! explorer, its verified source is written into the contracts directory and
//! its bytecode recorded in the ledger. All lookups finish before anything is
//! written, so a failed lookup leaves both the ledger and the contracts
//! directory exactly as they were.

use crate::error::{ResolverError, Result};
use crate::ledger::DeploymentLedger;
use crate::resolver::{RemoteSource, SourceResolver};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Extension given to contract source files written by the reconciler.
pub const SOURCE_EXTENSION: &str = "sol";

#[derive(Debug, Clone)]
pub struct Reconciler {
    contracts_dir: PathBuf,
    ledger_path: PathBuf,
    local_network_id: String,
}

impl Reconciler {
    pub fn new(
        contracts_dir: impl Into<PathBuf>,
        ledger_path: impl Into<PathBuf>,
        local_network_id: impl Into<String>,
    ) -> Self {
        Self {
            contracts_dir: contracts_dir.into(),
            ledger_path: ledger_path.into(),
            local_network_id: local_network_id.into(),
        }
    }

    /// Run one reconciliation pass over `ledger` and persist the result.
    ///
    /// Local-network entries are returned untouched. The ledger file is only
    /// rewritten when a resolved bytecode differs from the recorded one.
    ///
    /// Sources are written one by one before the ledger is saved. An I/O error
    /// part-way through can leave earlier sources written while the ledger
    /// keeps its previous contents; every remote entry is resolved again on
    /// the next pass, which completes the writes.
    pub async fn reconcile(
        &self,
        mut ledger: DeploymentLedger,
        resolver: &dyn SourceResolver,
    ) -> Result<DeploymentLedger> {
        let mut resolved: Vec<(String, RemoteSource)> = Vec::new();

        for (key, record) in ledger.remote_entries(&self.local_network_id) {
            tracing::info!(
                "resolving {} ({}) on network {}",
                key,
                record.address,
                record.network_id
            );
            let source = resolver
                .resolve(&record.address, &record.network_id)
                .await?;
            validate_contract_name(&source.name)?;
            resolved.push((key.clone(), source));
        }

        let mut changed = false;
        for (key, source) in resolved {
            let path = self.source_path(&source.name);
            write_if_changed(&path, &source.source).await?;

            if let Some(record) = ledger.get_mut(&key) {
                let code = prefixed_bytecode(&source.bytecode);
                if record.code != code {
                    record.code = code;
                    changed = true;
                }
            }
        }

        if changed {
            ledger.save_if_changed(&self.ledger_path).await?;
        }
        Ok(ledger)
    }

    /// Path of the source file for contract `name`.
    pub fn source_path(&self, name: &str) -> PathBuf {
        self.contracts_dir.join(format!("{}.{}", name, SOURCE_EXTENSION))
    }
}

fn prefixed_bytecode(bytecode: &str) -> String {
    let bare = bytecode.strip_prefix("0x").unwrap_or(bytecode);
    format!("0x{}", bare)
}

/// Reject names that would escape the contracts directory.
fn validate_contract_name(name: &str) -> Result<(), ResolverError> {
    let unsafe_name = name.is_empty()
        || name == "."
        || name.contains("..")
        || name.contains('/')
        || name.contains('\\')
        || name.contains('\0');

    if unsafe_name {
        return Err(ResolverError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Overwrite `path` with `content` unless it already holds exactly that.
///
/// Skipping identical writes keeps the reconciler from waking the contracts
/// watcher with its own output.
async fn write_if_changed(path: &Path, content: &str) -> std::io::Result<()> {
    match fs::read(path).await {
        Ok(existing) if existing == content.as_bytes() => {
            tracing::debug!("{} is up to date", path.display());
            return Ok(());
        }
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }

    tracing::info!("writing {}", path.display());
    fs::write(path, content).await
}
