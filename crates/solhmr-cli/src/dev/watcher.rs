//! Contracts directory watcher.
//!
//! Watches a single directory, non-recursively, and forwards content writes
//! and watcher failures into a tokio channel. Everything else (creates,
//! removes, renames, metadata, access) is dropped here.

use crate::error::{CliError, Result};
use notify::event::ModifyKind;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;

/// Capacity of the channel between the notify thread and the watch loop.
const EVENT_BUFFER: usize = 100;

/// Something the watch loop has to react to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// File content was written
    Write(PathBuf),
    /// The watcher itself reported an error
    Fault(String),
}

/// Whether `kind` is a write to file content.
pub fn is_content_write(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Modify(ModifyKind::Data(_)) | EventKind::Modify(ModifyKind::Any)
    )
}

/// Map a raw notify result to a [`WatchEvent`], if it is one we act on.
pub fn classify(res: notify::Result<Event>, root: &Path) -> Option<WatchEvent> {
    match res {
        Ok(event) if is_content_write(&event.kind) => {
            let path = event
                .paths
                .into_iter()
                .next()
                .unwrap_or_else(|| root.to_path_buf());
            Some(WatchEvent::Write(path))
        }
        Ok(_) => None,
        Err(e) => Some(WatchEvent::Fault(e.to_string())),
    }
}

/// Watcher for the contracts directory.
///
/// Dropping it stops the underlying notify watcher and closes the channel.
pub struct ContractWatcher {
    _watcher: RecommendedWatcher,
    root: PathBuf,
}

impl ContractWatcher {
    /// Start watching `root`.
    ///
    /// # Errors
    ///
    /// Returns an error if `root` does not exist or the platform watcher
    /// cannot be created.
    pub fn new(root: PathBuf) -> Result<(Self, mpsc::Receiver<WatchEvent>)> {
        if !root.is_dir() {
            return Err(CliError::FileNotFound(root));
        }

        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let root_clone = root.clone();

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            if let Some(event) = classify(res, &root_clone) {
                // The receiver is gone once the loop has stopped.
                let _ = tx.blocking_send(event);
            }
        })?;

        watcher.watch(&root, RecursiveMode::NonRecursive)?;
        tracing::debug!("watching {}", root.display());

        Ok((
            Self {
                _watcher: watcher,
                root,
            },
            rx,
        ))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}
