//! Single-subscriber push slot.
//!
//! At most one client listens at a time. Attaching a new client replaces the
//! previous one, whose receiver then sees the channel close. Sending never
//! blocks the pipeline: with no subscriber, a full buffer or a closed
//! receiver the message is dropped.

use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;

/// Messages buffered per subscriber before new ones are dropped.
pub const SUBSCRIBER_BUFFER: usize = 16;

#[derive(Debug)]
struct Current {
    id: u64,
    tx: mpsc::Sender<String>,
}

#[derive(Debug, Default)]
pub struct SubscriberSlot {
    current: RwLock<Option<Current>>,
    next_id: AtomicU64,
}

impl SubscriberSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a new subscriber, replacing any existing one.
    ///
    /// # Returns
    ///
    /// Subscriber id (for [`detach`](Self::detach)) and the receiving end
    pub fn attach(&self) -> (u64, mpsc::Receiver<String>) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(SUBSCRIBER_BUFFER);

        if let Some(previous) = self.current.write().replace(Current { id, tx }) {
            tracing::info!("client {} replaced by client {}", previous.id, id);
        }

        (id, rx)
    }

    /// Remove subscriber `id` if it is still the current one.
    pub fn detach(&self, id: u64) {
        let mut current = self.current.write();
        if current.as_ref().is_some_and(|c| c.id == id) {
            *current = None;
        }
    }

    pub fn is_connected(&self) -> bool {
        self.current
            .read()
            .as_ref()
            .is_some_and(|c| !c.tx.is_closed())
    }

    /// Best-effort, non-blocking send.
    ///
    /// Returns `true` if the message was queued for the subscriber.
    pub fn send(&self, message: String) -> bool {
        let current = self.current.read();
        let Some(current) = current.as_ref() else {
            tracing::debug!("no client connected, dropping message");
            return false;
        };

        match current.tx.try_send(message) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!("client {} is not keeping up, dropping message", current.id);
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::debug!("client {} went away, dropping message", current.id);
                false
            }
        }
    }
}
