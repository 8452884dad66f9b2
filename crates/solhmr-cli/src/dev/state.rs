//! State shared between the push server handlers and the watch loop.

use solhmr::{PassStatus, Pipeline, SubscriberSlot};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

pub type SharedState = Arc<DevServerState>;

pub struct DevServerState {
    pipeline: Arc<Pipeline>,
    /// Number of WebSocket connections accepted since startup
    connections: AtomicU64,
}

impl DevServerState {
    pub fn new(pipeline: Arc<Pipeline>) -> Self {
        Self {
            pipeline,
            connections: AtomicU64::new(0),
        }
    }

    pub fn pipeline(&self) -> &Arc<Pipeline> {
        &self.pipeline
    }

    pub fn subscribers(&self) -> &Arc<SubscriberSlot> {
        self.pipeline.subscribers()
    }

    pub fn status(&self) -> PassStatus {
        self.pipeline.status()
    }

    /// Record an accepted connection and return how many there have been.
    pub fn record_connection(&self) -> u64 {
        self.connections.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn connection_count(&self) -> u64 {
        self.connections.load(Ordering::Relaxed)
    }
}
