//! Event store port for decision projections.

use arbiter_domain::EventEnvelope;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EventStoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Event store error: {0}")]
    Backend(String),
}

/// Append-only sink for decision events
#[async_trait]
pub trait EventStore: Send + Sync {
    async fn append(&self, event: &EventEnvelope) -> Result<(), EventStoreError>;
}

/// No-op implementation for tests and when events are disabled.
pub struct NoEventStore;

#[async_trait]
impl EventStore for NoEventStore {
    async fn append(&self, _event: &EventEnvelope) -> Result<(), EventStoreError> {
        Ok(())
    }
}
