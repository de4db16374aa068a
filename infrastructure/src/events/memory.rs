//! In-memory event store.

use arbiter_application::ports::event_store::{EventStore, EventStoreError};
use arbiter_domain::EventEnvelope;
use async_trait::async_trait;
use tokio::sync::Mutex;

/// Keeps appended events in order; useful for tests and `--format json` runs.
#[derive(Default)]
pub struct InMemoryEventStore {
    events: Mutex<Vec<EventEnvelope>>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything appended so far
    pub async fn events(&self) -> Vec<EventEnvelope> {
        self.events.lock().await.clone()
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn append(&self, event: &EventEnvelope) -> Result<(), EventStoreError> {
        self.events.lock().await.push(event.clone());
        Ok(())
    }
}
