//! Decision log port
//!
//! The store owns its schema; this port only needs a lookup by id and a
//! conditional insert. `put` must be atomic with respect to the existence
//! check: it fails with [`StoreError::AlreadyExists`] instead of overwriting,
//! which keeps the collision retry loop safe under concurrency.

use arbiter_domain::{DecisionId, DecisionLogEntry};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Decision {0} already exists")]
    AlreadyExists(DecisionId),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::AlreadyExists(_))
    }
}

/// Persistent, replayable log of decisions
#[async_trait]
pub trait DecisionLogStore: Send + Sync {
    async fn get(&self, decision_id: &DecisionId) -> Result<Option<DecisionLogEntry>, StoreError>;

    /// Insert a new entry; never overwrites an existing one
    async fn put(&self, entry: &DecisionLogEntry) -> Result<(), StoreError>;
}
