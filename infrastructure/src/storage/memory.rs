//! In-memory decision log.

use arbiter_application::ports::decision_log::{DecisionLogStore, StoreError};
use arbiter_domain::{DecisionId, DecisionLogEntry};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Decision log held in a `HashMap`; lost when the process exits.
#[derive(Default)]
pub struct InMemoryDecisionLog {
    entries: RwLock<HashMap<DecisionId, DecisionLogEntry>>,
}

impl InMemoryDecisionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl DecisionLogStore for InMemoryDecisionLog {
    async fn get(&self, decision_id: &DecisionId) -> Result<Option<DecisionLogEntry>, StoreError> {
        Ok(self.entries.read().await.get(decision_id).cloned())
    }

    async fn put(&self, entry: &DecisionLogEntry) -> Result<(), StoreError> {
        let mut entries = self.entries.write().await;
        if entries.contains_key(&entry.decision_id) {
            return Err(StoreError::AlreadyExists(entry.decision_id.clone()));
        }
        entries.insert(entry.decision_id.clone(), entry.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::fixtures::entry;

    #[tokio::test]
    async fn test_put_then_get() {
        let log = InMemoryDecisionLog::new();
        let stored = entry("d-1");
        log.put(&stored).await.unwrap();

        let loaded = log.get(&stored.decision_id).await.unwrap();
        assert_eq!(loaded, Some(stored));
        assert_eq!(log.len().await, 1);
    }

    #[tokio::test]
    async fn test_get_missing() {
        let log = InMemoryDecisionLog::new();
        let id = DecisionId::new("nope").unwrap();
        assert!(log.get(&id).await.unwrap().is_none());
        assert!(log.is_empty().await);
    }

    #[tokio::test]
    async fn test_put_never_overwrites() {
        let log = InMemoryDecisionLog::new();
        let first = entry("d-1");
        log.put(&first).await.unwrap();

        let mut second = entry("d-1");
        second.raw_input = "something else".to_string();
        let err = log.put(&second).await.unwrap_err();

        assert!(err.is_conflict());
        let kept = log.get(&first.decision_id).await.unwrap().unwrap();
        assert_eq!(kept.raw_input, "write a post");
    }
}
