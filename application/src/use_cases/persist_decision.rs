//! Persist decision use case
//!
//! Writes a synthesized decision to the decision log under a unique id.
//! When the id is already taken a fresh one is generated; after
//! `max_id_attempts` occupied ids the last generated id is used without a
//! further check and the store's conditional insert has the final say.

use crate::ports::decision_log::{DecisionLogStore, StoreError};
use crate::ports::id_generator::DecisionIdGenerator;
use arbiter_domain::{DecisionContext, DecisionId, DecisionLogEntry, UnifiedDecisionResult};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that abort persistence
#[derive(Error, Debug)]
pub enum PersistError {
    #[error("Failed to look up decision {decision_id}: {source}")]
    Lookup {
        decision_id: DecisionId,
        #[source]
        source: StoreError,
    },

    #[error("Failed to write decision {decision_id}: {source}")]
    Write {
        decision_id: DecisionId,
        #[source]
        source: StoreError,
    },
}

/// Outcome of a successful write
#[derive(Debug, Clone)]
pub struct PersistedDecision {
    /// The result under its final id
    pub result: UnifiedDecisionResult,
    pub entry: DecisionLogEntry,
    /// Ids checked against the log, including the first
    pub id_attempts: u32,
    /// True when every checked id was taken
    pub attempts_exhausted: bool,
}

/// Writes decisions to a [`DecisionLogStore`]
pub struct DecisionPersister {
    store: Arc<dyn DecisionLogStore>,
    id_generator: Arc<dyn DecisionIdGenerator>,
    max_id_attempts: u32,
}

impl DecisionPersister {
    pub fn new(
        store: Arc<dyn DecisionLogStore>,
        id_generator: Arc<dyn DecisionIdGenerator>,
        max_id_attempts: u32,
    ) -> Self {
        Self {
            store,
            id_generator,
            max_id_attempts: max_id_attempts.max(1),
        }
    }

    pub async fn persist(
        &self,
        result: UnifiedDecisionResult,
        raw_input: &str,
        user_id: Option<&str>,
        context: &DecisionContext,
    ) -> Result<PersistedDecision, PersistError> {
        let (decision_id, id_attempts, attempts_exhausted) =
            self.resolve_unique_id(result.decision_id.clone()).await?;

        let result = if decision_id != result.decision_id {
            info!(
                "Decision id {} taken, persisting as {}",
                result.decision_id, decision_id
            );
            result.with_decision_id(decision_id)
        } else {
            result
        };

        let entry = DecisionLogEntry::from_result(
            &result,
            raw_input,
            user_id.map(str::to_string),
            context.clone(),
            id_attempts,
        );

        self.store
            .put(&entry)
            .await
            .map_err(|source| PersistError::Write {
                decision_id: entry.decision_id.clone(),
                source,
            })?;

        debug!("Persisted decision {}", entry.decision_id);

        Ok(PersistedDecision {
            result,
            entry,
            id_attempts,
            attempts_exhausted,
        })
    }

    /// Walk ids until one is free or the attempt budget runs out.
    ///
    /// Returns the id to write, how many ids were checked, and whether the
    /// budget was exhausted.
    async fn resolve_unique_id(
        &self,
        mut decision_id: DecisionId,
    ) -> Result<(DecisionId, u32, bool), PersistError> {
        for attempt in 1..=self.max_id_attempts {
            let existing = self
                .store
                .get(&decision_id)
                .await
                .map_err(|source| PersistError::Lookup {
                    decision_id: decision_id.clone(),
                    source,
                })?;

            if existing.is_none() {
                return Ok((decision_id, attempt, false));
            }

            let fresh = self.id_generator.generate();
            debug!(
                "Decision id {} already exists (attempt {}/{}), trying {}",
                decision_id, attempt, self.max_id_attempts, fresh
            );
            decision_id = fresh;
        }

        warn!(
            "No free decision id after {} attempts, proceeding with {}",
            self.max_id_attempts, decision_id
        );
        Ok((decision_id, self.max_id_attempts, true))
    }
}
