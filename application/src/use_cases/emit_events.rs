//! Emit decision events use case
//!
//! Projects a persisted decision into downstream events. Emission is
//! best-effort: a failed append is logged and never fails the decision.

use crate::config::CoordinatorConfig;
use crate::ports::event_store::EventStore;
use arbiter_domain::decision::events::{project_branch_proposed, project_decision_required};
use arbiter_domain::{DecisionEvent, EventEnvelope, UnifiedDecisionResult};
use std::sync::Arc;
use tracing::{debug, warn};

/// What happened to one projected event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmissionStatus {
    Emitted,
    /// Projection did not apply or the event kind is disabled
    Skipped,
    Failed(String),
}

impl EmissionStatus {
    pub fn is_emitted(&self) -> bool {
        matches!(self, EmissionStatus::Emitted)
    }
}

/// Per-event outcome of one emission pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmissionReport {
    pub branch_proposed: EmissionStatus,
    pub decision_required: EmissionStatus,
}

impl EmissionReport {
    pub fn skipped() -> Self {
        Self {
            branch_proposed: EmissionStatus::Skipped,
            decision_required: EmissionStatus::Skipped,
        }
    }
}

/// Appends branch-proposed and decision-required events
pub struct DecisionEventEmitter {
    store: Arc<dyn EventStore>,
    config: CoordinatorConfig,
}

impl DecisionEventEmitter {
    pub fn new(store: Arc<dyn EventStore>, config: CoordinatorConfig) -> Self {
        Self { store, config }
    }

    /// Emit branch-proposed first, then decision-required
    pub async fn emit(&self, result: &UnifiedDecisionResult) -> EmissionReport {
        let branch_proposed = if self.config.emit_branch_events {
            match project_branch_proposed(result, &self.config.branch_diff) {
                Some(event) => self.append(result, DecisionEvent::BranchProposed(event)).await,
                None => EmissionStatus::Skipped,
            }
        } else {
            EmissionStatus::Skipped
        };

        let decision_required = if self.config.emit_decision_events {
            match project_decision_required(result) {
                Some(event) => {
                    self.append(result, DecisionEvent::DecisionRequired(event))
                        .await
                }
                None => EmissionStatus::Skipped,
            }
        } else {
            EmissionStatus::Skipped
        };

        EmissionReport {
            branch_proposed,
            decision_required,
        }
    }

    async fn append(&self, result: &UnifiedDecisionResult, event: DecisionEvent) -> EmissionStatus {
        let envelope = EventEnvelope::for_decision(result, event);
        match self.store.append(&envelope).await {
            Ok(()) => {
                debug!("Emitted {}", envelope.event_id);
                EmissionStatus::Emitted
            }
            Err(e) => {
                warn!("Failed to emit {}: {}", envelope.event_id, e);
                EmissionStatus::Failed(e.to_string())
            }
        }
    }
}
