//! Replay decision use case
//!
//! Re-runs synthesis over a stored decision's layer outputs and reports
//! whether today's rules reach the same outcome.

use crate::ports::decision_log::{DecisionLogStore, StoreError};
use arbiter_domain::{DecisionId, DecisionSynthesizer, DomainError, UnifiedDecisionResult};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum ReplayError {
    #[error("Decision {0} not found")]
    NotFound(DecisionId),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Stored decision is unreadable: {0}")]
    Corrupt(#[from] DomainError),
}

/// Stored vs. replayed outcome of one decision
#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    pub decision_id: DecisionId,
    pub stored: UnifiedDecisionResult,
    pub replayed: UnifiedDecisionResult,
    /// Stored layer outputs that did not map onto a known layer
    pub unknown_layers: Vec<String>,
    pub differences: Vec<String>,
}

impl ReplayReport {
    pub fn matches(&self) -> bool {
        self.differences.is_empty()
    }
}

/// Use case for replaying a stored decision
pub struct ReplayDecisionUseCase {
    store: Arc<dyn DecisionLogStore>,
    synthesizer: DecisionSynthesizer,
}

impl ReplayDecisionUseCase {
    pub fn new(store: Arc<dyn DecisionLogStore>) -> Self {
        Self {
            store,
            synthesizer: DecisionSynthesizer::new(),
        }
    }

    pub async fn execute(&self, decision_id: &DecisionId) -> Result<ReplayReport, ReplayError> {
        let entry = self
            .store
            .get(decision_id)
            .await?
            .ok_or_else(|| ReplayError::NotFound(decision_id.clone()))?;

        let stored = entry.stored_result()?;
        let (intent, contributions, unknown) = entry.rebuild_contributions()?;

        let unknown_layers: Vec<String> = unknown
            .iter()
            .map(|c| c.layer_name().to_string())
            .collect();
        if !unknown_layers.is_empty() {
            debug!(
                "Ignoring unrecognized layer outputs during replay: {}",
                unknown_layers.join(", ")
            );
        }

        let replayed = self
            .synthesizer
            .synthesize(intent, contributions)
            .with_decision_id(entry.decision_id.clone());

        let differences = compare(&stored, &replayed);
        info!(
            "Replayed decision {}: {}",
            decision_id,
            if differences.is_empty() {
                "matches".to_string()
            } else {
                format!("{} difference(s)", differences.len())
            }
        );

        Ok(ReplayReport {
            decision_id: entry.decision_id,
            stored,
            replayed,
            unknown_layers,
            differences,
        })
    }
}

fn compare(stored: &UnifiedDecisionResult, replayed: &UnifiedDecisionResult) -> Vec<String> {
    let mut differences = Vec::new();

    let mut check = |field: &str, before: String, after: String| {
        if before != after {
            differences.push(format!("{}: {} -> {}", field, before, after));
        }
    };

    check(
        "selected_playbook_code",
        display_option(stored.selected_playbook_code.as_deref()),
        display_option(replayed.selected_playbook_code.as_deref()),
    );
    check(
        "strategy",
        stored.strategy.to_string(),
        replayed.strategy.to_string(),
    );
    check(
        "execution_profile",
        format!("{:?}", stored.execution_profile),
        format!("{:?}", replayed.execution_profile),
    );
    check(
        "can_auto_execute",
        stored.can_auto_execute.to_string(),
        replayed.can_auto_execute.to_string(),
    );
    check(
        "requires_user_approval",
        stored.requires_user_approval.to_string(),
        replayed.requires_user_approval.to_string(),
    );
    check(
        "conflicts",
        conflict_kinds(stored),
        conflict_kinds(replayed),
    );
    check(
        "resolution_strategy",
        display_option(stored.resolution_strategy.map(|r| r.to_string()).as_deref()),
        display_option(replayed.resolution_strategy.map(|r| r.to_string()).as_deref()),
    );

    differences
}

fn display_option(value: Option<&str>) -> String {
    value.unwrap_or("none").to_string()
}

fn conflict_kinds(result: &UnifiedDecisionResult) -> String {
    let kinds: Vec<String> = result.conflicts.iter().map(|c| c.kind.to_string()).collect();
    format!("[{}]", kinds.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::test_support::{CallLog, MockDecisionLog, sample_result};
    use arbiter_domain::{
        CostGovernanceDecision, DecisionContext, DecisionLogEntry, IntentRoutingDecision,
        LayerContributions, PlaybookCandidate,
    };
    use serde_json::json;

    fn store_with(entry: DecisionLogEntry) -> Arc<MockDecisionLog> {
        let store = Arc::new(MockDecisionLog::new(CallLog::new()));
        store.seed(entry);
        store
    }

    #[tokio::test]
    async fn test_replay_matches() {
        let intent = IntentRoutingDecision::new(DecisionId::new("d-1").unwrap(), "ws")
            .with_suggestion(PlaybookCandidate::new("heavy_job", 0.8));
        let result = DecisionSynthesizer::new().synthesize(
            intent,
            LayerContributions::new()
                .with_cost_governance(CostGovernanceDecision::reject("over budget")),
        );
        let entry = DecisionLogEntry::from_result(&result, "run it", None, DecisionContext::new(), 1);

        let report = ReplayDecisionUseCase::new(store_with(entry))
            .execute(&DecisionId::new("d-1").unwrap())
            .await
            .unwrap();

        assert!(report.matches(), "{:?}", report.differences);
        assert_eq!(report.replayed.selected_playbook_code.as_deref(), Some("heavy_job"));
        assert!(report.unknown_layers.is_empty());
    }

    #[tokio::test]
    async fn test_replay_reports_differences() {
        let result = sample_result("d-1", Some("pb_a"));
        let mut entry =
            DecisionLogEntry::from_result(&result, "x", None, DecisionContext::new(), 1);
        // The stored decision claims approval was required; the layers say otherwise
        entry.decision["requires_user_approval"] = json!(true);
        entry.decision["can_auto_execute"] = json!(false);

        let report = ReplayDecisionUseCase::new(store_with(entry))
            .execute(&DecisionId::new("d-1").unwrap())
            .await
            .unwrap();

        assert!(!report.matches());
        assert!(report
            .differences
            .contains(&"requires_user_approval: true -> false".to_string()));
        assert!(report
            .differences
            .contains(&"can_auto_execute: false -> true".to_string()));
    }

    #[tokio::test]
    async fn test_replay_ignores_unknown_layers() {
        let result = sample_result("d-1", Some("pb_a"));
        let mut entry =
            DecisionLogEntry::from_result(&result, "x", None, DecisionContext::new(), 1);
        entry
            .layer_outputs
            .insert("sentiment".to_string(), json!({"score": 0.4}));

        let report = ReplayDecisionUseCase::new(store_with(entry))
            .execute(&DecisionId::new("d-1").unwrap())
            .await
            .unwrap();

        assert!(report.matches());
        assert_eq!(report.unknown_layers, vec!["sentiment".to_string()]);
    }

    #[tokio::test]
    async fn test_replay_missing_decision() {
        let store = Arc::new(MockDecisionLog::new(CallLog::new()));
        let err = ReplayDecisionUseCase::new(store)
            .execute(&DecisionId::new("nope").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, ReplayError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_replay_corrupt_intent() {
        let mut entry = DecisionLogEntry::from_result(
            &sample_result("d-1", Some("pb_a")),
            "x",
            None,
            DecisionContext::new(),
            1,
        );
        entry.layer_outputs.insert("intent".to_string(), json!(null));

        let err = ReplayDecisionUseCase::new(store_with(entry))
            .execute(&DecisionId::new("d-1").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, ReplayError::Corrupt(_)));
    }
}
