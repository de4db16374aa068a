//! Decision log entries
//!
//! The persisted, replayable record of one synthesized decision. Layer
//! outputs are stored as JSON keyed by layer name so that entries written by
//! other versions (or with extra layers) still load.

use super::result::UnifiedDecisionResult;
use crate::core::error::DomainError;
use crate::core::id::{DecisionId, current_timestamp};
use crate::governance::contribution::INTENT_LAYER;
use crate::governance::{LayerContribution, LayerContributions};
use crate::playbook::IntentRoutingDecision;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Caller-supplied context passed through to collaborators and the log
pub type DecisionContext = Map<String, Value>;

/// Bookkeeping stored alongside a decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionLogMetadata {
    /// Name of the strategy that produced the decision
    pub strategy: String,
    /// How many ids were tried before this one was written
    pub id_attempts: u32,
    /// Milliseconds since epoch
    pub created_at: u64,
    #[serde(default)]
    pub context: DecisionContext,
}

/// One row of the decision log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionLogEntry {
    pub decision_id: DecisionId,
    pub raw_input: String,
    pub workspace_id: String,
    pub project_id: Option<String>,
    pub user_id: Option<String>,
    /// Every layer's output, `null` for layers without an opinion
    pub layer_outputs: BTreeMap<String, Value>,
    /// The serialized unified decision
    pub decision: Value,
    pub metadata: DecisionLogMetadata,
}

impl DecisionLogEntry {
    /// Build the entry for a result that has its final id assigned
    pub fn from_result(
        result: &UnifiedDecisionResult,
        raw_input: impl Into<String>,
        user_id: Option<String>,
        context: DecisionContext,
        id_attempts: u32,
    ) -> Self {
        let intent = &result.intent_contribution;
        let decision = serde_json::to_value(result).unwrap_or_else(|err| {
            serde_json::json!({
                "decision_id": result.decision_id,
                "serialization_error": err.to_string(),
            })
        });

        Self {
            decision_id: result.decision_id.clone(),
            raw_input: raw_input.into(),
            workspace_id: intent.workspace_id.clone(),
            project_id: intent.project_id.clone(),
            user_id,
            layer_outputs: result.contributions().to_layer_outputs(intent),
            decision,
            metadata: DecisionLogMetadata {
                strategy: result.strategy.to_string(),
                id_attempts,
                created_at: current_timestamp(),
                context,
            },
        }
    }

    /// Decode the stored unified decision
    pub fn stored_result(&self) -> Result<UnifiedDecisionResult, DomainError> {
        serde_json::from_value(self.decision.clone()).map_err(|e| {
            DomainError::MalformedContribution {
                layer: "decision".to_string(),
                reason: e.to_string(),
            }
        })
    }

    /// Rebuild the typed layer opinions from the stored outputs.
    ///
    /// Returns the intent decision, the other known layers, and whatever
    /// could not be mapped onto a known layer.
    pub fn rebuild_contributions(
        &self,
    ) -> Result<(IntentRoutingDecision, LayerContributions, Vec<LayerContribution>), DomainError>
    {
        let mut intent = None;
        let mut contributions = LayerContributions::new();
        let mut unknown = Vec::new();

        for (layer, value) in &self.layer_outputs {
            let Some(contribution) = LayerContribution::from_raw(layer, value.clone()) else {
                continue;
            };
            match contribution {
                LayerContribution::Intent(decision) => intent = Some(decision),
                other => {
                    if let Some(leftover) = contributions.absorb(other) {
                        unknown.push(leftover);
                    }
                }
            }
        }

        let intent = intent.ok_or_else(|| DomainError::MalformedContribution {
            layer: INTENT_LAYER.to_string(),
            reason: "intent output missing or unreadable".to_string(),
        })?;

        Ok((intent, contributions, unknown))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::synthesizer::DecisionSynthesizer;
    use crate::governance::{CostGovernanceDecision, PolicyDecision};
    use crate::playbook::{IntentAnalysisResult, PlaybookCandidate};

    fn sample_result() -> UnifiedDecisionResult {
        let intent = IntentRoutingDecision::new(DecisionId::new("dec-7").unwrap(), "ws-7")
            .with_project("proj")
            .with_suggestion(PlaybookCandidate::new("run_heavy_job", 0.9));
        let contributions = LayerContributions::new()
            .with_cost_governance(CostGovernanceDecision::reject("budget").with_estimated_cost(500.0));
        DecisionSynthesizer::new().synthesize(intent, contributions)
    }

    #[test]
    fn test_entry_from_result() {
        let result = sample_result();
        let entry = DecisionLogEntry::from_result(
            &result,
            "run the heavy job",
            Some("user-1".to_string()),
            DecisionContext::new(),
            1,
        );

        assert_eq!(entry.decision_id.as_str(), "dec-7");
        assert_eq!(entry.workspace_id, "ws-7");
        assert_eq!(entry.project_id.as_deref(), Some("proj"));
        assert_eq!(entry.metadata.strategy, "cost_downgrade");
        assert!(entry.layer_outputs["policy"].is_null());
        assert_eq!(entry.layer_outputs["cost_governance"]["estimated_cost"], 500.0);
        assert_eq!(entry.decision["selected_playbook_code"], "run_heavy_job");
    }

    #[test]
    fn test_rebuild_contributions() {
        let result = sample_result();
        let mut entry =
            DecisionLogEntry::from_result(&result, "x", None, DecisionContext::new(), 1);
        entry
            .layer_outputs
            .insert("sentiment".to_string(), serde_json::json!({"score": 0.2}));

        let (intent, contributions, unknown) = entry.rebuild_contributions().unwrap();
        assert_eq!(intent.recommended_playbook_code(), Some("run_heavy_job"));
        assert!(contributions.cost_rejected());
        assert!(contributions.policy.is_none());
        assert_eq!(unknown.len(), 1);
        assert_eq!(unknown[0].layer_name(), "sentiment");

        assert_eq!(entry.stored_result().unwrap(), result);
    }

    #[test]
    fn test_nan_alternative_survives_storage() {
        let analysis = IntentAnalysisResult {
            selected_playbook_code: Some("draft_post".to_string()),
            confidence: 0.8,
            alternatives: vec![PlaybookCandidate {
                confidence: f64::NAN,
                ..PlaybookCandidate::new("schedule_post", 0.5)
            }],
            ..Default::default()
        };
        let intent = IntentRoutingDecision::from_analysis(
            DecisionId::new("dec-nan").unwrap(),
            analysis,
            "ws",
            None,
            None,
        );
        let result = DecisionSynthesizer::new().synthesize(intent, LayerContributions::new());
        let entry = DecisionLogEntry::from_result(&result, "x", None, DecisionContext::new(), 1);

        let stored = entry.stored_result().unwrap();
        assert_eq!(stored.intent_contribution.alternatives[0].confidence, 0.0);
        assert_eq!(stored, result);
    }

    #[test]
    fn test_stored_null_confidence_reads_as_zero() {
        let result = sample_result();
        let mut entry =
            DecisionLogEntry::from_result(&result, "x", None, DecisionContext::new(), 1);
        entry.decision["intent_contribution"]["confidence"] = Value::Null;

        let stored = entry.stored_result().unwrap();
        assert_eq!(stored.intent_contribution.confidence, 0.0);
    }

    #[test]
    fn test_rebuild_without_intent_fails() {
        let result = sample_result();
        let mut entry =
            DecisionLogEntry::from_result(&result, "x", None, DecisionContext::new(), 1);
        entry.layer_outputs.insert("intent".to_string(), Value::Null);
        entry
            .layer_outputs
            .insert("policy".to_string(), serde_json::to_value(PolicyDecision::approve()).unwrap());

        assert!(entry.rebuild_contributions().is_err());
    }
}
