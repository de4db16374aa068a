//! The unified decision aggregate

use super::conflict::{Conflict, ResolutionStrategy};
use super::profile::ExecutionProfile;
use super::strategy::SynthesisStrategy;
use crate::core::id::DecisionId;
use crate::governance::{
    CostGovernanceDecision, LayerContributions, MemoryRecommendation, NodeGovernanceDecision,
    PlaybookPreflightResult, PolicyDecision,
};
use crate::playbook::IntentRoutingDecision;
use serde::{Deserialize, Serialize};

/// Final, reconciled decision for one user request.
///
/// Built once by the synthesizer, then persisted and projected into events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnifiedDecisionResult {
    pub decision_id: DecisionId,
    pub selected_playbook_code: Option<String>,
    pub execution_profile: ExecutionProfile,
    pub intent_contribution: IntentRoutingDecision,
    pub playbook_contribution: Option<PlaybookPreflightResult>,
    pub node_governance_contribution: Option<NodeGovernanceDecision>,
    pub cost_governance_contribution: Option<CostGovernanceDecision>,
    pub memory_contribution: Option<MemoryRecommendation>,
    pub policy_contribution: Option<PolicyDecision>,
    #[serde(default)]
    pub conflicts: Vec<Conflict>,
    pub resolution_strategy: Option<ResolutionStrategy>,
    /// Strategy that produced the selection
    pub strategy: SynthesisStrategy,
    pub can_auto_execute: bool,
    pub requires_user_approval: bool,
    /// Milliseconds since epoch
    pub timestamp: u64,
}

impl UnifiedDecisionResult {
    /// The non-intent layer opinions as a [`LayerContributions`] view
    pub fn contributions(&self) -> LayerContributions {
        LayerContributions {
            preflight: self.playbook_contribution.clone(),
            node_governance: self.node_governance_contribution.clone(),
            cost_governance: self.cost_governance_contribution.clone(),
            memory: self.memory_contribution.clone(),
            policy: self.policy_contribution.clone(),
        }
    }

    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }

    /// Nothing selected and no human asked: execution was refused
    pub fn is_blocked(&self) -> bool {
        self.selected_playbook_code.is_none() && !self.requires_user_approval
    }

    /// Reassign the decision id (used on id collisions)
    pub fn with_decision_id(mut self, decision_id: DecisionId) -> Self {
        self.decision_id = decision_id;
        self
    }

    /// Missing inputs from the intent and preflight layers, deduplicated in
    /// first-seen order
    pub fn missing_inputs(&self) -> Vec<String> {
        let preflight = self
            .playbook_contribution
            .iter()
            .flat_map(|p| p.missing_inputs.iter());

        let mut seen = Vec::new();
        for input in self.intent_contribution.missing_inputs.iter().chain(preflight) {
            if !seen.contains(input) {
                seen.push(input.clone());
            }
        }
        seen
    }

    pub fn clarification_questions(&self) -> &[String] {
        self.playbook_contribution
            .as_ref()
            .map(|p| p.clarification_questions.as_slice())
            .unwrap_or(&[])
    }
}
