//! Decision synthesizer
//!
//! Pure reconciliation of one intent decision with the other layers'
//! opinions. The same inputs always produce the same result (apart from the
//! timestamp), which is what makes stored decisions replayable.

use super::conflict::{approval_required_by_rule, detect_conflicts, resolve_conflicts};
use super::result::UnifiedDecisionResult;
use super::strategy::select_strategy;
use crate::core::id::current_timestamp;
use crate::governance::LayerContributions;
use crate::playbook::IntentRoutingDecision;

/// Stateless synthesizer
#[derive(Debug, Clone, Copy, Default)]
pub struct DecisionSynthesizer;

impl DecisionSynthesizer {
    pub fn new() -> Self {
        Self
    }

    /// Reconcile all layer opinions into a unified decision.
    ///
    /// 1. first applicable strategy picks playbook, profile and flags
    /// 2. conflicts against the selection set the resolution tag
    /// 3. the approval rule is combined with the strategy's flag; a strategy
    ///    that asked for approval is never relaxed by the rule
    /// 4. auto-execution needs a selection, no conflicts and no approval
    pub fn synthesize(
        &self,
        intent: IntentRoutingDecision,
        contributions: LayerContributions,
    ) -> UnifiedDecisionResult {
        let outcome = select_strategy(&intent, &contributions);
        let selected = outcome.selected_playbook_code.as_deref();

        let conflicts = detect_conflicts(selected, &contributions);
        let resolution_strategy = resolve_conflicts(&conflicts);

        let requires_user_approval = outcome.requires_user_approval
            || approval_required_by_rule(&intent, &contributions, &conflicts, selected);

        let can_auto_execute = outcome.can_auto_execute
            && selected.is_some()
            && conflicts.is_empty()
            && !requires_user_approval;

        UnifiedDecisionResult {
            decision_id: intent.decision_id.clone(),
            selected_playbook_code: outcome.selected_playbook_code,
            execution_profile: outcome.execution_profile,
            intent_contribution: intent,
            playbook_contribution: contributions.preflight,
            node_governance_contribution: contributions.node_governance,
            cost_governance_contribution: contributions.cost_governance,
            memory_contribution: contributions.memory,
            policy_contribution: contributions.policy,
            conflicts,
            resolution_strategy,
            strategy: outcome.strategy,
            can_auto_execute,
            requires_user_approval,
            timestamp: current_timestamp(),
        }
    }
}
