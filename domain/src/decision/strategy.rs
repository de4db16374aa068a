//! Synthesis strategies
//!
//! Strategies are pure handlers tried in a fixed priority order; the first
//! one that applies decides the selection, the profile and the initial
//! approval flags. When none applies, [`conservative_default`] is used.
//!
//! ```text
//! 1. unanimous agreement        -> intent's playbook, auto-execute
//! 2. preflight reject + alts    -> first alternative, ask user
//! 3. preflight clarification    -> nothing selected, safest profile, ask user
//! 4. cost rejection             -> intent's playbook, downgraded profile, ask user
//! 5. policy rejection           -> nothing selected, safest profile, blocked
//! *  default                    -> intent's playbook, ask user
//! ```

use super::profile::ExecutionProfile;
use crate::governance::LayerContributions;
use crate::governance::preflight::PreflightStatus;
use crate::playbook::{IntentRoutingDecision, PlaybookCandidate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which strategy produced a decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SynthesisStrategy {
    UnanimousAgreement,
    AlternativePlaybook,
    NeedsClarification,
    CostDowngrade,
    PolicyBlock,
    ConservativeDefault,
}

impl SynthesisStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SynthesisStrategy::UnanimousAgreement => "unanimous_agreement",
            SynthesisStrategy::AlternativePlaybook => "alternative_playbook",
            SynthesisStrategy::NeedsClarification => "needs_clarification",
            SynthesisStrategy::CostDowngrade => "cost_downgrade",
            SynthesisStrategy::PolicyBlock => "policy_block",
            SynthesisStrategy::ConservativeDefault => "conservative_default",
        }
    }
}

impl fmt::Display for SynthesisStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a strategy decided, before conflict detection
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyOutcome {
    pub strategy: SynthesisStrategy,
    pub selected_playbook_code: Option<String>,
    pub execution_profile: ExecutionProfile,
    pub can_auto_execute: bool,
    pub requires_user_approval: bool,
}

/// A strategy handler: `None` means "does not apply, try the next one"
pub type StrategyHandler = fn(&IntentRoutingDecision, &LayerContributions) -> Option<StrategyOutcome>;

/// Strategies in priority order
pub const SYNTHESIS_STRATEGIES: [StrategyHandler; 5] = [
    unanimous_agreement,
    alternative_playbook,
    needs_clarification,
    cost_downgrade,
    policy_block,
];

/// Run the strategies in order; the first applicable one wins
pub fn select_strategy(
    intent: &IntentRoutingDecision,
    contributions: &LayerContributions,
) -> StrategyOutcome {
    SYNTHESIS_STRATEGIES
        .iter()
        .find_map(|handler| handler(intent, contributions))
        .unwrap_or_else(|| conservative_default(intent, contributions))
}

fn hint_profile(
    intent: &IntentRoutingDecision,
    candidate: Option<&PlaybookCandidate>,
    contributions: &LayerContributions,
) -> ExecutionProfile {
    ExecutionProfile::derive(
        intent.execution_profile_hint,
        candidate,
        contributions.cost_governance.as_ref(),
    )
}

fn approved_or_absent(approved: Option<bool>) -> bool {
    approved.unwrap_or(true)
}

/// Strategy 1: every configured layer agrees with the intent recommendation
pub fn unanimous_agreement(
    intent: &IntentRoutingDecision,
    contributions: &LayerContributions,
) -> Option<StrategyOutcome> {
    let candidate = intent.suggested_playbook.as_ref()?;

    let preflight_ok = contributions
        .preflight_status()
        .is_none_or(|status| status == PreflightStatus::Accept);
    let governance_ok = approved_or_absent(contributions.node_governance.as_ref().map(|d| d.approved))
        && approved_or_absent(contributions.cost_governance.as_ref().map(|d| d.approved))
        && approved_or_absent(contributions.policy.as_ref().map(|d| d.approved));

    if !(preflight_ok && governance_ok) {
        return None;
    }

    Some(StrategyOutcome {
        strategy: SynthesisStrategy::UnanimousAgreement,
        selected_playbook_code: Some(candidate.playbook_code.clone()),
        execution_profile: hint_profile(intent, Some(candidate), contributions),
        can_auto_execute: true,
        requires_user_approval: false,
    })
}

/// Strategy 2: preflight rejected but offered a substitute
pub fn alternative_playbook(
    intent: &IntentRoutingDecision,
    contributions: &LayerContributions,
) -> Option<StrategyOutcome> {
    let preflight = contributions.preflight.as_ref().filter(|p| p.is_rejected())?;
    let alternative = preflight.first_alternative()?;

    let candidate = intent
        .alternatives
        .iter()
        .find(|c| c.playbook_code == alternative);

    Some(StrategyOutcome {
        strategy: SynthesisStrategy::AlternativePlaybook,
        selected_playbook_code: Some(alternative.to_string()),
        execution_profile: hint_profile(intent, candidate, contributions),
        can_auto_execute: false,
        requires_user_approval: true,
    })
}

/// Strategy 3: preflight needs more information from the user
pub fn needs_clarification(
    _intent: &IntentRoutingDecision,
    contributions: &LayerContributions,
) -> Option<StrategyOutcome> {
    if !contributions.needs_clarification() {
        return None;
    }

    Some(StrategyOutcome {
        strategy: SynthesisStrategy::NeedsClarification,
        selected_playbook_code: None,
        execution_profile: ExecutionProfile::safest(),
        can_auto_execute: false,
        requires_user_approval: true,
    })
}

/// Strategy 4: cost governance rejected; keep the playbook, run it cheaply
pub fn cost_downgrade(
    intent: &IntentRoutingDecision,
    contributions: &LayerContributions,
) -> Option<StrategyOutcome> {
    if !contributions.cost_rejected() {
        return None;
    }

    let candidate = intent.suggested_playbook.as_ref();
    Some(StrategyOutcome {
        strategy: SynthesisStrategy::CostDowngrade,
        selected_playbook_code: candidate.map(|c| c.playbook_code.clone()),
        execution_profile: hint_profile(intent, candidate, contributions),
        can_auto_execute: false,
        requires_user_approval: true,
    })
}

/// Strategy 5: policy rejected; execution is blocked outright
pub fn policy_block(
    _intent: &IntentRoutingDecision,
    contributions: &LayerContributions,
) -> Option<StrategyOutcome> {
    if !contributions.policy_rejected() {
        return None;
    }

    Some(StrategyOutcome {
        strategy: SynthesisStrategy::PolicyBlock,
        selected_playbook_code: None,
        execution_profile: ExecutionProfile::safest(),
        can_auto_execute: false,
        requires_user_approval: false,
    })
}

/// Fallback when no strategy applies: keep the recommendation, ask the user
pub fn conservative_default(
    intent: &IntentRoutingDecision,
    contributions: &LayerContributions,
) -> StrategyOutcome {
    let candidate = intent.suggested_playbook.as_ref();
    StrategyOutcome {
        strategy: SynthesisStrategy::ConservativeDefault,
        selected_playbook_code: candidate.map(|c| c.playbook_code.clone()),
        execution_profile: hint_profile(intent, candidate, contributions),
        can_auto_execute: false,
        requires_user_approval: true,
    }
}
