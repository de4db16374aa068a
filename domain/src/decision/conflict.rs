//! Conflict detection and resolution
//!
//! A conflict is a layer that still disagrees with the final selection after
//! a strategy has been applied. Conflicts pick the resolution tag recorded on
//! the decision and always force user approval.

use crate::governance::LayerContributions;
use crate::governance::contribution::{COST_GOVERNANCE_LAYER, PLAYBOOK_LAYER};
use crate::playbook::IntentRoutingDecision;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of disagreement between layers.
///
/// Serialized as a plain string; names this version does not recognize are
/// kept as [`ConflictKind::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ConflictKind {
    /// Preflight rejected while a playbook is still selected
    PlaybookRejection,
    /// Cost governance rejected while a playbook is still selected
    CostExceeded,
    Other(String),
}

impl ConflictKind {
    pub fn as_str(&self) -> &str {
        match self {
            ConflictKind::PlaybookRejection => "playbook_rejection",
            ConflictKind::CostExceeded => "cost_exceeded",
            ConflictKind::Other(name) => name,
        }
    }
}

impl From<String> for ConflictKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "playbook_rejection" => ConflictKind::PlaybookRejection,
            "cost_exceeded" => ConflictKind::CostExceeded,
            _ => ConflictKind::Other(value),
        }
    }
}

impl From<ConflictKind> for String {
    fn from(kind: ConflictKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A detected disagreement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conflict {
    pub kind: ConflictKind,
    /// Layers involved in the disagreement
    pub layers: Vec<String>,
    pub description: String,
}

impl Conflict {
    pub fn new(kind: ConflictKind, layers: &[&str], description: impl Into<String>) -> Self {
        Self {
            kind,
            layers: layers.iter().map(|l| l.to_string()).collect(),
            description: description.into(),
        }
    }
}

/// How a decision with conflicts is to be resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionStrategy {
    UseAlternativePlaybook,
    DowngradeExecutionProfile,
    RequireUserApproval,
}

impl fmt::Display for ResolutionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolutionStrategy::UseAlternativePlaybook => write!(f, "use_alternative_playbook"),
            ResolutionStrategy::DowngradeExecutionProfile => {
                write!(f, "downgrade_execution_profile")
            }
            ResolutionStrategy::RequireUserApproval => write!(f, "require_user_approval"),
        }
    }
}

/// Find layers that disagree with the selected playbook
pub fn detect_conflicts(
    selected_playbook: Option<&str>,
    contributions: &LayerContributions,
) -> Vec<Conflict> {
    let Some(selected) = selected_playbook else {
        return Vec::new();
    };

    let mut conflicts = Vec::new();

    if let Some(preflight) = contributions.preflight.as_ref().filter(|p| p.is_rejected()) {
        let reason = preflight
            .rejection_reason
            .as_deref()
            .unwrap_or("no reason given");
        conflicts.push(Conflict::new(
            ConflictKind::PlaybookRejection,
            &[PLAYBOOK_LAYER],
            format!(
                "Preflight rejected '{}' ({}) while '{}' is selected",
                preflight.playbook_code, reason, selected
            ),
        ));
    }

    if let Some(cost) = contributions.cost_governance.as_ref().filter(|c| !c.approved) {
        let estimate = cost
            .estimated_cost
            .map(|c| format!(", estimated cost {:.2}", c))
            .unwrap_or_default();
        conflicts.push(Conflict::new(
            ConflictKind::CostExceeded,
            &[COST_GOVERNANCE_LAYER],
            format!(
                "Cost governance rejected '{}'{}: {}",
                selected,
                estimate,
                cost.reason.as_deref().unwrap_or("no reason given")
            ),
        ));
    }

    conflicts
}

/// Pick the resolution tag for a set of conflicts.
///
/// Playbook rejections win over cost, which wins over anything unrecognized.
pub fn resolve_conflicts(conflicts: &[Conflict]) -> Option<ResolutionStrategy> {
    if conflicts.is_empty() {
        return None;
    }
    let has = |kind: ConflictKind| conflicts.iter().any(|c| c.kind == kind);

    if has(ConflictKind::PlaybookRejection) {
        Some(ResolutionStrategy::UseAlternativePlaybook)
    } else if has(ConflictKind::CostExceeded) {
        Some(ResolutionStrategy::DowngradeExecutionProfile)
    } else {
        Some(ResolutionStrategy::RequireUserApproval)
    }
}

/// Global approval rule applied after conflict detection.
///
/// A policy rejection that hard-blocked the decision (nothing selected) is
/// not deferred to a human.
pub fn approval_required_by_rule(
    intent: &IntentRoutingDecision,
    contributions: &LayerContributions,
    conflicts: &[Conflict],
    selected_playbook: Option<&str>,
) -> bool {
    let policy_deferred = contributions.policy_rejected() && selected_playbook.is_some();

    !conflicts.is_empty()
        || contributions.needs_clarification()
        || contributions.cost_rejected()
        || policy_deferred
        || !intent.is_overridable()
}
