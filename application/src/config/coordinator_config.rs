//! Coordinator parameters - persistence and event emission control.
//!
//! [`CoordinatorConfig`] groups the static parameters that control
//! [`UnifiedDecisionCoordinator`](crate::use_cases::make_decision::UnifiedDecisionCoordinator).
//! These are application-layer concerns, not domain policy.

use arbiter_domain::BranchDiffOptions;
use serde::{Deserialize, Serialize};

/// Persistence and event emission parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    /// Ids checked against the log before proceeding with the last one.
    pub max_id_attempts: u32,
    /// Emit branch-proposed events when the intent has alternatives.
    pub emit_branch_events: bool,
    /// Emit decision-required events when approval is required.
    pub emit_decision_events: bool,
    /// Difference computation for branch-proposed events.
    pub branch_diff: BranchDiffOptions,
    /// Profile id passed to the intent pipeline when no user is known.
    pub default_profile_id: String,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            max_id_attempts: 3,
            emit_branch_events: true,
            emit_decision_events: true,
            branch_diff: BranchDiffOptions::default(),
            default_profile_id: "default_user".to_string(),
        }
    }
}

impl CoordinatorConfig {
    // ==================== Builder Methods ====================

    pub fn with_max_id_attempts(mut self, attempts: u32) -> Self {
        self.max_id_attempts = attempts.max(1);
        self
    }

    pub fn with_branch_events(mut self, enabled: bool) -> Self {
        self.emit_branch_events = enabled;
        self
    }

    pub fn with_decision_events(mut self, enabled: bool) -> Self {
        self.emit_decision_events = enabled;
        self
    }

    pub fn with_branch_diff(mut self, options: BranchDiffOptions) -> Self {
        self.branch_diff = options;
        self
    }

    pub fn with_default_profile_id(mut self, profile_id: impl Into<String>) -> Self {
        self.default_profile_id = profile_id.into();
        self
    }
}
