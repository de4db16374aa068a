//! Execution profile derivation
//!
//! An [`ExecutionProfile`] is never built field by field: it is derived from
//! the intent layer's hint, optionally downgraded by a cost rejection, or
//! reset to the safest default. Fields are private so that
//! `supports_resume == (execution_mode == durable)` always holds.

use crate::core::error::DomainError;
use crate::governance::CostGovernanceDecision;
use crate::playbook::{ExecutionProfileHint, PlaybookCandidate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How the selected playbook is run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    #[default]
    Simple,
    Durable,
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionMode::Simple => write!(f, "simple"),
            ExecutionMode::Durable => write!(f, "durable"),
        }
    }
}

impl std::str::FromStr for ExecutionMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "simple" => Ok(ExecutionMode::Simple),
            "durable" => Ok(ExecutionMode::Durable),
            _ => Err(DomainError::unknown("execution mode", s)),
        }
    }
}

/// Coarse classification of external-world impact
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SideEffectLevel {
    #[default]
    None,
    Low,
    High,
}

impl fmt::Display for SideEffectLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SideEffectLevel::None => write!(f, "none"),
            SideEffectLevel::Low => write!(f, "low"),
            SideEffectLevel::High => write!(f, "high"),
        }
    }
}

/// Runtime policy attached to a decision before execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionProfile {
    execution_mode: ExecutionMode,
    supports_resume: bool,
    requires_human_approval: bool,
    side_effect_level: SideEffectLevel,
    #[serde(default)]
    required_capabilities: Vec<String>,
}

impl ExecutionProfile {
    fn build(
        execution_mode: ExecutionMode,
        requires_human_approval: bool,
        side_effect_level: SideEffectLevel,
        required_capabilities: Vec<String>,
    ) -> Self {
        Self {
            execution_mode,
            supports_resume: execution_mode == ExecutionMode::Durable,
            requires_human_approval,
            side_effect_level,
            required_capabilities,
        }
    }

    /// Profile implied by the intent hint alone
    ///
    /// | hint           | mode    | approval | side effects |
    /// |----------------|---------|----------|--------------|
    /// | `human_review` | durable | yes      | high         |
    /// | `durable`      | durable | no       | low          |
    /// | `fast`         | simple  | no       | low          |
    pub fn from_hint(hint: ExecutionProfileHint) -> Self {
        match hint {
            ExecutionProfileHint::HumanReview => {
                Self::build(ExecutionMode::Durable, true, SideEffectLevel::High, Vec::new())
            }
            ExecutionProfileHint::Durable => {
                Self::build(ExecutionMode::Durable, false, SideEffectLevel::Low, Vec::new())
            }
            ExecutionProfileHint::Fast => {
                Self::build(ExecutionMode::Simple, false, SideEffectLevel::Low, Vec::new())
            }
        }
    }

    /// Derive the profile for a selected candidate.
    ///
    /// A cost rejection always forces the cheapest mode, whatever the hint.
    /// Orchestrated candidates require their steps as capabilities.
    pub fn derive(
        hint: ExecutionProfileHint,
        candidate: Option<&PlaybookCandidate>,
        cost: Option<&CostGovernanceDecision>,
    ) -> Self {
        let mut profile = Self::from_hint(hint);
        if cost.is_some_and(|c| !c.approved) {
            profile = profile.downgraded();
        }
        if let Some(candidate) = candidate
            && candidate.is_orchestration
        {
            profile.required_capabilities = candidate.orchestration_steps.clone();
        }
        profile
    }

    /// Safest profile: nothing runs durably and nothing touches the outside world
    pub fn safest() -> Self {
        Self::build(ExecutionMode::Simple, false, SideEffectLevel::None, Vec::new())
    }

    /// Cheapest runnable profile, used after a cost rejection
    pub fn downgraded(self) -> Self {
        Self::build(
            ExecutionMode::Simple,
            false,
            SideEffectLevel::Low,
            self.required_capabilities,
        )
    }

    pub fn execution_mode(&self) -> ExecutionMode {
        self.execution_mode
    }

    pub fn supports_resume(&self) -> bool {
        self.supports_resume
    }

    pub fn requires_human_approval(&self) -> bool {
        self.requires_human_approval
    }

    pub fn side_effect_level(&self) -> SideEffectLevel {
        self.side_effect_level
    }

    pub fn required_capabilities(&self) -> &[String] {
        &self.required_capabilities
    }
}

impl Default for ExecutionProfile {
    fn default() -> Self {
        Self::from_hint(ExecutionProfileHint::default())
    }
}
