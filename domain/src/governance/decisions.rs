//! Approve/reject opinions from the node, cost and policy layers, plus the
//! memory layer's recommendation.

use serde::{Deserialize, Serialize};

/// Node/resource governance verdict
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeGovernanceDecision {
    pub approved: bool,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Cost governance verdict
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostGovernanceDecision {
    pub approved: bool,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub estimated_cost: Option<f64>,
}

/// Policy enforcement verdict
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyDecision {
    pub approved: bool,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Long-term memory's opinion on which playbook fits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryRecommendation {
    #[serde(default)]
    pub recommended_playbook_code: Option<String>,
    #[serde(deserialize_with = "crate::playbook::candidate::deserialize_confidence")]
    pub confidence: f64,
}

impl NodeGovernanceDecision {
    pub fn approve() -> Self {
        Self {
            approved: true,
            reason: None,
        }
    }

    pub fn reject(reason: impl Into<String>) -> Self {
        Self {
            approved: false,
            reason: Some(reason.into()),
        }
    }
}

impl CostGovernanceDecision {
    pub fn approve() -> Self {
        Self {
            approved: true,
            reason: None,
            estimated_cost: None,
        }
    }

    pub fn reject(reason: impl Into<String>) -> Self {
        Self {
            approved: false,
            reason: Some(reason.into()),
            estimated_cost: None,
        }
    }

    pub fn with_estimated_cost(mut self, cost: f64) -> Self {
        self.estimated_cost = Some(cost);
        self
    }
}

impl PolicyDecision {
    pub fn approve() -> Self {
        Self {
            approved: true,
            reason: None,
        }
    }

    pub fn reject(reason: impl Into<String>) -> Self {
        Self {
            approved: false,
            reason: Some(reason.into()),
        }
    }
}

impl MemoryRecommendation {
    pub fn new(playbook_code: Option<String>, confidence: f64) -> Self {
        Self {
            recommended_playbook_code: playbook_code,
            confidence: crate::playbook::candidate::clamp_confidence(confidence),
        }
    }

    pub fn none() -> Self {
        Self::new(None, 0.0)
    }
}
