//! List- and budget-based node, cost and policy governance.

use crate::config::FileGovernanceConfig;
use arbiter_application::ports::governance::{
    CostGovernance, GovernanceError, NodeGovernance, PolicyService,
};
use arbiter_domain::{
    CostGovernanceDecision, DecisionContext, ExecutionProfile, NodeGovernanceDecision,
    PolicyDecision,
};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};

/// Rejects playbooks listed as unavailable
pub struct AvailabilityNodeGovernance {
    unavailable: HashSet<String>,
}

impl AvailabilityNodeGovernance {
    pub fn from_config(config: &FileGovernanceConfig) -> Self {
        Self {
            unavailable: config.unavailable_playbooks.iter().cloned().collect(),
        }
    }
}

#[async_trait]
impl NodeGovernance for AvailabilityNodeGovernance {
    async fn check(
        &self,
        playbook_code: &str,
        workspace_id: &str,
        _context: &DecisionContext,
    ) -> Result<NodeGovernanceDecision, GovernanceError> {
        if self.unavailable.contains(playbook_code) {
            return Ok(NodeGovernanceDecision::reject(format!(
                "No node in workspace '{}' can run '{}'",
                workspace_id, playbook_code
            )));
        }
        Ok(NodeGovernanceDecision::approve())
    }
}

/// Approves playbooks whose estimated cost fits the budget
pub struct BudgetCostGovernance {
    budget: f64,
    costs: BTreeMap<String, f64>,
    default_cost: f64,
}

impl BudgetCostGovernance {
    pub fn new(budget: f64, costs: BTreeMap<String, f64>, default_cost: f64) -> Self {
        Self {
            budget,
            costs,
            default_cost,
        }
    }

    /// `None` when no budget is configured
    pub fn from_config(config: &FileGovernanceConfig) -> Option<Self> {
        config
            .cost_budget
            .map(|budget| Self::new(budget, config.costs.clone(), config.default_cost))
    }

    fn estimate(&self, playbook_code: &str) -> f64 {
        self.costs
            .get(playbook_code)
            .copied()
            .unwrap_or(self.default_cost)
    }
}

#[async_trait]
impl CostGovernance for BudgetCostGovernance {
    async fn check(
        &self,
        playbook_code: &str,
        _execution_profile: &ExecutionProfile,
        _workspace_id: &str,
        _context: &DecisionContext,
    ) -> Result<CostGovernanceDecision, GovernanceError> {
        let estimate = self.estimate(playbook_code);
        let decision = if estimate <= self.budget {
            CostGovernanceDecision::approve()
        } else {
            CostGovernanceDecision::reject(format!(
                "Estimated cost {:.2} exceeds budget {:.2}",
                estimate, self.budget
            ))
        };
        Ok(decision.with_estimated_cost(estimate))
    }
}

/// Rejects playbooks on the deny list
pub struct DenylistPolicy {
    denied: HashSet<String>,
}

impl DenylistPolicy {
    pub fn from_config(config: &FileGovernanceConfig) -> Self {
        Self {
            denied: config.denied_playbooks.iter().cloned().collect(),
        }
    }
}

#[async_trait]
impl PolicyService for DenylistPolicy {
    async fn check(
        &self,
        playbook_code: &str,
        _workspace_id: &str,
        _user_id: Option<&str>,
        _context: &DecisionContext,
    ) -> Result<PolicyDecision, GovernanceError> {
        if self.denied.contains(playbook_code) {
            return Ok(PolicyDecision::reject(format!(
                "Playbook '{}' is denied by policy",
                playbook_code
            )));
        }
        Ok(PolicyDecision::approve())
    }
}
