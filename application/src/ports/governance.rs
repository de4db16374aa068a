//! Governance layer ports
//!
//! Each governance service is an independent collaborator consumed through a
//! narrow contract. Ports return `Result<_, GovernanceError>` so the
//! coordinator can tell "the call failed" apart from "the layer is not
//! configured" (which is simply the absence of an adapter).
//!
//! # Ports
//!
//! | Port | Opinion |
//! |------|---------|
//! | [`IntentPipeline`] | which playbook fits the request (mandatory) |
//! | [`PlaybookPreflight`] | can the playbook run as requested |
//! | [`NodeGovernance`] | are resources available |
//! | [`CostGovernance`] | is the estimated cost acceptable |
//! | [`MemoryService`] | what worked for similar requests before |
//! | [`PolicyService`] | is the action allowed at all |

use arbiter_domain::{
    CostGovernanceDecision, DecisionContext, ExecutionProfile, IntentAnalysisResult,
    IntentRoutingDecision, MemoryRecommendation, NodeGovernanceDecision, PlaybookPreflightResult,
    PolicyDecision,
};
use async_trait::async_trait;
use thiserror::Error;

/// Failure of a configured governance collaborator.
///
/// Retry and circuit-breaking belong to the adapter's transport; the
/// coordinator propagates these as-is.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GovernanceError {
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("{0}")]
    Other(String),
}

/// Upstream intent analysis
#[async_trait]
pub trait IntentPipeline: Send + Sync {
    async fn analyze(
        &self,
        user_input: &str,
        profile_id: &str,
        workspace_id: &str,
        project_id: Option<&str>,
        context: &DecisionContext,
    ) -> Result<IntentAnalysisResult, GovernanceError>;
}

/// Validates a playbook against the request before execution
#[async_trait]
pub trait PlaybookPreflight: Send + Sync {
    async fn preflight(
        &self,
        playbook_code: &str,
        intent_decision: &IntentRoutingDecision,
        context: &DecisionContext,
    ) -> Result<PlaybookPreflightResult, GovernanceError>;
}

/// Node / resource governance
#[async_trait]
pub trait NodeGovernance: Send + Sync {
    async fn check(
        &self,
        playbook_code: &str,
        workspace_id: &str,
        context: &DecisionContext,
    ) -> Result<NodeGovernanceDecision, GovernanceError>;
}

/// Cost governance; judges the provisional execution profile
#[async_trait]
pub trait CostGovernance: Send + Sync {
    async fn check(
        &self,
        playbook_code: &str,
        execution_profile: &ExecutionProfile,
        workspace_id: &str,
        context: &DecisionContext,
    ) -> Result<CostGovernanceDecision, GovernanceError>;
}

/// Long-term memory recommendation
#[async_trait]
pub trait MemoryService: Send + Sync {
    async fn get_recommendation(
        &self,
        user_input: &str,
        workspace_id: &str,
        project_id: Option<&str>,
    ) -> Result<MemoryRecommendation, GovernanceError>;
}

/// Policy enforcement
#[async_trait]
pub trait PolicyService: Send + Sync {
    async fn check(
        &self,
        playbook_code: &str,
        workspace_id: &str,
        user_id: Option<&str>,
        context: &DecisionContext,
    ) -> Result<PolicyDecision, GovernanceError>;
}
