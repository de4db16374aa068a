//! Intent routing decisions
//!
//! The intent layer is the mandatory first opinion in every unified decision.
//! [`IntentRoutingDecision`] is built once per user turn from the upstream
//! [`IntentAnalysisResult`] and only changes afterwards through an explicit
//! user override.

use super::candidate::{PlaybookCandidate, clamp_confidence, deserialize_confidence};
use crate::core::error::DomainError;
use crate::core::id::{DecisionId, current_timestamp};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How the intent layer arrived at its recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionMethod {
    RuleBased,
    LlmBased,
    IntentCard,
    UserOverride,
    #[default]
    IntentPipeline,
}

impl DecisionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionMethod::RuleBased => "rule_based",
            DecisionMethod::LlmBased => "llm_based",
            DecisionMethod::IntentCard => "intent_card",
            DecisionMethod::UserOverride => "user_override",
            DecisionMethod::IntentPipeline => "intent_pipeline",
        }
    }
}

impl fmt::Display for DecisionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DecisionMethod {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rule_based" | "rule" => Ok(DecisionMethod::RuleBased),
            "llm_based" | "llm" => Ok(DecisionMethod::LlmBased),
            "intent_card" => Ok(DecisionMethod::IntentCard),
            "user_override" => Ok(DecisionMethod::UserOverride),
            "intent_pipeline" | "pipeline" => Ok(DecisionMethod::IntentPipeline),
            _ => Err(DomainError::unknown("decision method", s)),
        }
    }
}

/// Execution profile hint attached by the intent layer.
///
/// The hint is only a starting point: the synthesizer derives the final
/// [`ExecutionProfile`](crate::decision::profile::ExecutionProfile) from it
/// and the other layers' opinions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionProfileHint {
    #[default]
    Fast,
    Durable,
    HumanReview,
}

impl fmt::Display for ExecutionProfileHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionProfileHint::Fast => write!(f, "fast"),
            ExecutionProfileHint::Durable => write!(f, "durable"),
            ExecutionProfileHint::HumanReview => write!(f, "human_review"),
        }
    }
}

impl std::str::FromStr for ExecutionProfileHint {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "fast" => Ok(ExecutionProfileHint::Fast),
            "durable" => Ok(ExecutionProfileHint::Durable),
            "human_review" | "review" => Ok(ExecutionProfileHint::HumanReview),
            _ => Err(DomainError::unknown("execution profile hint", s)),
        }
    }
}

/// Output of the upstream intent pipeline for one user turn
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntentAnalysisResult {
    /// Selected playbook, if the pipeline found one
    pub selected_playbook_code: Option<String>,
    /// Confidence of the selection (0.0 to 1.0)
    #[serde(deserialize_with = "deserialize_confidence")]
    pub confidence: f64,
    /// Task-domain classification (e.g., "content", "analytics")
    pub task_domain: Option<String>,
    /// Steps of a declared multi-step workflow, in order
    pub workflow_steps: Vec<String>,
    /// Other viable playbooks
    pub alternatives: Vec<PlaybookCandidate>,
    pub required_inputs: Vec<String>,
    pub missing_inputs: Vec<String>,
    pub method: DecisionMethod,
}

/// The intent layer's routing decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentRoutingDecision {
    pub decision_id: DecisionId,
    pub suggested_playbook: Option<PlaybookCandidate>,
    #[serde(default)]
    pub alternatives: Vec<PlaybookCandidate>,
    #[serde(deserialize_with = "deserialize_confidence")]
    pub confidence: f64,
    pub rationale: String,
    pub decision_method: DecisionMethod,
    pub execution_profile_hint: ExecutionProfileHint,
    #[serde(default)]
    pub required_inputs: Vec<String>,
    #[serde(default)]
    pub missing_inputs: Vec<String>,
    pub user_override: Option<PlaybookCandidate>,
    pub override_reason: Option<String>,
    #[serde(default)]
    pub should_learn: bool,
    /// Milliseconds since epoch
    pub timestamp: u64,
    pub workspace_id: String,
    pub project_id: Option<String>,
    pub profile_id: Option<String>,
}

impl IntentRoutingDecision {
    /// Create an empty decision (no recommendation) for a workspace
    pub fn new(decision_id: DecisionId, workspace_id: impl Into<String>) -> Self {
        Self {
            decision_id,
            suggested_playbook: None,
            alternatives: Vec::new(),
            confidence: 0.0,
            rationale: String::new(),
            decision_method: DecisionMethod::default(),
            execution_profile_hint: ExecutionProfileHint::default(),
            required_inputs: Vec::new(),
            missing_inputs: Vec::new(),
            user_override: None,
            override_reason: None,
            should_learn: false,
            timestamp: current_timestamp(),
            workspace_id: workspace_id.into(),
            project_id: None,
            profile_id: None,
        }
    }

    /// Build the routing decision from an intent pipeline result.
    ///
    /// The suggested candidate inherits the pipeline's inputs and any declared
    /// workflow steps. The hint always starts at [`ExecutionProfileHint::Fast`].
    pub fn from_analysis(
        decision_id: DecisionId,
        analysis: IntentAnalysisResult,
        workspace_id: impl Into<String>,
        project_id: Option<String>,
        profile_id: Option<String>,
    ) -> Self {
        let task_domain = analysis.task_domain.as_deref().unwrap_or("unknown");
        let rationale = format!("Intent pipeline: task_domain={}", task_domain);

        let suggested_playbook = analysis.selected_playbook_code.map(|code| {
            PlaybookCandidate::new(code, analysis.confidence)
                .with_rationale(rationale.clone())
                .with_required_inputs(analysis.required_inputs.iter().cloned())
                .with_missing_inputs(analysis.missing_inputs.iter().cloned())
                .with_orchestration_steps(analysis.workflow_steps)
        });

        Self {
            suggested_playbook,
            alternatives: analysis
                .alternatives
                .into_iter()
                .map(PlaybookCandidate::clamped)
                .collect(),
            confidence: clamp_confidence(analysis.confidence),
            rationale,
            decision_method: analysis.method,
            required_inputs: analysis.required_inputs,
            missing_inputs: analysis.missing_inputs,
            project_id,
            profile_id,
            ..Self::new(decision_id, workspace_id)
        }
    }

    pub fn with_suggestion(mut self, candidate: PlaybookCandidate) -> Self {
        self.confidence = candidate.confidence;
        self.suggested_playbook = Some(candidate);
        self
    }

    pub fn with_alternatives(mut self, alternatives: Vec<PlaybookCandidate>) -> Self {
        self.alternatives = alternatives.into_iter().map(PlaybookCandidate::clamped).collect();
        self
    }

    pub fn with_hint(mut self, hint: ExecutionProfileHint) -> Self {
        self.execution_profile_hint = hint;
        self
    }

    pub fn with_missing_inputs<I, S>(mut self, inputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.missing_inputs = inputs.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_project(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    /// Code of the recommended playbook, derived from the suggestion
    pub fn recommended_playbook_code(&self) -> Option<&str> {
        self.suggested_playbook
            .as_ref()
            .map(|c| c.playbook_code.as_str())
    }

    /// Whether a later user action may override this decision.
    ///
    /// Always true today; the approval rule keeps a branch for it.
    pub fn is_overridable(&self) -> bool {
        true
    }

    /// Record an explicit user override.
    ///
    /// Overrides are a learning signal, so `should_learn` is set.
    pub fn apply_override(&mut self, candidate: PlaybookCandidate, reason: impl Into<String>) {
        self.user_override = Some(candidate);
        self.override_reason = Some(reason.into());
        self.decision_method = DecisionMethod::UserOverride;
        self.should_learn = true;
    }

    /// The alternative with the highest confidence (first wins on ties)
    pub fn best_alternative(&self) -> Option<&PlaybookCandidate> {
        self.alternatives.iter().fold(None, |best, candidate| match best {
            Some(b) if b.confidence >= candidate.confidence => Some(b),
            _ => Some(candidate),
        })
    }
}
