//! Make unified decision use case
//!
//! Orchestrates one request end to end:
//!
//! ```text
//! intent pipeline (mandatory)
//!   → preflight / node / cost / memory / policy (each optional, sequential)
//!   → DecisionSynthesizer
//!   → DecisionPersister (fatal on failure)
//!   → DecisionEventEmitter (best-effort)
//! ```

use super::emit_events::{DecisionEventEmitter, EmissionReport};
use super::persist_decision::{DecisionPersister, PersistError};
use crate::config::CoordinatorConfig;
use crate::ports::decision_log::DecisionLogStore;
use crate::ports::event_store::EventStore;
use crate::ports::governance::{
    CostGovernance, GovernanceError, IntentPipeline, MemoryService, NodeGovernance,
    PlaybookPreflight, PolicyService,
};
use crate::ports::id_generator::DecisionIdGenerator;
use arbiter_domain::governance::contribution::{
    COST_GOVERNANCE_LAYER, INTENT_LAYER, MEMORY_LAYER, NODE_GOVERNANCE_LAYER, PLAYBOOK_LAYER,
    POLICY_LAYER,
};
use arbiter_domain::{
    DecisionContext, DecisionSynthesizer, ExecutionProfile, IntentRoutingDecision,
    LayerContributions, UnifiedDecisionResult,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Errors that abort a decision
#[derive(Error, Debug)]
pub enum CoordinatorError {
    #[error("{layer} layer failed: {source}")]
    Governance {
        layer: &'static str,
        #[source]
        source: GovernanceError,
    },

    #[error("Persistence failed: {0}")]
    Persistence(#[from] PersistError),
}

impl CoordinatorError {
    fn layer(layer: &'static str) -> impl FnOnce(GovernanceError) -> Self {
        move |source| CoordinatorError::Governance { layer, source }
    }
}

/// Input for one decision
#[derive(Debug, Clone, Default)]
pub struct MakeDecisionInput {
    pub user_input: String,
    pub workspace_id: String,
    pub project_id: Option<String>,
    pub user_id: Option<String>,
    pub context: DecisionContext,
}

impl MakeDecisionInput {
    pub fn new(user_input: impl Into<String>, workspace_id: impl Into<String>) -> Self {
        Self {
            user_input: user_input.into(),
            workspace_id: workspace_id.into(),
            ..Default::default()
        }
    }

    pub fn with_project(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_context(mut self, context: DecisionContext) -> Self {
        self.context = context;
        self
    }
}

/// Everything produced for one request
#[derive(Debug, Clone)]
pub struct DecisionOutput {
    /// The decision as persisted (its id may differ from the intent's on collision)
    pub result: UnifiedDecisionResult,
    pub id_attempts: u32,
    pub attempts_exhausted: bool,
    pub events: EmissionReport,
}

/// Coordinates the governance layers into one persisted decision
pub struct UnifiedDecisionCoordinator<I: IntentPipeline + 'static> {
    intent_pipeline: Arc<I>,
    preflight: Option<Arc<dyn PlaybookPreflight>>,
    node_governance: Option<Arc<dyn NodeGovernance>>,
    cost_governance: Option<Arc<dyn CostGovernance>>,
    memory: Option<Arc<dyn MemoryService>>,
    policy: Option<Arc<dyn PolicyService>>,
    id_generator: Arc<dyn DecisionIdGenerator>,
    persister: DecisionPersister,
    emitter: DecisionEventEmitter,
    synthesizer: DecisionSynthesizer,
    default_profile_id: String,
}

impl<I: IntentPipeline + 'static> UnifiedDecisionCoordinator<I> {
    pub fn new(
        intent_pipeline: Arc<I>,
        decision_log: Arc<dyn DecisionLogStore>,
        event_store: Arc<dyn EventStore>,
        id_generator: Arc<dyn DecisionIdGenerator>,
        config: CoordinatorConfig,
    ) -> Self {
        let persister = DecisionPersister::new(
            decision_log,
            Arc::clone(&id_generator),
            config.max_id_attempts,
        );
        let default_profile_id = config.default_profile_id.clone();
        let emitter = DecisionEventEmitter::new(event_store, config);

        Self {
            intent_pipeline,
            preflight: None,
            node_governance: None,
            cost_governance: None,
            memory: None,
            policy: None,
            id_generator,
            persister,
            emitter,
            synthesizer: DecisionSynthesizer::new(),
            default_profile_id,
        }
    }

    // ==================== Builder Methods ====================

    pub fn with_preflight(mut self, preflight: Arc<dyn PlaybookPreflight>) -> Self {
        self.preflight = Some(preflight);
        self
    }

    pub fn with_node_governance(mut self, node_governance: Arc<dyn NodeGovernance>) -> Self {
        self.node_governance = Some(node_governance);
        self
    }

    pub fn with_cost_governance(mut self, cost_governance: Arc<dyn CostGovernance>) -> Self {
        self.cost_governance = Some(cost_governance);
        self
    }

    pub fn with_memory(mut self, memory: Arc<dyn MemoryService>) -> Self {
        self.memory = Some(memory);
        self
    }

    pub fn with_policy(mut self, policy: Arc<dyn PolicyService>) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Make, persist and announce a decision, returning the persisted result
    pub async fn make_unified_decision(
        &self,
        user_input: &str,
        workspace_id: &str,
        project_id: Option<&str>,
        user_id: Option<&str>,
        context: Option<DecisionContext>,
    ) -> Result<UnifiedDecisionResult, CoordinatorError> {
        let input = MakeDecisionInput {
            user_input: user_input.to_string(),
            workspace_id: workspace_id.to_string(),
            project_id: project_id.map(str::to_string),
            user_id: user_id.map(str::to_string),
            context: context.unwrap_or_default(),
        };
        self.execute(input).await.map(|output| output.result)
    }

    /// Execute the use case, reporting id attempts and event outcomes too
    pub async fn execute(&self, input: MakeDecisionInput) -> Result<DecisionOutput, CoordinatorError> {
        info!(
            "Making decision for workspace {} ({} chars of input)",
            input.workspace_id,
            input.user_input.chars().count()
        );

        let intent = self.route_intent(&input).await?;
        let contributions = self.gather_contributions(&input, &intent).await?;

        let result = self.synthesizer.synthesize(intent, contributions);
        debug!(
            "Strategy {} selected {:?} (auto_execute={}, approval={})",
            result.strategy,
            result.selected_playbook_code,
            result.can_auto_execute,
            result.requires_user_approval
        );

        let persisted = self
            .persister
            .persist(
                result,
                &input.user_input,
                input.user_id.as_deref(),
                &input.context,
            )
            .await?;

        let events = self.emitter.emit(&persisted.result).await;

        info!(
            "Decision {} recorded: {}",
            persisted.result.decision_id,
            persisted
                .result
                .selected_playbook_code
                .as_deref()
                .unwrap_or("(no playbook)")
        );

        Ok(DecisionOutput {
            result: persisted.result,
            id_attempts: persisted.id_attempts,
            attempts_exhausted: persisted.attempts_exhausted,
            events,
        })
    }

    async fn route_intent(
        &self,
        input: &MakeDecisionInput,
    ) -> Result<IntentRoutingDecision, CoordinatorError> {
        let profile_id = input
            .user_id
            .as_deref()
            .unwrap_or(&self.default_profile_id);

        let analysis = self
            .intent_pipeline
            .analyze(
                &input.user_input,
                profile_id,
                &input.workspace_id,
                input.project_id.as_deref(),
                &input.context,
            )
            .await
            .map_err(CoordinatorError::layer(INTENT_LAYER))?;

        let intent = IntentRoutingDecision::from_analysis(
            self.id_generator.generate(),
            analysis,
            input.workspace_id.clone(),
            input.project_id.clone(),
            Some(profile_id.to_string()),
        );
        debug!(
            "Intent {} recommends {:?} with {} alternative(s)",
            intent.decision_id,
            intent.recommended_playbook_code(),
            intent.alternatives.len()
        );
        Ok(intent)
    }

    /// Query the optional layers in order; an absent adapter is no opinion
    async fn gather_contributions(
        &self,
        input: &MakeDecisionInput,
        intent: &IntentRoutingDecision,
    ) -> Result<LayerContributions, CoordinatorError> {
        let mut contributions = LayerContributions::new();
        let playbook_code = intent.recommended_playbook_code();

        if let Some(code) = playbook_code {
            if let Some(preflight) = &self.preflight {
                let result = preflight
                    .preflight(code, intent, &input.context)
                    .await
                    .map_err(CoordinatorError::layer(PLAYBOOK_LAYER))?;
                debug!("Preflight for {}: {}", code, result.status);
                contributions = contributions.with_preflight(result);
            }

            if let Some(node) = &self.node_governance {
                let decision = node
                    .check(code, &input.workspace_id, &input.context)
                    .await
                    .map_err(CoordinatorError::layer(NODE_GOVERNANCE_LAYER))?;
                debug!("Node governance for {}: approved={}", code, decision.approved);
                contributions = contributions.with_node_governance(decision);
            }

            if let Some(cost) = &self.cost_governance {
                let provisional = ExecutionProfile::from_hint(intent.execution_profile_hint);
                let decision = cost
                    .check(code, &provisional, &input.workspace_id, &input.context)
                    .await
                    .map_err(CoordinatorError::layer(COST_GOVERNANCE_LAYER))?;
                debug!("Cost governance for {}: approved={}", code, decision.approved);
                contributions = contributions.with_cost_governance(decision);
            }
        } else {
            debug!("No recommended playbook, skipping playbook-scoped layers");
        }

        if let Some(memory) = &self.memory {
            let recommendation = memory
                .get_recommendation(
                    &input.user_input,
                    &input.workspace_id,
                    input.project_id.as_deref(),
                )
                .await
                .map_err(CoordinatorError::layer(MEMORY_LAYER))?;
            contributions = contributions.with_memory(recommendation);
        }

        if let Some(code) = playbook_code
            && let Some(policy) = &self.policy
        {
            let decision = policy
                .check(
                    code,
                    &input.workspace_id,
                    input.user_id.as_deref(),
                    &input.context,
                )
                .await
                .map_err(CoordinatorError::layer(POLICY_LAYER))?;
            debug!("Policy for {}: approved={}", code, decision.approved);
            contributions = contributions.with_policy(decision);
        }

        Ok(contributions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::test_support::{
        CallLog, MockCost, MockDecisionLog, MockIntentPipeline, MockMemory, MockNode,
        MockPolicy, MockPreflight, RecordingEventStore, SequentialIds, occupied_entry,
    };
    use arbiter_domain::{
        ConflictKind, CostGovernanceDecision, ExecutionMode, ExecutionProfileHint,
        IntentAnalysisResult, MemoryRecommendation, NodeGovernanceDecision, PlaybookCandidate,
        PlaybookPreflightResult, PolicyDecision, ResolutionStrategy, SideEffectLevel,
        SynthesisStrategy,
    };
    use crate::use_cases::emit_events::EmissionStatus;

    struct Harness {
        log: Arc<CallLog>,
        decisions: Arc<MockDecisionLog>,
        events: Arc<RecordingEventStore>,
    }

    impl Harness {
        fn new() -> Self {
            let log = CallLog::new();
            Self {
                decisions: Arc::new(MockDecisionLog::new(log.clone())),
                events: Arc::new(RecordingEventStore::new(log.clone())),
                log,
            }
        }

        fn coordinator(
            &self,
            pipeline: MockIntentPipeline,
        ) -> UnifiedDecisionCoordinator<MockIntentPipeline> {
            UnifiedDecisionCoordinator::new(
                Arc::new(pipeline),
                self.decisions.clone(),
                self.events.clone(),
                Arc::new(SequentialIds::new()),
                CoordinatorConfig::default(),
            )
        }

        fn preflight(&self, result: PlaybookPreflightResult) -> Arc<MockPreflight> {
            Arc::new(MockPreflight {
                result: Ok(result),
                log: self.log.clone(),
            })
        }

        fn policy(&self, decision: PolicyDecision) -> Arc<MockPolicy> {
            Arc::new(MockPolicy {
                result: Ok(decision),
                log: self.log.clone(),
            })
        }
    }

    fn input() -> MakeDecisionInput {
        MakeDecisionInput::new("Write a blog post about rust", "ws-1").with_user("alice")
    }

    #[tokio::test]
    async fn test_scenario_unanimous_agreement() {
        let h = Harness::new();
        let coordinator = h
            .coordinator(MockIntentPipeline::selecting("content_drafting", 0.92, h.log.clone()))
            .with_preflight(h.preflight(PlaybookPreflightResult::accept("content_drafting")))
            .with_policy(h.policy(PolicyDecision::approve()));

        let output = coordinator.execute(input()).await.unwrap();
        let result = output.result;

        assert_eq!(result.selected_playbook_code.as_deref(), Some("content_drafting"));
        assert_eq!(result.strategy, SynthesisStrategy::UnanimousAgreement);
        assert!(result.can_auto_execute);
        assert!(!result.requires_user_approval);
        assert!(result.conflicts.is_empty());
        assert_eq!(result.execution_profile.execution_mode(), ExecutionMode::Simple);
        assert_eq!(result.execution_profile.side_effect_level(), SideEffectLevel::Low);

        // Persisted once, no events
        assert_eq!(h.decisions.len(), 1);
        assert!(h.events.event_types().is_empty());
        assert_eq!(output.id_attempts, 1);
        assert_eq!(output.events.branch_proposed, EmissionStatus::Skipped);
    }

    #[tokio::test]
    async fn test_scenario_preflight_rejects_with_alternative() {
        let h = Harness::new();
        let coordinator = h
            .coordinator(MockIntentPipeline::selecting("legal_review", 0.7, h.log.clone()))
            .with_preflight(h.preflight(
                PlaybookPreflightResult::reject("legal_review", "jurisdiction unsupported")
                    .with_alternatives(["general_review"]),
            ));

        let result = coordinator.execute(input()).await.unwrap().result;

        assert_eq!(result.selected_playbook_code.as_deref(), Some("general_review"));
        assert_eq!(result.strategy, SynthesisStrategy::AlternativePlaybook);
        assert!(result.requires_user_approval);
        assert!(!result.can_auto_execute);
        assert_eq!(result.conflicts[0].kind, ConflictKind::PlaybookRejection);
        assert_eq!(
            result.resolution_strategy,
            Some(ResolutionStrategy::UseAlternativePlaybook)
        );
        assert_eq!(h.events.event_types(), vec!["decision_required"]);
    }

    #[tokio::test]
    async fn test_scenario_cost_rejection_downgrades() {
        let h = Harness::new();
        let analysis = IntentAnalysisResult {
            selected_playbook_code: Some("video_render".to_string()),
            confidence: 0.8,
            alternatives: vec![
                PlaybookCandidate::new("video_render", 0.8),
                PlaybookCandidate::new("storyboard", 0.4),
            ],
            ..Default::default()
        };
        let cost = Arc::new(MockCost::new(
            CostGovernanceDecision::reject("over budget").with_estimated_cost(120.0),
            h.log.clone(),
        ));
        let coordinator = h
            .coordinator(MockIntentPipeline::with_analysis(analysis, h.log.clone()))
            .with_cost_governance(cost.clone());

        let result = coordinator.execute(input()).await.unwrap().result;

        assert_eq!(result.selected_playbook_code.as_deref(), Some("video_render"));
        assert_eq!(result.strategy, SynthesisStrategy::CostDowngrade);
        assert!(result.requires_user_approval);
        assert!(!result.can_auto_execute);
        assert_eq!(result.execution_profile.execution_mode(), ExecutionMode::Simple);
        assert_eq!(result.execution_profile.side_effect_level(), SideEffectLevel::Low);
        assert!(!result.execution_profile.requires_human_approval());
        assert_eq!(result.conflicts[0].kind, ConflictKind::CostExceeded);
        assert_eq!(
            result.resolution_strategy,
            Some(ResolutionStrategy::DowngradeExecutionProfile)
        );

        // Cost saw the provisional profile from the default hint
        let seen = cost.seen_profile.lock().unwrap().clone().unwrap();
        assert_eq!(seen, ExecutionProfile::from_hint(ExecutionProfileHint::Fast));

        assert_eq!(
            h.events.event_types(),
            vec!["branch_proposed", "decision_required"]
        );
    }

    #[tokio::test]
    async fn test_policy_rejection_blocks_without_approval() {
        let h = Harness::new();
        let coordinator = h
            .coordinator(MockIntentPipeline::selecting("bulk_email", 0.9, h.log.clone()))
            .with_policy(h.policy(PolicyDecision::reject("outbound email disabled")));

        let result = coordinator.execute(input()).await.unwrap().result;

        assert_eq!(result.selected_playbook_code, None);
        assert_eq!(result.strategy, SynthesisStrategy::PolicyBlock);
        assert!(!result.requires_user_approval);
        assert!(!result.can_auto_execute);
        assert!(result.is_blocked());
        assert!(h.log.contains("policy:bulk_email:alice"));
    }

    #[tokio::test]
    async fn test_unconfigured_layers_have_no_opinion() {
        let h = Harness::new();
        let coordinator =
            h.coordinator(MockIntentPipeline::selecting("pb_a", 0.9, h.log.clone()));

        let result = coordinator.execute(input()).await.unwrap().result;

        assert!(result.playbook_contribution.is_none());
        assert!(result.node_governance_contribution.is_none());
        assert!(result.cost_governance_contribution.is_none());
        assert!(result.memory_contribution.is_none());
        assert!(result.policy_contribution.is_none());
        assert!(result.can_auto_execute);
    }

    #[tokio::test]
    async fn test_no_recommendation_skips_playbook_layers() {
        let h = Harness::new();
        let analysis = IntentAnalysisResult::default();
        let coordinator = h
            .coordinator(MockIntentPipeline::with_analysis(analysis, h.log.clone()))
            .with_preflight(h.preflight(PlaybookPreflightResult::accept("x")))
            .with_node_governance(Arc::new(MockNode {
                decision: NodeGovernanceDecision::approve(),
                log: h.log.clone(),
            }))
            .with_policy(h.policy(PolicyDecision::approve()))
            .with_memory(Arc::new(MockMemory {
                recommendation: MemoryRecommendation::new(Some("pb_prev".to_string()), 0.6),
                log: h.log.clone(),
            }));

        let result = coordinator.execute(input()).await.unwrap().result;

        assert_eq!(result.selected_playbook_code, None);
        assert_eq!(result.strategy, SynthesisStrategy::ConservativeDefault);
        assert!(result.requires_user_approval);
        assert!(result.memory_contribution.is_some());
        let calls = h.log.calls();
        assert_eq!(calls[0], "intent:alice");
        assert_eq!(calls[1], "memory");
        assert!(!calls.iter().any(|c| c.starts_with("preflight")));
        assert!(!calls.iter().any(|c| c.starts_with("node")));
        assert!(!calls.iter().any(|c| c.starts_with("policy")));
    }

    #[tokio::test]
    async fn test_layers_called_in_order_then_persist_then_events() {
        let h = Harness::new();
        let analysis = IntentAnalysisResult {
            selected_playbook_code: Some("pb_a".to_string()),
            confidence: 0.9,
            alternatives: vec![PlaybookCandidate::new("pb_b", 0.3)],
            ..Default::default()
        };
        let coordinator = h
            .coordinator(MockIntentPipeline::with_analysis(analysis, h.log.clone()))
            .with_preflight(h.preflight(PlaybookPreflightResult::accept("pb_a")))
            .with_node_governance(Arc::new(MockNode {
                decision: NodeGovernanceDecision::approve(),
                log: h.log.clone(),
            }))
            .with_cost_governance(Arc::new(MockCost::new(
                CostGovernanceDecision::approve(),
                h.log.clone(),
            )))
            .with_memory(Arc::new(MockMemory {
                recommendation: MemoryRecommendation::none(),
                log: h.log.clone(),
            }))
            .with_policy(h.policy(PolicyDecision::approve()));

        let result = coordinator.execute(input()).await.unwrap().result;

        assert_eq!(
            h.log.calls(),
            vec![
                "intent:alice".to_string(),
                "preflight:pb_a".to_string(),
                "node:pb_a".to_string(),
                "cost:pb_a".to_string(),
                "memory".to_string(),
                "policy:pb_a:alice".to_string(),
                format!("put:{}", result.decision_id),
                "event:branch_proposed".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_default_profile_id_without_user() {
        let h = Harness::new();
        let coordinator = h.coordinator(MockIntentPipeline::selecting("pb_a", 0.9, h.log.clone()));

        let result = coordinator
            .make_unified_decision("hello", "ws-1", Some("proj-9"), None, None)
            .await
            .unwrap();

        assert!(h.log.contains("intent:default_user"));
        assert_eq!(result.intent_contribution.profile_id.as_deref(), Some("default_user"));
        assert_eq!(result.intent_contribution.project_id.as_deref(), Some("proj-9"));
    }

    #[tokio::test]
    async fn test_layer_failure_propagates() {
        let h = Harness::new();
        let coordinator = h
            .coordinator(MockIntentPipeline::selecting("pb_a", 0.9, h.log.clone()))
            .with_preflight(Arc::new(MockPreflight {
                result: Err(GovernanceError::Unavailable("preflight down".to_string())),
                log: h.log.clone(),
            }));

        let err = coordinator.execute(input()).await.unwrap_err();

        match err {
            CoordinatorError::Governance { layer, source } => {
                assert_eq!(layer, PLAYBOOK_LAYER);
                assert_eq!(source, GovernanceError::Unavailable("preflight down".to_string()));
            }
            other => panic!("unexpected error: {}", other),
        }
        assert_eq!(h.decisions.len(), 0);
    }

    #[tokio::test]
    async fn test_id_collision_reassigns_id() {
        let h = Harness::new();
        // SequentialIds hands gen-1 to the intent decision; occupy it
        h.decisions.seed(occupied_entry("gen-1"));
        let coordinator = h.coordinator(MockIntentPipeline::selecting("pb_a", 0.9, h.log.clone()));

        let output = coordinator.execute(input()).await.unwrap();

        assert_eq!(output.result.decision_id.as_str(), "gen-2");
        assert_eq!(output.id_attempts, 2);
        assert_eq!(h.decisions.len(), 2);
    }

    #[tokio::test]
    async fn test_persistence_failure_is_fatal_and_emits_nothing() {
        let log = CallLog::new();
        let events = Arc::new(RecordingEventStore::new(log.clone()));
        let analysis = IntentAnalysisResult {
            alternatives: vec![PlaybookCandidate::new("pb_b", 0.3)],
            ..Default::default()
        };
        let coordinator = UnifiedDecisionCoordinator::new(
            Arc::new(MockIntentPipeline::with_analysis(analysis, log.clone())),
            Arc::new(MockDecisionLog::failing(log.clone())),
            events.clone(),
            Arc::new(SequentialIds::new()),
            CoordinatorConfig::default(),
        );

        let err = coordinator.execute(input()).await.unwrap_err();

        assert!(matches!(err, CoordinatorError::Persistence(_)));
        assert!(events.event_types().is_empty());
    }

    #[tokio::test]
    async fn test_event_failure_does_not_fail_decision() {
        let log = CallLog::new();
        let decisions = Arc::new(MockDecisionLog::new(log.clone()));
        let analysis = IntentAnalysisResult {
            alternatives: vec![PlaybookCandidate::new("pb_b", 0.3)],
            ..Default::default()
        };
        let coordinator = UnifiedDecisionCoordinator::new(
            Arc::new(MockIntentPipeline::with_analysis(analysis, log.clone())),
            decisions.clone(),
            Arc::new(RecordingEventStore::failing_on("decision_required", log.clone())),
            Arc::new(SequentialIds::new()),
            CoordinatorConfig::default(),
        );

        let output = coordinator.execute(input()).await.unwrap();

        assert!(output.events.branch_proposed.is_emitted());
        assert!(matches!(output.events.decision_required, EmissionStatus::Failed(_)));
        assert_eq!(decisions.len(), 1);
    }
}
