//! Mock ports shared by the use case tests.

use crate::ports::decision_log::{DecisionLogStore, StoreError};
use crate::ports::event_store::{EventStore, EventStoreError};
use crate::ports::governance::{
    CostGovernance, GovernanceError, IntentPipeline, MemoryService, NodeGovernance,
    PlaybookPreflight, PolicyService,
};
use crate::ports::id_generator::DecisionIdGenerator;
use arbiter_domain::{
    CostGovernanceDecision, DecisionContext, DecisionId, DecisionLogEntry, DecisionSynthesizer,
    EventEnvelope, ExecutionProfile, IntentAnalysisResult, IntentRoutingDecision,
    LayerContributions, MemoryRecommendation, NodeGovernanceDecision, PlaybookPreflightResult,
    PolicyDecision, UnifiedDecisionResult,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Ordered record of side effects across all mocks
#[derive(Default)]
pub(crate) struct CallLog {
    calls: Mutex<Vec<String>>,
}

impl CallLog {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn contains(&self, call: &str) -> bool {
        self.calls.lock().unwrap().iter().any(|c| c == call)
    }
}

/// Intent pipeline returning a fixed analysis
pub(crate) struct MockIntentPipeline {
    pub(crate) analysis: IntentAnalysisResult,
    pub(crate) log: Arc<CallLog>,
}

impl MockIntentPipeline {
    pub(crate) fn selecting(code: &str, confidence: f64, log: Arc<CallLog>) -> Self {
        Self {
            analysis: IntentAnalysisResult {
                selected_playbook_code: Some(code.to_string()),
                confidence,
                task_domain: Some("content".to_string()),
                ..Default::default()
            },
            log,
        }
    }

    pub(crate) fn with_analysis(analysis: IntentAnalysisResult, log: Arc<CallLog>) -> Self {
        Self { analysis, log }
    }
}

#[async_trait]
impl IntentPipeline for MockIntentPipeline {
    async fn analyze(
        &self,
        _user_input: &str,
        profile_id: &str,
        _workspace_id: &str,
        _project_id: Option<&str>,
        _context: &DecisionContext,
    ) -> Result<IntentAnalysisResult, GovernanceError> {
        self.log.record(format!("intent:{}", profile_id));
        Ok(self.analysis.clone())
    }
}

pub(crate) struct MockPreflight {
    pub(crate) result: Result<PlaybookPreflightResult, GovernanceError>,
    pub(crate) log: Arc<CallLog>,
}

#[async_trait]
impl PlaybookPreflight for MockPreflight {
    async fn preflight(
        &self,
        playbook_code: &str,
        _intent_decision: &IntentRoutingDecision,
        _context: &DecisionContext,
    ) -> Result<PlaybookPreflightResult, GovernanceError> {
        self.log.record(format!("preflight:{}", playbook_code));
        self.result.clone()
    }
}

pub(crate) struct MockNode {
    pub(crate) decision: NodeGovernanceDecision,
    pub(crate) log: Arc<CallLog>,
}

#[async_trait]
impl NodeGovernance for MockNode {
    async fn check(
        &self,
        playbook_code: &str,
        _workspace_id: &str,
        _context: &DecisionContext,
    ) -> Result<NodeGovernanceDecision, GovernanceError> {
        self.log.record(format!("node:{}", playbook_code));
        Ok(self.decision.clone())
    }
}

/// Cost governance that remembers the profile it was asked about
pub(crate) struct MockCost {
    pub(crate) decision: CostGovernanceDecision,
    pub(crate) seen_profile: Mutex<Option<ExecutionProfile>>,
    pub(crate) log: Arc<CallLog>,
}

impl MockCost {
    pub(crate) fn new(decision: CostGovernanceDecision, log: Arc<CallLog>) -> Self {
        Self {
            decision,
            seen_profile: Mutex::new(None),
            log,
        }
    }
}

#[async_trait]
impl CostGovernance for MockCost {
    async fn check(
        &self,
        playbook_code: &str,
        execution_profile: &ExecutionProfile,
        _workspace_id: &str,
        _context: &DecisionContext,
    ) -> Result<CostGovernanceDecision, GovernanceError> {
        self.log.record(format!("cost:{}", playbook_code));
        *self.seen_profile.lock().unwrap() = Some(execution_profile.clone());
        Ok(self.decision.clone())
    }
}

pub(crate) struct MockMemory {
    pub(crate) recommendation: MemoryRecommendation,
    pub(crate) log: Arc<CallLog>,
}

#[async_trait]
impl MemoryService for MockMemory {
    async fn get_recommendation(
        &self,
        _user_input: &str,
        _workspace_id: &str,
        _project_id: Option<&str>,
    ) -> Result<MemoryRecommendation, GovernanceError> {
        self.log.record("memory");
        Ok(self.recommendation.clone())
    }
}

pub(crate) struct MockPolicy {
    pub(crate) result: Result<PolicyDecision, GovernanceError>,
    pub(crate) log: Arc<CallLog>,
}

#[async_trait]
impl PolicyService for MockPolicy {
    async fn check(
        &self,
        playbook_code: &str,
        _workspace_id: &str,
        user_id: Option<&str>,
        _context: &DecisionContext,
    ) -> Result<PolicyDecision, GovernanceError> {
        self.log.record(format!(
            "policy:{}:{}",
            playbook_code,
            user_id.unwrap_or("-")
        ));
        self.result.clone()
    }
}

/// In-memory decision log with injectable write failures
pub(crate) struct MockDecisionLog {
    pub(crate) entries: Mutex<HashMap<DecisionId, DecisionLogEntry>>,
    pub(crate) fail_writes: bool,
    pub(crate) log: Arc<CallLog>,
}

impl MockDecisionLog {
    pub(crate) fn new(log: Arc<CallLog>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            fail_writes: false,
            log,
        }
    }

    pub(crate) fn failing(log: Arc<CallLog>) -> Self {
        Self {
            fail_writes: true,
            ..Self::new(log)
        }
    }

    /// Occupy an id so the next write under it collides
    pub(crate) fn seed(&self, entry: DecisionLogEntry) {
        self.entries
            .lock()
            .unwrap()
            .insert(entry.decision_id.clone(), entry);
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }
}

#[async_trait]
impl DecisionLogStore for MockDecisionLog {
    async fn get(&self, decision_id: &DecisionId) -> Result<Option<DecisionLogEntry>, StoreError> {
        Ok(self.entries.lock().unwrap().get(decision_id).cloned())
    }

    async fn put(&self, entry: &DecisionLogEntry) -> Result<(), StoreError> {
        if self.fail_writes {
            return Err(StoreError::Backend("disk full".to_string()));
        }
        let mut entries = self.entries.lock().unwrap();
        if entries.contains_key(&entry.decision_id) {
            return Err(StoreError::AlreadyExists(entry.decision_id.clone()));
        }
        self.log.record(format!("put:{}", entry.decision_id));
        entries.insert(entry.decision_id.clone(), entry.clone());
        Ok(())
    }
}

/// Event store recording appended events, optionally failing one event type
pub(crate) struct RecordingEventStore {
    pub(crate) events: Mutex<Vec<EventEnvelope>>,
    pub(crate) fail_on: Option<&'static str>,
    pub(crate) log: Arc<CallLog>,
}

impl RecordingEventStore {
    pub(crate) fn new(log: Arc<CallLog>) -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            fail_on: None,
            log,
        }
    }

    pub(crate) fn failing_on(event_type: &'static str, log: Arc<CallLog>) -> Self {
        Self {
            fail_on: Some(event_type),
            ..Self::new(log)
        }
    }

    pub(crate) fn event_types(&self) -> Vec<&'static str> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.event.event_type())
            .collect()
    }
}

#[async_trait]
impl EventStore for RecordingEventStore {
    async fn append(&self, event: &EventEnvelope) -> Result<(), EventStoreError> {
        let event_type = event.event.event_type();
        if self.fail_on == Some(event_type) {
            return Err(EventStoreError::Backend("broker down".to_string()));
        }
        self.log.record(format!("event:{}", event_type));
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

/// Deterministic ids: `gen-1`, `gen-2`, ...
pub(crate) struct SequentialIds {
    next: Mutex<u32>,
}

impl SequentialIds {
    pub(crate) fn new() -> Self {
        Self {
            next: Mutex::new(1),
        }
    }
}

impl DecisionIdGenerator for SequentialIds {
    fn generate(&self) -> DecisionId {
        let mut next = self.next.lock().unwrap();
        let id = DecisionId::new(format!("gen-{}", *next)).unwrap();
        *next += 1;
        id
    }
}

/// A synthesized decision with no governance opinions
pub(crate) fn sample_result(decision_id: &str, playbook: Option<&str>) -> UnifiedDecisionResult {
    let analysis = IntentAnalysisResult {
        selected_playbook_code: playbook.map(str::to_string),
        confidence: 0.9,
        ..Default::default()
    };
    let intent = IntentRoutingDecision::from_analysis(
        DecisionId::new(decision_id).unwrap(),
        analysis,
        "ws-1",
        None,
        Some("alice".to_string()),
    );
    DecisionSynthesizer::new().synthesize(intent, LayerContributions::new())
}

/// A log entry occupying `decision_id`
pub(crate) fn occupied_entry(decision_id: &str) -> DecisionLogEntry {
    let result = sample_result(decision_id, Some("pb_existing"));
    DecisionLogEntry::from_result(&result, "earlier request", None, DecisionContext::new(), 1)
}
