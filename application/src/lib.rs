//! Application layer for playbook-arbiter
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::CoordinatorConfig;
pub use ports::{
    decision_log::{DecisionLogStore, StoreError},
    event_store::{EventStore, EventStoreError, NoEventStore},
    governance::{
        CostGovernance, GovernanceError, IntentPipeline, MemoryService, NodeGovernance,
        PlaybookPreflight, PolicyService,
    },
    id_generator::DecisionIdGenerator,
};
pub use use_cases::emit_events::{DecisionEventEmitter, EmissionReport, EmissionStatus};
pub use use_cases::make_decision::{
    CoordinatorError, DecisionOutput, MakeDecisionInput, UnifiedDecisionCoordinator,
};
pub use use_cases::persist_decision::{DecisionPersister, PersistError, PersistedDecision};
pub use use_cases::replay_decision::{ReplayDecisionUseCase, ReplayError, ReplayReport};
