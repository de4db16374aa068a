//! Domain layer for playbook-arbiter
//!
//! This crate contains the value objects and pure decision logic of the
//! unified decision engine. It has no dependencies on infrastructure or
//! presentation concerns and performs no I/O.
//!
//! # Core Concepts
//!
//! ## Layers
//!
//! A user request is judged by several independent governance layers:
//! intent routing, playbook preflight, node governance, cost governance,
//! long-term memory and policy. Only the intent layer is mandatory; every
//! other layer may abstain.
//!
//! ## Synthesis
//!
//! [`DecisionSynthesizer`] reconciles the layers into one
//! [`UnifiedDecisionResult`] with a derived [`ExecutionProfile`].

pub mod core;
pub mod decision;
pub mod governance;
pub mod playbook;

pub use core::{error::DomainError, id::DecisionId};
pub use decision::{
    BranchDiffOptions, BranchProposed, CardType, Conflict, ConflictKind, DecisionContext,
    DecisionEvent, DecisionLogEntry, DecisionPriority, DecisionRequired, DecisionSynthesizer,
    EventEnvelope, ExecutionMode, ExecutionProfile, ResolutionStrategy, SideEffectLevel,
    SynthesisStrategy, UnifiedDecisionResult,
};
pub use governance::{
    CostGovernanceDecision, LayerContribution, LayerContributions, MemoryRecommendation,
    NodeGovernanceDecision, PlaybookPreflightResult, PolicyDecision, PreflightStatus,
};
pub use playbook::{
    DecisionMethod, ExecutionProfileHint, IntentAnalysisResult, IntentRoutingDecision,
    PlaybookCandidate,
};
