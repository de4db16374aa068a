//! Unified decision domain
//!
//! # Flow
//!
//! ```text
//! IntentRoutingDecision + LayerContributions
//!        ↓
//! strategy::select_strategy()      first applicable strategy wins
//!        ↓
//! conflict::detect_conflicts()     layers still disagreeing with the selection
//!        ↓
//! conflict::approval_required_by_rule()
//!        ↓
//! UnifiedDecisionResult ──→ DecisionLogEntry (persisted)
//!                       └─→ events::project_*() (branch / decision-required)
//! ```

pub mod conflict;
pub mod events;
pub mod log_entry;
pub mod profile;
pub mod result;
pub mod strategy;
pub mod synthesizer;

pub use conflict::{Conflict, ConflictKind, ResolutionStrategy};
pub use events::{
    BranchDiffOptions, BranchOption, BranchProposed, CardType, DecisionEvent, DecisionPriority,
    DecisionRequired, EventEnvelope,
};
pub use log_entry::{DecisionContext, DecisionLogEntry, DecisionLogMetadata};
pub use profile::{ExecutionMode, ExecutionProfile, SideEffectLevel};
pub use result::UnifiedDecisionResult;
pub use strategy::{StrategyOutcome, SynthesisStrategy};
pub use synthesizer::DecisionSynthesizer;
