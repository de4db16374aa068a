//! Playbook routing domain
//!
//! Candidates and the intent layer's routing decision.

pub mod candidate;
pub mod intent;

pub use candidate::PlaybookCandidate;
pub use intent::{DecisionMethod, ExecutionProfileHint, IntentAnalysisResult, IntentRoutingDecision};
