//! Governance layer opinions
//!
//! Each governance service is independent and optional. Their opinions are
//! plain data; all reconciliation happens in [`crate::decision`].

pub mod contribution;
pub mod decisions;
pub mod preflight;

pub use contribution::{KNOWN_LAYERS, LayerContribution, LayerContributions};
pub use decisions::{
    CostGovernanceDecision, MemoryRecommendation, NodeGovernanceDecision, PolicyDecision,
};
pub use preflight::{PlaybookPreflightResult, PreflightStatus};
