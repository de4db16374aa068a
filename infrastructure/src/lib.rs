//! Infrastructure layer for playbook-arbiter
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod events;
pub mod governance;
pub mod id;
pub mod storage;

// Re-export commonly used types
pub use config::{
    ConfigIssue, ConfigIssueCode, ConfigLoader, FileConfig, FileCoordinatorConfig,
    FileGovernanceConfig, FileIntentConfig, FileStorageConfig, Severity,
};
pub use events::{InMemoryEventStore, JsonlEventStore};
pub use governance::{
    AvailabilityNodeGovernance, BudgetCostGovernance, DenylistPolicy, KeywordIntentPipeline,
    RulePreflight,
};
pub use id::UuidDecisionIdGenerator;
pub use storage::{FileDecisionLog, InMemoryDecisionLog};
