//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted to application types on use.

mod coordinator;
mod governance;
mod intent;
mod output;
mod storage;

pub use coordinator::FileCoordinatorConfig;
pub use governance::{FileGovernanceConfig, FilePreflightRule};
pub use intent::{FileIntentConfig, FileIntentRoute};
pub use output::{FileLoggingConfig, FileOutputConfig};
pub use storage::FileStorageConfig;

use super::validation::ConfigIssue;
use serde::{Deserialize, Serialize};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Persistence and event emission
    pub coordinator: FileCoordinatorConfig,
    /// Decision log and event store locations
    pub storage: FileStorageConfig,
    /// Output settings
    pub output: FileOutputConfig,
    /// Tracing file output
    pub logging: FileLoggingConfig,
    /// Keyword intent routes
    pub intent: FileIntentConfig,
    /// Rule-based governance layers
    pub governance: FileGovernanceConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    ///
    /// This is the single entry point for config validation. It checks:
    /// 1. Coordinator ranges (id attempts, confidence gap, profile id)
    /// 2. Intent routes (empty codes or keywords, confidence range)
    /// 3. Governance rules (negative costs, unknown preflight statuses)
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        issues.extend(self.coordinator.to_coordinator_config().1);
        issues.extend(self.intent.validate());
        issues.extend(self.governance.validate());

        issues
    }
}
