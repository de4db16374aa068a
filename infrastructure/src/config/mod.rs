//! Configuration file loading for playbook-arbiter
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `ARBITER_` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./arbiter.toml` or `./.arbiter.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/playbook-arbiter/config.toml`
//! 5. Default values

mod file_config;
mod loader;
pub mod validation;

pub use file_config::{
    FileConfig, FileCoordinatorConfig, FileGovernanceConfig, FileIntentConfig, FileIntentRoute,
    FileLoggingConfig, FileOutputConfig, FilePreflightRule, FileStorageConfig,
};
pub use loader::{ConfigLoader, ConfigSource};
pub use validation::{ConfigIssue, ConfigIssueCode, Severity};
