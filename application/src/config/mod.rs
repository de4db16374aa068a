//! Application-level configuration.
//!
//! - [`CoordinatorConfig`] - persistence retries and event emission switches

pub mod coordinator_config;

pub use coordinator_config::CoordinatorConfig;
