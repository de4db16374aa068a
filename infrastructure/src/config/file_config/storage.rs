//! Storage configuration from TOML (`[storage]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where decisions and events are kept.
///
/// Unset paths select the in-memory stores, which only live for one process.
///
/// ```toml
/// [storage]
/// decision_log_dir = ".arbiter/decisions"
/// event_log_path = ".arbiter/events.jsonl"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileStorageConfig {
    /// Directory holding one JSON file per decision
    pub decision_log_dir: Option<PathBuf>,
    /// Append-only JSONL file for decision events
    pub event_log_path: Option<PathBuf>,
}
