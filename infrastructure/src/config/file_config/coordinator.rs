//! Coordinator configuration from TOML (`[coordinator]` section)

use crate::config::validation::ConfigIssue;
use arbiter_application::CoordinatorConfig;
use arbiter_domain::BranchDiffOptions;
use serde::{Deserialize, Serialize};

/// Raw coordinator configuration from TOML
///
/// # Example
///
/// ```toml
/// [coordinator]
/// max_id_attempts = 3
/// emit_branch_events = true
/// emit_decision_events = true
/// max_branch_differences = 3
/// confidence_gap_threshold = 0.1
/// default_profile_id = "default_user"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileCoordinatorConfig {
    /// Ids checked against the decision log before giving up
    pub max_id_attempts: u32,
    pub emit_branch_events: bool,
    pub emit_decision_events: bool,
    /// Differences listed per branch in branch-proposed events
    pub max_branch_differences: usize,
    /// Confidence gaps above this are reported as branch differences
    pub confidence_gap_threshold: f64,
    /// Profile id used when the request has no user
    pub default_profile_id: String,
}

impl Default for FileCoordinatorConfig {
    fn default() -> Self {
        let config = CoordinatorConfig::default();
        Self {
            max_id_attempts: config.max_id_attempts,
            emit_branch_events: config.emit_branch_events,
            emit_decision_events: config.emit_decision_events,
            max_branch_differences: config.branch_diff.max_differences,
            confidence_gap_threshold: config.branch_diff.confidence_gap_threshold,
            default_profile_id: config.default_profile_id,
        }
    }
}

impl FileCoordinatorConfig {
    /// Convert to the application [`CoordinatorConfig`], returning validation issues.
    ///
    /// Out-of-range values fall back to their defaults.
    pub fn to_coordinator_config(&self) -> (CoordinatorConfig, Vec<ConfigIssue>) {
        let defaults = CoordinatorConfig::default();
        let mut issues = Vec::new();

        let max_id_attempts = if self.max_id_attempts == 0 {
            issues.push(ConfigIssue::out_of_range(
                "coordinator.max_id_attempts",
                format!(
                    "coordinator.max_id_attempts must be at least 1, falling back to {}",
                    defaults.max_id_attempts
                ),
            ));
            defaults.max_id_attempts
        } else {
            self.max_id_attempts
        };

        let confidence_gap_threshold = if (0.0..=1.0).contains(&self.confidence_gap_threshold) {
            self.confidence_gap_threshold
        } else {
            issues.push(ConfigIssue::out_of_range(
                "coordinator.confidence_gap_threshold",
                format!(
                    "coordinator.confidence_gap_threshold {} is outside [0, 1], falling back to {}",
                    self.confidence_gap_threshold, defaults.branch_diff.confidence_gap_threshold
                ),
            ));
            defaults.branch_diff.confidence_gap_threshold
        };

        let default_profile_id = if self.default_profile_id.trim().is_empty() {
            issues.push(ConfigIssue::empty(
                "coordinator.default_profile_id",
                format!(
                    "coordinator.default_profile_id is empty, falling back to '{}'",
                    defaults.default_profile_id
                ),
            ));
            defaults.default_profile_id.clone()
        } else {
            self.default_profile_id.clone()
        };

        let config = CoordinatorConfig::default()
            .with_max_id_attempts(max_id_attempts)
            .with_branch_events(self.emit_branch_events)
            .with_decision_events(self.emit_decision_events)
            .with_branch_diff(BranchDiffOptions {
                max_differences: self.max_branch_differences,
                confidence_gap_threshold,
            })
            .with_default_profile_id(default_profile_id);

        (config, issues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::validation::ConfigIssueCode;

    #[test]
    fn test_coordinator_config_deserialize() {
        let toml_str = r#"
[coordinator]
max_id_attempts = 5
emit_branch_events = false
confidence_gap_threshold = 0.25
"#;
        let config: super::super::FileConfig = toml::from_str(toml_str).unwrap();
        let (coordinator, issues) = config.coordinator.to_coordinator_config();

        assert!(issues.is_empty());
        assert_eq!(coordinator.max_id_attempts, 5);
        assert!(!coordinator.emit_branch_events);
        assert!(coordinator.emit_decision_events);
        assert_eq!(coordinator.branch_diff.confidence_gap_threshold, 0.25);
        assert_eq!(coordinator.branch_diff.max_differences, 3);
    }

    #[test]
    fn test_coordinator_config_falls_back_on_bad_values() {
        let config = FileCoordinatorConfig {
            max_id_attempts: 0,
            confidence_gap_threshold: 1.5,
            default_profile_id: "  ".to_string(),
            ..Default::default()
        };
        let (coordinator, issues) = config.to_coordinator_config();

        assert_eq!(issues.len(), 3);
        assert!(matches!(
            &issues[0].code,
            ConfigIssueCode::InvalidConstraint { field } if field == "coordinator.max_id_attempts"
        ));
        assert_eq!(coordinator.max_id_attempts, 3);
        assert_eq!(coordinator.branch_diff.confidence_gap_threshold, 0.1);
        assert_eq!(coordinator.default_profile_id, "default_user");
    }
}
