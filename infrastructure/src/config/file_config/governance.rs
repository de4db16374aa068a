//! Governance configuration from TOML (`[governance]` section)
//!
//! Drives the built-in rule-based governance adapters. A layer whose
//! settings are all empty is left unconfigured and has no opinion.

use crate::config::validation::{ConfigIssue, ConfigIssueCode};
use arbiter_domain::PreflightStatus;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Raw governance configuration from TOML
///
/// # Example
///
/// ```toml
/// [governance]
/// denied_playbooks = ["bulk_email"]
/// unavailable_playbooks = ["gpu_render"]
/// cost_budget = 50.0
///
/// [governance.costs]
/// video_render = 120.0
///
/// [[governance.preflight]]
/// playbook_code = "legal_review"
/// status = "reject"
/// reason = "jurisdiction unsupported"
/// alternatives = ["general_review"]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileGovernanceConfig {
    /// Playbooks the policy layer rejects
    pub denied_playbooks: Vec<String>,
    /// Playbooks the node layer reports as unavailable
    pub unavailable_playbooks: Vec<String>,
    /// Cost ceiling per decision; cost governance is off when unset
    pub cost_budget: Option<f64>,
    /// Estimated cost per playbook
    pub costs: BTreeMap<String, f64>,
    /// Cost assumed for playbooks missing from `costs`
    pub default_cost: f64,
    /// Preflight rules, first match per playbook wins
    pub preflight: Vec<FilePreflightRule>,
}

/// One preflight rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilePreflightRule {
    pub playbook_code: String,
    /// "accept", "reject" or "need_clarification"
    pub status: String,
    pub reason: Option<String>,
    pub alternatives: Vec<String>,
    pub questions: Vec<String>,
    /// Inputs that must be present in the request context
    pub required_inputs: Vec<String>,
}

impl Default for FilePreflightRule {
    fn default() -> Self {
        Self {
            playbook_code: String::new(),
            status: "accept".to_string(),
            reason: None,
            alternatives: Vec::new(),
            questions: Vec::new(),
            required_inputs: Vec::new(),
        }
    }
}

impl FilePreflightRule {
    /// Parse the status, returning a warning and `accept` on failure.
    pub fn parse_status(&self, index: usize) -> (PreflightStatus, Vec<ConfigIssue>) {
        match self.status.parse::<PreflightStatus>() {
            Ok(status) => (status, vec![]),
            Err(_) => {
                let field = format!("governance.preflight[{}].status", index);
                let issue = ConfigIssue::warning(
                    ConfigIssueCode::InvalidEnumValue {
                        field: field.clone(),
                        value: self.status.clone(),
                        valid_values: vec![
                            "accept".to_string(),
                            "reject".to_string(),
                            "need_clarification".to_string(),
                        ],
                    },
                    format!(
                        "{}: unknown value '{}', falling back to 'accept'",
                        field, self.status
                    ),
                );
                (PreflightStatus::Accept, vec![issue])
            }
        }
    }
}

impl FileGovernanceConfig {
    pub fn has_preflight(&self) -> bool {
        !self.preflight.is_empty()
    }

    pub fn has_policy(&self) -> bool {
        !self.denied_playbooks.is_empty()
    }

    pub fn has_node(&self) -> bool {
        !self.unavailable_playbooks.is_empty()
    }

    pub fn has_cost(&self) -> bool {
        self.cost_budget.is_some()
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if let Some(budget) = self.cost_budget
            && (budget < 0.0 || budget.is_nan())
        {
            issues.push(ConfigIssue::out_of_range(
                "governance.cost_budget",
                format!("governance.cost_budget {} must not be negative", budget),
            ));
        }

        for (code, cost) in &self.costs {
            if *cost < 0.0 || cost.is_nan() {
                issues.push(ConfigIssue::out_of_range(
                    format!("governance.costs.{}", code),
                    format!("governance.costs.{}: cost {} must not be negative", code, cost),
                ));
            }
        }

        for (index, rule) in self.preflight.iter().enumerate() {
            if rule.playbook_code.trim().is_empty() {
                issues.push(ConfigIssue::empty(
                    format!("governance.preflight[{}].playbook_code", index),
                    format!(
                        "governance.preflight[{}]: playbook_code is empty, rule is ignored",
                        index
                    ),
                ));
            }
            issues.extend(rule.parse_status(index).1);
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_governance_deserialize() {
        let toml_str = r#"
[governance]
denied_playbooks = ["bulk_email"]
cost_budget = 50.0

[governance.costs]
video_render = 120.0

[[governance.preflight]]
playbook_code = "legal_review"
status = "reject"
alternatives = ["general_review"]
"#;
        let config: super::super::FileConfig = toml::from_str(toml_str).unwrap();
        let governance = &config.governance;

        assert!(governance.has_policy());
        assert!(governance.has_cost());
        assert!(governance.has_preflight());
        assert!(!governance.has_node());
        assert_eq!(governance.costs.get("video_render"), Some(&120.0));
        assert_eq!(
            governance.preflight[0].parse_status(0).0,
            PreflightStatus::Reject
        );
        assert!(governance.validate().is_empty());
    }

    #[test]
    fn test_unknown_preflight_status_warns() {
        let config = FileGovernanceConfig {
            preflight: vec![FilePreflightRule {
                playbook_code: "x".to_string(),
                status: "maybe".to_string(),
                ..Default::default()
            }],
            cost_budget: Some(-1.0),
            ..Default::default()
        };
        let issues = config.validate();

        assert_eq!(issues.len(), 2);
        assert!(issues.iter().any(|i| matches!(
            &i.code,
            ConfigIssueCode::InvalidEnumValue { value, .. } if value == "maybe"
        )));
    }
}
