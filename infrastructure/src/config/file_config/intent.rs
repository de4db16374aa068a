//! Intent routing configuration from TOML (`[intent]` section)

use crate::config::validation::ConfigIssue;
use serde::{Deserialize, Serialize};

/// Keyword routes for the built-in intent pipeline
///
/// # Example
///
/// ```toml
/// [[intent.routes]]
/// keywords = ["blog", "article"]
/// playbook_code = "content_drafting"
/// confidence = 0.85
/// task_domain = "content"
/// required_inputs = ["topic"]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileIntentConfig {
    pub routes: Vec<FileIntentRoute>,
}

/// One keyword route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileIntentRoute {
    /// Case-insensitive substrings; any match selects the route
    pub keywords: Vec<String>,
    pub playbook_code: String,
    pub confidence: f64,
    pub task_domain: Option<String>,
    /// Inputs the playbook needs; checked against the request context keys
    pub required_inputs: Vec<String>,
    /// Steps of a multi-playbook workflow, empty for a single playbook
    pub workflow_steps: Vec<String>,
}

impl Default for FileIntentRoute {
    fn default() -> Self {
        Self {
            keywords: Vec::new(),
            playbook_code: String::new(),
            confidence: 0.8,
            task_domain: None,
            required_inputs: Vec::new(),
            workflow_steps: Vec::new(),
        }
    }
}

impl FileIntentConfig {
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        for (index, route) in self.routes.iter().enumerate() {
            let field = format!("intent.routes[{}]", index);

            if route.playbook_code.trim().is_empty() {
                issues.push(ConfigIssue::empty(
                    format!("{}.playbook_code", field),
                    format!("{}: playbook_code is empty, route is ignored", field),
                ));
            }
            if route.keywords.iter().all(|k| k.trim().is_empty()) {
                issues.push(ConfigIssue::empty(
                    format!("{}.keywords", field),
                    format!("{}: no keywords, route never matches", field),
                ));
            }
            if !(0.0..=1.0).contains(&route.confidence) {
                issues.push(ConfigIssue::out_of_range(
                    format!("{}.confidence", field),
                    format!(
                        "{}: confidence {} is outside [0, 1] and will be clamped",
                        field, route.confidence
                    ),
                ));
            }
        }

        issues
    }
}
