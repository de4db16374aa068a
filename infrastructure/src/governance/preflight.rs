//! Rule-table playbook preflight.

use super::missing_from_context;
use crate::config::FileGovernanceConfig;
use arbiter_application::ports::governance::{GovernanceError, PlaybookPreflight};
use arbiter_domain::{
    DecisionContext, IntentRoutingDecision, PlaybookPreflightResult, PreflightStatus,
};
use async_trait::async_trait;

#[derive(Debug, Clone)]
struct PreflightRule {
    playbook_code: String,
    status: PreflightStatus,
    reason: Option<String>,
    alternatives: Vec<String>,
    questions: Vec<String>,
    required_inputs: Vec<String>,
}

/// Preflight driven by `[[governance.preflight]]` rules.
///
/// The first rule for a playbook decides. Playbooks without a rule are
/// accepted unless their required inputs are missing.
pub struct RulePreflight {
    rules: Vec<PreflightRule>,
}

impl RulePreflight {
    pub fn from_config(config: &FileGovernanceConfig) -> Self {
        let rules = config
            .preflight
            .iter()
            .enumerate()
            .filter(|(_, rule)| !rule.playbook_code.trim().is_empty())
            .map(|(index, rule)| PreflightRule {
                playbook_code: rule.playbook_code.clone(),
                // Unknown statuses are reported by FileConfig::validate
                status: rule.parse_status(index).0,
                reason: rule.reason.clone(),
                alternatives: rule.alternatives.clone(),
                questions: rule.questions.clone(),
                required_inputs: rule.required_inputs.clone(),
            })
            .collect();
        Self { rules }
    }

    fn clarify_missing(playbook_code: &str, missing: Vec<String>) -> PlaybookPreflightResult {
        let questions: Vec<String> = missing
            .iter()
            .map(|input| format!("Please provide '{}'", input))
            .collect();
        PlaybookPreflightResult::need_clarification(playbook_code, questions)
            .with_missing_inputs(missing)
    }
}

#[async_trait]
impl PlaybookPreflight for RulePreflight {
    async fn preflight(
        &self,
        playbook_code: &str,
        intent_decision: &IntentRoutingDecision,
        context: &DecisionContext,
    ) -> Result<PlaybookPreflightResult, GovernanceError> {
        let Some(rule) = self.rules.iter().find(|r| r.playbook_code == playbook_code) else {
            let missing = missing_from_context(&intent_decision.required_inputs, context);
            return Ok(if missing.is_empty() {
                PlaybookPreflightResult::accept(playbook_code)
            } else {
                Self::clarify_missing(playbook_code, missing)
            });
        };

        let missing = missing_from_context(&rule.required_inputs, context);

        let result = match rule.status {
            PreflightStatus::Reject => PlaybookPreflightResult::reject(
                playbook_code,
                rule.reason
                    .clone()
                    .unwrap_or_else(|| "Rejected by preflight rule".to_string()),
            )
            .with_alternatives(rule.alternatives.iter().cloned()),
            PreflightStatus::NeedClarification => {
                PlaybookPreflightResult::need_clarification(playbook_code, rule.questions.clone())
                    .with_missing_inputs(missing)
            }
            PreflightStatus::Accept if !missing.is_empty() => {
                Self::clarify_missing(playbook_code, missing)
            }
            PreflightStatus::Accept => PlaybookPreflightResult::accept(playbook_code),
        };

        Ok(result)
    }
}
