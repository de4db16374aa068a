//! Playbook preflight results

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Verdict of the playbook preflight check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreflightStatus {
    Accept,
    Reject,
    NeedClarification,
}

impl fmt::Display for PreflightStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreflightStatus::Accept => write!(f, "accept"),
            PreflightStatus::Reject => write!(f, "reject"),
            PreflightStatus::NeedClarification => write!(f, "need_clarification"),
        }
    }
}

impl std::str::FromStr for PreflightStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "accept" | "accepted" => Ok(PreflightStatus::Accept),
            "reject" | "rejected" => Ok(PreflightStatus::Reject),
            "need_clarification" | "clarify" => Ok(PreflightStatus::NeedClarification),
            _ => Err(DomainError::unknown("preflight status", s)),
        }
    }
}

/// Result of validating a playbook before execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybookPreflightResult {
    pub playbook_code: String,
    pub status: PreflightStatus,
    pub accepted: bool,
    #[serde(default)]
    pub missing_inputs: Vec<String>,
    #[serde(default)]
    pub clarification_questions: Vec<String>,
    #[serde(default)]
    pub rejection_reason: Option<String>,
    /// Substitute playbooks, most preferred first
    #[serde(default)]
    pub recommended_alternatives: Vec<String>,
    /// Multi-step workflow suggested instead of a single playbook
    #[serde(default)]
    pub recommended_orchestration: Option<Vec<String>>,
}

impl PlaybookPreflightResult {
    fn with_status(playbook_code: impl Into<String>, status: PreflightStatus) -> Self {
        Self {
            playbook_code: playbook_code.into(),
            status,
            accepted: status == PreflightStatus::Accept,
            missing_inputs: Vec::new(),
            clarification_questions: Vec::new(),
            rejection_reason: None,
            recommended_alternatives: Vec::new(),
            recommended_orchestration: None,
        }
    }

    pub fn accept(playbook_code: impl Into<String>) -> Self {
        Self::with_status(playbook_code, PreflightStatus::Accept)
    }

    pub fn reject(playbook_code: impl Into<String>, reason: impl Into<String>) -> Self {
        let mut result = Self::with_status(playbook_code, PreflightStatus::Reject);
        result.rejection_reason = Some(reason.into());
        result
    }

    pub fn need_clarification<I, S>(playbook_code: impl Into<String>, questions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut result = Self::with_status(playbook_code, PreflightStatus::NeedClarification);
        result.clarification_questions = questions.into_iter().map(Into::into).collect();
        result
    }

    pub fn with_alternatives<I, S>(mut self, alternatives: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.recommended_alternatives = alternatives.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_missing_inputs<I, S>(mut self, inputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.missing_inputs = inputs.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_rejected(&self) -> bool {
        self.status == PreflightStatus::Reject
    }

    pub fn needs_clarification(&self) -> bool {
        self.status == PreflightStatus::NeedClarification
    }

    pub fn first_alternative(&self) -> Option<&str> {
        self.recommended_alternatives.first().map(String::as_str)
    }
}
