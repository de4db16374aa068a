//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Invalid playbook code: {0}")]
    InvalidPlaybookCode(String),

    #[error("Invalid decision id: {0}")]
    InvalidDecisionId(String),

    #[error("Unknown {kind} value: {value}")]
    UnknownVariant { kind: &'static str, value: String },

    #[error("Malformed contribution '{layer}': {reason}")]
    MalformedContribution { layer: String, reason: String },
}

impl DomainError {
    pub(crate) fn unknown(kind: &'static str, value: impl Into<String>) -> Self {
        DomainError::UnknownVariant {
            kind,
            value: value.into(),
        }
    }
}
