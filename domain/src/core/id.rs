//! Decision identifiers

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier of a synthesized decision.
///
/// The same id keys the intent routing decision, the unified result and the
/// decision log entry. It is opaque: any non-empty string is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DecisionId(String);

impl DecisionId {
    /// Create a decision id, rejecting empty or whitespace-only values
    pub fn new(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(DomainError::InvalidDecisionId(id));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for DecisionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for DecisionId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl From<uuid::Uuid> for DecisionId {
    fn from(uuid: uuid::Uuid) -> Self {
        Self(uuid.hyphenated().to_string())
    }
}

impl AsRef<str> for DecisionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Current timestamp in milliseconds since the Unix epoch
pub fn current_timestamp() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_id_rejects_blank() {
        assert!(DecisionId::new("").is_err());
        assert!(DecisionId::new("   ").is_err());
        assert!(DecisionId::new("dec-1").is_ok());
    }

    #[test]
    fn test_decision_id_serializes_as_plain_string() {
        let id = DecisionId::new("dec-42").unwrap();
        assert_eq!(serde_json::to_value(&id).unwrap(), serde_json::json!("dec-42"));
        assert_eq!(id.to_string(), "dec-42");
    }
}
