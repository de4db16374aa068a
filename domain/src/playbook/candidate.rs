//! Playbook candidates
//!
//! A [`PlaybookCandidate`] is one possible course of action proposed by a
//! governance layer. Candidates are immutable once built.

use serde::{Deserialize, Deserializer, Serialize};

/// One possible course of action for a user request
///
/// # Example
///
/// ```
/// use arbiter_domain::PlaybookCandidate;
///
/// let candidate = PlaybookCandidate::new("draft_report", 1.4)
///     .with_rationale("matched report keywords")
///     .with_required_inputs(["topic"]);
///
/// assert_eq!(candidate.confidence, 1.0); // clamped
/// assert!(!candidate.is_orchestration);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybookCandidate {
    /// Playbook identifier (e.g., "draft_report")
    pub playbook_code: String,
    /// Confidence level (0.0 to 1.0)
    #[serde(deserialize_with = "deserialize_confidence")]
    pub confidence: f64,
    /// Why this playbook was proposed
    #[serde(default)]
    pub rationale: String,
    /// Inputs the playbook needs to run
    #[serde(default)]
    pub required_inputs: Vec<String>,
    /// Required inputs not yet available
    #[serde(default)]
    pub missing_inputs: Vec<String>,
    /// Whether this candidate is a multi-step workflow
    #[serde(default)]
    pub is_orchestration: bool,
    /// Playbook codes of the workflow steps, in order
    #[serde(default)]
    pub orchestration_steps: Vec<String>,
}

impl PlaybookCandidate {
    pub fn new(playbook_code: impl Into<String>, confidence: f64) -> Self {
        Self {
            playbook_code: playbook_code.into(),
            confidence: clamp_confidence(confidence),
            rationale: String::new(),
            required_inputs: Vec::new(),
            missing_inputs: Vec::new(),
            is_orchestration: false,
            orchestration_steps: Vec::new(),
        }
    }

    pub fn with_rationale(mut self, rationale: impl Into<String>) -> Self {
        self.rationale = rationale.into();
        self
    }

    pub fn with_required_inputs<I, S>(mut self, inputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_inputs = inputs.into_iter().map(Into::into).collect();
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

    /// Mark this candidate as a multi-step workflow.
    ///
    /// An empty step list leaves the candidate a single playbook.
    pub fn with_orchestration_steps<I, S>(mut self, steps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.orchestration_steps = steps.into_iter().map(Into::into).collect();
        self.is_orchestration = !self.orchestration_steps.is_empty();
        self
    }

    /// Same candidate with its confidence forced back into `[0, 1]`
    pub(crate) fn clamped(mut self) -> Self {
        self.confidence = clamp_confidence(self.confidence);
        self
    }
}

/// Clamp a confidence into `[0, 1]`; NaN becomes 0.
pub(crate) fn clamp_confidence(confidence: f64) -> f64 {
    if confidence.is_nan() {
        0.0
    } else {
        confidence.clamp(0.0, 1.0)
    }
}

/// Read a confidence and clamp it.
///
/// JSON has no NaN; serde_json writes it as `null`, which reads back as 0.
pub(crate) fn deserialize_confidence<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.map_or(0.0, clamp_confidence))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_is_clamped() {
        assert_eq!(PlaybookCandidate::new("a", -0.5).confidence, 0.0);
        assert_eq!(PlaybookCandidate::new("a", 2.0).confidence, 1.0);
        assert_eq!(PlaybookCandidate::new("a", f64::NAN).confidence, 0.0);
        assert_eq!(PlaybookCandidate::new("a", 0.42).confidence, 0.42);
    }

    #[test]
    fn test_orchestration_steps_set_flag() {
        let candidate =
            PlaybookCandidate::new("launch", 0.8).with_orchestration_steps(["draft", "publish"]);
        assert!(candidate.is_orchestration);
        assert_eq!(candidate.orchestration_steps, vec!["draft", "publish"]);

        let single = PlaybookCandidate::new("launch", 0.8).with_orchestration_steps(Vec::<String>::new());
        assert!(!single.is_orchestration);
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let candidate: PlaybookCandidate =
            serde_json::from_str(r#"{"playbook_code":"x","confidence":0.5}"#).unwrap();
        assert!(candidate.required_inputs.is_empty());
        assert!(!candidate.is_orchestration);
    }

    #[test]
    fn test_deserialize_clamps_confidence() {
        let high: PlaybookCandidate =
            serde_json::from_str(r#"{"playbook_code":"x","confidence":7.5}"#).unwrap();
        assert_eq!(high.confidence, 1.0);

        let stored_nan: PlaybookCandidate =
            serde_json::from_str(r#"{"playbook_code":"x","confidence":null}"#).unwrap();
        assert_eq!(stored_nan.confidence, 0.0);
    }
}
