//! Downstream event projections
//!
//! A persisted decision is projected into at most two events:
//!
//! - [`BranchProposed`] when the intent layer saw more than one viable
//!   playbook, so a client can offer branch exploration;
//! - [`DecisionRequired`] when a human has to act before execution.
//!
//! Projections are pure; appending them to a store is the application's job.

use super::conflict::{Conflict, ResolutionStrategy};
use super::result::UnifiedDecisionResult;
use crate::core::id::{DecisionId, current_timestamp};
use crate::playbook::PlaybookCandidate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which card a client should render for a pending decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardType {
    /// The user must supply missing inputs
    Input,
    /// The user must answer questions or review conflicts
    Review,
    /// The user must confirm the decision
    Decision,
}

impl fmt::Display for CardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CardType::Input => write!(f, "input"),
            CardType::Review => write!(f, "review"),
            CardType::Decision => write!(f, "decision"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionPriority {
    High,
    Blocker,
    Normal,
}

impl fmt::Display for DecisionPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecisionPriority::High => write!(f, "high"),
            DecisionPriority::Blocker => write!(f, "blocker"),
            DecisionPriority::Normal => write!(f, "normal"),
        }
    }
}

/// One explorable branch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchOption {
    pub playbook_code: String,
    pub confidence: f64,
    pub rationale: String,
    pub required_inputs: Vec<String>,
    /// Human-readable differences against the other branches
    pub differences: Vec<String>,
}

/// Payload of the branch-proposed event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchProposed {
    pub decision_id: DecisionId,
    pub branches: Vec<BranchOption>,
    pub recommended_branch: Option<String>,
}

/// Payload of the decision-required event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRequired {
    pub decision_id: DecisionId,
    pub title: String,
    pub selected_playbook_code: Option<String>,
    pub card_type: CardType,
    pub priority: DecisionPriority,
    pub missing_inputs: Vec<String>,
    pub clarification_questions: Vec<String>,
    pub conflicts: Vec<Conflict>,
    pub resolution_strategy: Option<ResolutionStrategy>,
}

/// A projected event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type", content = "payload", rename_all = "snake_case")]
pub enum DecisionEvent {
    BranchProposed(BranchProposed),
    DecisionRequired(DecisionRequired),
}

impl DecisionEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            DecisionEvent::BranchProposed(_) => "branch_proposed",
            DecisionEvent::DecisionRequired(_) => "decision_required",
        }
    }

    pub fn decision_id(&self) -> &DecisionId {
        match self {
            DecisionEvent::BranchProposed(e) => &e.decision_id,
            DecisionEvent::DecisionRequired(e) => &e.decision_id,
        }
    }
}

/// An event with its routing metadata, as appended to an event store.
///
/// `event_id` is derived from the decision id and event type, so appending
/// the same projection twice is detectable downstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub event_id: String,
    pub workspace_id: String,
    pub project_id: Option<String>,
    pub profile_id: Option<String>,
    /// Milliseconds since epoch
    pub occurred_at: u64,
    #[serde(flatten)]
    pub event: DecisionEvent,
}

impl EventEnvelope {
    pub fn for_decision(result: &UnifiedDecisionResult, event: DecisionEvent) -> Self {
        let intent = &result.intent_contribution;
        Self {
            event_id: format!("{}:{}", result.decision_id, event.event_type()),
            workspace_id: intent.workspace_id.clone(),
            project_id: intent.project_id.clone(),
            profile_id: intent.profile_id.clone(),
            occurred_at: current_timestamp(),
            event,
        }
    }
}

/// Tuning for branch difference computation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BranchDiffOptions {
    /// Maximum differences listed per branch
    pub max_differences: usize,
    /// Confidence gaps above this are reported
    pub confidence_gap_threshold: f64,
}

impl Default for BranchDiffOptions {
    fn default() -> Self {
        Self {
            max_differences: 3,
            confidence_gap_threshold: 0.1,
        }
    }
}

/// Project the branch-proposed event; `None` when there are no alternatives
pub fn project_branch_proposed(
    result: &UnifiedDecisionResult,
    options: &BranchDiffOptions,
) -> Option<BranchProposed> {
    let intent = &result.intent_contribution;
    if intent.alternatives.is_empty() {
        return None;
    }

    let branches = intent
        .alternatives
        .iter()
        .enumerate()
        .map(|(index, alternative)| BranchOption {
            playbook_code: alternative.playbook_code.clone(),
            confidence: alternative.confidence,
            rationale: alternative.rationale.clone(),
            required_inputs: alternative.required_inputs.clone(),
            differences: branch_differences(index, &intent.alternatives, options),
        })
        .collect();

    let recommended_branch = intent
        .recommended_playbook_code()
        .map(str::to_string)
        .or_else(|| intent.best_alternative().map(|c| c.playbook_code.clone()));

    Some(BranchProposed {
        decision_id: result.decision_id.clone(),
        branches,
        recommended_branch,
    })
}

fn branch_differences(
    index: usize,
    alternatives: &[PlaybookCandidate],
    options: &BranchDiffOptions,
) -> Vec<String> {
    let current = &alternatives[index];
    let mut differences = Vec::new();

    for (_, other) in alternatives.iter().enumerate().filter(|(i, _)| *i != index) {
        if current.playbook_code != other.playbook_code {
            differences.push(format!(
                "Runs '{}' instead of '{}'",
                current.playbook_code, other.playbook_code
            ));
        }

        if (current.confidence - other.confidence).abs() > options.confidence_gap_threshold {
            differences.push(format!(
                "Confidence {:.2} vs {:.2} for '{}'",
                current.confidence, other.confidence, other.playbook_code
            ));
        }

        let extra: Vec<&str> = current
            .required_inputs
            .iter()
            .filter(|input| !other.required_inputs.contains(input))
            .map(String::as_str)
            .collect();
        let fewer: Vec<&str> = other
            .required_inputs
            .iter()
            .filter(|input| !current.required_inputs.contains(input))
            .map(String::as_str)
            .collect();
        if !extra.is_empty() || !fewer.is_empty() {
            differences.push(describe_input_difference(&extra, &fewer, &other.playbook_code));
        }

        if differences.len() >= options.max_differences {
            break;
        }
    }

    differences.truncate(options.max_differences);
    differences
}

fn describe_input_difference(extra: &[&str], fewer: &[&str], other: &str) -> String {
    match (extra.is_empty(), fewer.is_empty()) {
        (false, true) => format!("Also needs {} compared to '{}'", extra.join(", "), other),
        (true, false) => format!("Does not need {} unlike '{}'", fewer.join(", "), other),
        _ => format!(
            "Needs {} instead of {} compared to '{}'",
            extra.join(", "),
            fewer.join(", "),
            other
        ),
    }
}

/// Project the decision-required event; `None` unless approval is required
pub fn project_decision_required(result: &UnifiedDecisionResult) -> Option<DecisionRequired> {
    if !result.requires_user_approval {
        return None;
    }

    let missing_inputs = result.missing_inputs();
    let clarification_questions = result.clarification_questions().to_vec();

    let card_type = if !missing_inputs.is_empty() {
        CardType::Input
    } else if !clarification_questions.is_empty() || result.has_conflicts() {
        CardType::Review
    } else {
        CardType::Decision
    };

    let priority = if result.has_conflicts() {
        DecisionPriority::High
    } else if result.requires_user_approval {
        DecisionPriority::Blocker
    } else {
        DecisionPriority::Normal
    };

    let title = match (&result.selected_playbook_code, card_type) {
        (_, CardType::Input) => "Additional input needed".to_string(),
        (Some(code), _) => format!("Confirm playbook '{}'", code),
        (None, _) => "Clarify the request".to_string(),
    };

    Some(DecisionRequired {
        decision_id: result.decision_id.clone(),
        title,
        selected_playbook_code: result.selected_playbook_code.clone(),
        card_type,
        priority,
        missing_inputs,
        clarification_questions,
        conflicts: result.conflicts.clone(),
        resolution_strategy: result.resolution_strategy,
    })
}
