//! Console output formatter for decisions

use arbiter_application::{DecisionOutput, EmissionStatus, ReplayReport};
use arbiter_domain::core::string::truncate;
use arbiter_domain::{DecisionLogEntry, ExecutionProfile, UnifiedDecisionResult};
use colored::Colorize;
use serde::Serialize;

/// Formats decisions for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Concise view of a fresh decision
    pub fn format_summary(output: &DecisionOutput) -> String {
        let mut text = Self::decision_summary(&output.result);

        if output.attempts_exhausted {
            text.push_str(&format!(
                "{}\n",
                format!(
                    "warning: no free id after {} attempts; stored under the last generated id",
                    output.id_attempts
                )
                .yellow()
            ));
        }
        text
    }

    /// Every layer, conflict and emitted event
    pub fn format_full(output: &DecisionOutput) -> String {
        let result = &output.result;
        let mut text = String::new();

        text.push_str(&Self::header("Unified Decision"));
        text.push('\n');
        text.push_str(&Self::decision_summary(result));

        text.push_str(&Self::section_header("Layers"));
        text.push_str(&Self::layers(result));

        if result.has_conflicts() {
            text.push_str(&Self::section_header("Conflicts"));
            for conflict in &result.conflicts {
                text.push_str(&format!(
                    "  {} {} ({})\n",
                    "*".red(),
                    conflict.description,
                    conflict.layers.join(", ")
                ));
            }
            if let Some(resolution) = result.resolution_strategy {
                text.push_str(&format!("  {} {}\n", "Resolution:".cyan(), resolution));
            }
        }

        text.push_str(&Self::section_header("Persistence & Events"));
        text.push_str(&format!(
            "  {} {}\n",
            "Id attempts:".cyan(),
            output.id_attempts
        ));
        text.push_str(&format!(
            "  {} {}\n",
            "branch_proposed:".cyan(),
            Self::emission(&output.events.branch_proposed)
        ));
        text.push_str(&format!(
            "  {} {}\n",
            "decision_required:".cyan(),
            Self::emission(&output.events.decision_required)
        ));

        text.push_str(&Self::footer());
        text
    }

    /// A stored log entry
    pub fn format_entry(entry: &DecisionLogEntry) -> String {
        let mut text = String::new();

        text.push_str(&Self::header("Stored Decision"));
        text.push('\n');
        text.push_str(&format!(
            "{} {}\n",
            "Input:".cyan().bold(),
            truncate(&entry.raw_input, 200)
        ));
        text.push_str(&format!(
            "{} {}{}\n",
            "Workspace:".cyan().bold(),
            entry.workspace_id,
            entry
                .project_id
                .as_deref()
                .map(|p| format!(" / {}", p))
                .unwrap_or_default()
        ));
        if let Some(user) = &entry.user_id {
            text.push_str(&format!("{} {}\n", "User:".cyan().bold(), user));
        }
        text.push_str(&format!(
            "{} {} (id attempts: {})\n",
            "Strategy:".cyan().bold(),
            entry.metadata.strategy,
            entry.metadata.id_attempts
        ));

        match entry.stored_result() {
            Ok(result) => {
                text.push('\n');
                text.push_str(&Self::decision_summary(&result));
                text.push_str(&Self::section_header("Layers"));
                text.push_str(&Self::layers(&result));
            }
            Err(e) => {
                text.push_str(&format!("{} {}\n", "Unreadable decision:".red().bold(), e));
            }
        }

        text.push_str(&Self::footer());
        text
    }

    /// Stored vs. replayed comparison
    pub fn format_replay(report: &ReplayReport) -> String {
        let mut text = String::new();

        text.push_str(&format!(
            "{} {}\n",
            "Replay of".cyan().bold(),
            report.decision_id
        ));

        if report.matches() {
            text.push_str(&format!(
                "{} replayed decision matches the stored one\n",
                "MATCH".green().bold()
            ));
        } else {
            text.push_str(&format!(
                "{} {} difference(s)\n",
                "DIFFERS".yellow().bold(),
                report.differences.len()
            ));
            for difference in &report.differences {
                text.push_str(&format!("  * {}\n", difference));
            }
        }

        if !report.unknown_layers.is_empty() {
            text.push_str(&format!(
                "{} {}\n",
                "Ignored layers:".dimmed(),
                report.unknown_layers.join(", ")
            ));
        }
        text
    }

    /// Format any serializable value as pretty JSON
    pub fn format_json<T: Serialize>(value: &T) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
    }

    fn decision_summary(result: &UnifiedDecisionResult) -> String {
        let mut text = String::new();

        text.push_str(&format!(
            "{} {}\n",
            "Decision:".cyan().bold(),
            result.decision_id
        ));

        let playbook = match (&result.selected_playbook_code, result.is_blocked()) {
            (Some(code), _) => code.green().bold().to_string(),
            (None, true) => "blocked".red().bold().to_string(),
            (None, false) => "none".yellow().to_string(),
        };
        text.push_str(&format!("{} {}\n", "Playbook:".cyan().bold(), playbook));
        text.push_str(&format!(
            "{} {}\n",
            "Strategy:".cyan().bold(),
            result.strategy
        ));
        text.push_str(&format!(
            "{} {}\n",
            "Profile:".cyan().bold(),
            Self::profile(&result.execution_profile)
        ));

        let verdict = if result.can_auto_execute {
            "auto-execute".green().bold()
        } else if result.requires_user_approval {
            "approval required".yellow().bold()
        } else {
            "not executable".red().bold()
        };
        text.push_str(&format!("{} {}\n", "Status:".cyan().bold(), verdict));

        let missing = result.missing_inputs();
        if !missing.is_empty() {
            text.push_str(&format!(
                "{} {}\n",
                "Missing inputs:".yellow(),
                missing.join(", ")
            ));
        }
        for question in result.clarification_questions() {
            text.push_str(&format!("  {} {}\n", "?".yellow().bold(), question));
        }

        text
    }

    fn profile(profile: &ExecutionProfile) -> String {
        let mut parts = vec![
            profile.execution_mode().to_string(),
            format!("side effects {}", profile.side_effect_level()),
        ];
        if profile.supports_resume() {
            parts.push("resumable".to_string());
        }
        if profile.requires_human_approval() {
            parts.push("human approval".to_string());
        }
        if !profile.required_capabilities().is_empty() {
            parts.push(format!(
                "steps: {}",
                profile.required_capabilities().join(" -> ")
            ));
        }
        parts.join(", ")
    }

    fn layers(result: &UnifiedDecisionResult) -> String {
        let intent = &result.intent_contribution;
        let mut text = format!(
            "  {:<16} {} (confidence {:.2}, {})\n",
            "intent",
            intent.recommended_playbook_code().unwrap_or("-"),
            intent.confidence,
            intent.decision_method
        );

        let verdict = |approved: bool, reason: &Option<String>| {
            let mark = if approved {
                "approved".green().to_string()
            } else {
                "rejected".red().to_string()
            };
            match reason {
                Some(reason) => format!("{} ({})", mark, reason),
                None => mark,
            }
        };
        let absent = || "no opinion".dimmed().to_string();

        let preflight = result
            .playbook_contribution
            .as_ref()
            .map(|p| match &p.rejection_reason {
                Some(reason) => format!("{} ({})", p.status, reason),
                None => p.status.to_string(),
            })
            .unwrap_or_else(absent);
        let node = result
            .node_governance_contribution
            .as_ref()
            .map(|d| verdict(d.approved, &d.reason))
            .unwrap_or_else(absent);
        let cost = result
            .cost_governance_contribution
            .as_ref()
            .map(|d| verdict(d.approved, &d.reason))
            .unwrap_or_else(absent);
        let memory = result
            .memory_contribution
            .as_ref()
            .map(|m| {
                format!(
                    "{} (confidence {:.2})",
                    m.recommended_playbook_code.as_deref().unwrap_or("-"),
                    m.confidence
                )
            })
            .unwrap_or_else(absent);
        let policy = result
            .policy_contribution
            .as_ref()
            .map(|d| verdict(d.approved, &d.reason))
            .unwrap_or_else(absent);

        for (layer, line) in [
            ("playbook", preflight),
            ("node_governance", node),
            ("cost_governance", cost),
            ("memory", memory),
            ("policy", policy),
        ] {
            text.push_str(&format!("  {:<16} {}\n", layer, line));
        }

        if !intent.alternatives.is_empty() {
            let alternatives: Vec<String> = intent
                .alternatives
                .iter()
                .map(|a| format!("{} ({:.2})", a.playbook_code, a.confidence))
                .collect();
            text.push_str(&format!(
                "  {:<16} {}\n",
                "alternatives",
                alternatives.join(", ")
            ));
        }

        text
    }

    fn emission(status: &EmissionStatus) -> String {
        match status {
            EmissionStatus::Emitted => "emitted".green().to_string(),
            EmissionStatus::Skipped => "skipped".dimmed().to_string(),
            EmissionStatus::Failed(e) => format!("{} ({})", "failed".red(), e),
        }
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }
}
