//! Keyword intent routing.

use super::missing_from_context;
use crate::config::{FileIntentConfig, FileIntentRoute};
use arbiter_application::ports::governance::{GovernanceError, IntentPipeline};
use arbiter_domain::{DecisionContext, DecisionMethod, IntentAnalysisResult, PlaybookCandidate};
use async_trait::async_trait;
use tracing::debug;

/// Routes requests by case-insensitive keyword matches.
///
/// The route with the most keyword hits wins, ties broken by confidence and
/// then by declaration order. Other matching routes become alternatives.
pub struct KeywordIntentPipeline {
    routes: Vec<FileIntentRoute>,
}

impl KeywordIntentPipeline {
    pub fn new(routes: Vec<FileIntentRoute>) -> Self {
        let routes = routes
            .into_iter()
            .filter(|r| !r.playbook_code.trim().is_empty())
            .collect();
        Self { routes }
    }

    pub fn from_config(config: &FileIntentConfig) -> Self {
        Self::new(config.routes.clone())
    }

    fn hits(route: &FileIntentRoute, input: &str) -> usize {
        route
            .keywords
            .iter()
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty() && input.contains(k.as_str()))
            .count()
    }
}

#[async_trait]
impl IntentPipeline for KeywordIntentPipeline {
    async fn analyze(
        &self,
        user_input: &str,
        _profile_id: &str,
        _workspace_id: &str,
        _project_id: Option<&str>,
        context: &DecisionContext,
    ) -> Result<IntentAnalysisResult, GovernanceError> {
        let input = user_input.to_lowercase();

        let mut matches: Vec<(usize, &FileIntentRoute)> = self
            .routes
            .iter()
            .map(|route| (Self::hits(route, &input), route))
            .filter(|(hits, _)| *hits > 0)
            .collect();
        // Stable sort keeps declaration order among equals
        matches.sort_by(|(a_hits, a), (b_hits, b)| {
            b_hits
                .cmp(a_hits)
                .then(b.confidence.total_cmp(&a.confidence))
        });

        let Some((_, selected)) = matches.first() else {
            debug!("No intent route matched");
            return Ok(IntentAnalysisResult {
                method: DecisionMethod::RuleBased,
                ..Default::default()
            });
        };

        let alternatives = matches
            .iter()
            .skip(1)
            .map(|(_, route)| {
                PlaybookCandidate::new(route.playbook_code.clone(), route.confidence)
                    .with_rationale(format!("Matched keywords of '{}'", route.playbook_code))
                    .with_required_inputs(route.required_inputs.iter().cloned())
                    .with_missing_inputs(missing_from_context(&route.required_inputs, context))
                    .with_orchestration_steps(route.workflow_steps.iter().cloned())
            })
            .collect();

        debug!(
            "Intent route '{}' matched ({} alternative(s))",
            selected.playbook_code,
            matches.len() - 1
        );

        Ok(IntentAnalysisResult {
            selected_playbook_code: Some(selected.playbook_code.clone()),
            confidence: selected.confidence,
            task_domain: selected.task_domain.clone(),
            workflow_steps: selected.workflow_steps.clone(),
            alternatives,
            required_inputs: selected.required_inputs.clone(),
            missing_inputs: missing_from_context(&selected.required_inputs, context),
            method: DecisionMethod::RuleBased,
        })
    }
}
