//! Rule-based governance adapters
//!
//! Small, config-driven implementations of the governance ports so the
//! binary can make real decisions without any external service. Each one is
//! built from a section of [`FileConfig`](crate::config::FileConfig).
//!
//! | Adapter | Port | Config |
//! |---------|------|--------|
//! | [`KeywordIntentPipeline`] | `IntentPipeline` | `[[intent.routes]]` |
//! | [`RulePreflight`] | `PlaybookPreflight` | `[[governance.preflight]]` |
//! | [`AvailabilityNodeGovernance`] | `NodeGovernance` | `governance.unavailable_playbooks` |
//! | [`BudgetCostGovernance`] | `CostGovernance` | `governance.cost_budget`, `[governance.costs]` |
//! | [`DenylistPolicy`] | `PolicyService` | `governance.denied_playbooks` |

mod intent;
mod preflight;
mod rules;

pub use intent::KeywordIntentPipeline;
pub use preflight::RulePreflight;
pub use rules::{AvailabilityNodeGovernance, BudgetCostGovernance, DenylistPolicy};

use arbiter_domain::DecisionContext;

/// Inputs from `required` that the request context does not provide
pub(crate) fn missing_from_context(required: &[String], context: &DecisionContext) -> Vec<String> {
    required
        .iter()
        .filter(|input| {
            context
                .get(input.as_str())
                .is_none_or(|value| value.is_null() || value.as_str() == Some(""))
        })
        .cloned()
        .collect()
}
