//! UUID-based decision id generation.

use arbiter_application::ports::id_generator::DecisionIdGenerator;
use arbiter_domain::DecisionId;
use uuid::Uuid;

/// Random (v4) UUIDs in hyphenated lowercase form
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidDecisionIdGenerator;

impl UuidDecisionIdGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl DecisionIdGenerator for UuidDecisionIdGenerator {
    fn generate(&self) -> DecisionId {
        Uuid::new_v4().into()
    }
}
