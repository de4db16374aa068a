//! Decision id generation port.

use arbiter_domain::DecisionId;

/// Source of fresh decision ids.
///
/// Ids only need to be unique with overwhelming probability; collisions are
/// detected and retried by the persister.
pub trait DecisionIdGenerator: Send + Sync {
    fn generate(&self) -> DecisionId;
}
