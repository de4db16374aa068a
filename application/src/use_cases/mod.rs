//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod emit_events;
pub mod make_decision;
pub mod persist_decision;
pub mod replay_decision;

#[cfg(test)]
pub(crate) mod test_support;
