//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod decision_log;
pub mod event_store;
pub mod governance;
pub mod id_generator;
