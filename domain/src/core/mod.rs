//! Core domain concepts shared across all subdomains.
//!
//! - [`id::DecisionId`] - identifier shared by a decision and its log entry
//! - [`error::DomainError`] - domain-level errors
//! - [`string::truncate`] - display helpers

pub mod error;
pub mod id;
pub mod string;
