//! Decision log adapters
//!
//! - [`InMemoryDecisionLog`]: process-local, for tests and one-shot runs
//! - [`FileDecisionLog`]: one pretty-printed JSON file per decision

mod file;
mod memory;

pub use file::FileDecisionLog;
pub use memory::InMemoryDecisionLog;
