//! Session orchestration module.

mod orchestrator;
mod stats;

pub use orchestrator::{RunMode, Session, SessionConfig};
pub use stats::SessionStats;
