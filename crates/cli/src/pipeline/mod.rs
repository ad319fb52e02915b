//! Run orchestration module.

mod orchestrator;
mod stats;

pub use orchestrator::{NotifyConfig, NotifyRun};
pub use stats::RunStats;
