//! Bot orchestration and session statistics

pub mod stats;
pub mod orchestrator;

pub use stats::*;
pub use orchestrator::*;
