//! Data persistence and file operations

pub mod opportunities;
pub mod executions;
pub mod reports;

pub use opportunities::*;
pub use executions::*;
pub use reports::*;
