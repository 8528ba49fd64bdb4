//! Core data types and structures

pub mod quotes;
pub mod opportunity;
pub mod profit;
pub mod execution;
pub mod safety;

pub use quotes::*;
pub use opportunity::*;
pub use profit::*;
pub use execution::*;
pub use safety::*;
