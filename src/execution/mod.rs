//! Trade settlement: route encoding and contract submission

pub mod settlement;
pub mod path;
pub mod contract;

pub use settlement::*;
pub use path::*;
pub use contract::*;
