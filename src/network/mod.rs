//! Network providers and connection management

pub mod providers;
pub mod retry;

pub use providers::*;
pub use retry::*;
