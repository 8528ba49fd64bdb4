//! Error types and failure classification

pub mod bot_error;
pub mod recovery;

pub use bot_error::*;
pub use recovery::*;
