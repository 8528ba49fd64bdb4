//! Operator notifications

pub mod sink;
pub mod telegram;
pub mod dispatcher;
pub mod messages;

pub use sink::*;
pub use telegram::*;
pub use dispatcher::*;
pub use messages::*;
