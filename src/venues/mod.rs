//! Venue price sources and aggregation

pub mod source;
pub mod onchain;
pub mod aggregator;

pub use source::*;
pub use onchain::*;
pub use aggregator::*;
