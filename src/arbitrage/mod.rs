//! Opportunity detection and profit scoring

pub mod calculator;
pub mod detector;

pub use calculator::*;
pub use detector::*;
