//! Flash-loan arbitrage bot for Ethereum and BNB Chain
//!
//! Polls several DEX venues for each watched token, scores the spread between the
//! cheapest and dearest venue net of swap fees, the flash-loan fee and gas, and hands
//! trades that pass the risk gate to an on-chain settlement contract.

pub mod config;
pub mod types;
pub mod errors;
pub mod network;
pub mod venues;
pub mod gas;
pub mod arbitrage;
pub mod risk;
pub mod execution;
pub mod notify;
pub mod bot;
pub mod utils;
pub mod storage;

// Re-export commonly used items
pub use config::{Config, CONFIG};
pub use errors::{BotError, BotResult};
pub use types::*;

// Type alias for our concrete provider
pub type ConcreteProvider = alloy::providers::RootProvider<alloy::transports::BoxTransport>;
