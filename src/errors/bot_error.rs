//! Custom error types for the bot

use alloy::primitives::Address;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BotError {
    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
        retry_count: u32,
    },

    #[error("Contract interaction failed: {contract} - {message}")]
    Contract {
        contract: Address,
        message: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Venue {venue} unavailable: {reason}")]
    Venue {
        venue: String,
        reason: String,
    },

    #[error("Settlement failed: {message}")]
    Settlement {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    #[error("Insufficient operating balance: {balance} < {required}")]
    InsufficientBalance {
        balance: rust_decimal::Decimal,
        required: rust_decimal::Decimal,
    },

    #[error("Notification delivery failed: {0}")]
    Notification(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Data parsing error: {context}")]
    DataParsing {
        context: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Circuit breaker active: {reason}")]
    CircuitBreakerOpen {
        reason: String,
        cooldown_remaining: Duration,
    },
}

pub type BotResult<T> = Result<T, BotError>;

impl BotError {
    pub fn settlement(message: impl Into<String>) -> Self {
        BotError::Settlement {
            message: message.into(),
            source: None,
        }
    }

    pub fn venue(venue: impl Into<String>, reason: impl Into<String>) -> Self {
        BotError::Venue {
            venue: venue.into(),
            reason: reason.into(),
        }
    }
}
