//! Error classification for the detection pipeline

use tracing::Level;
use super::BotError;

/// How the pipeline reacts to a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// A single venue or gas query failed. Treated as missing data.
    Transient,
    /// A submitted trade reverted or timed out. Counted by the risk gate, never retried.
    Dispatch,
    /// A trade failed pre-submission checks. Never dispatched, not counted.
    Validation,
    /// Trading must stop until an operator resets the gate.
    Fatal,
}

impl ErrorClass {
    pub fn classify(error: &BotError) -> Self {
        match error {
            BotError::Network { .. }
            | BotError::Contract { .. }
            | BotError::Venue { .. }
            | BotError::DataParsing { .. }
            | BotError::Notification(_) => ErrorClass::Transient,
            BotError::Settlement { .. } => ErrorClass::Dispatch,
            BotError::CircuitBreakerOpen { .. } => ErrorClass::Validation,
            BotError::InsufficientBalance { .. } | BotError::Config(_) => ErrorClass::Fatal,
        }
    }

    pub fn log_level(self) -> Level {
        match self {
            ErrorClass::Transient => Level::DEBUG,
            ErrorClass::Validation => Level::INFO,
            ErrorClass::Dispatch => Level::WARN,
            ErrorClass::Fatal => Level::ERROR,
        }
    }

    pub fn counts_against_breaker(self) -> bool {
        matches!(self, ErrorClass::Dispatch | ErrorClass::Fatal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn venue_errors_are_transient() {
        let class = ErrorClass::classify(&BotError::venue("sushiswap", "reverted"));
        assert_eq!(class, ErrorClass::Transient);
        assert_eq!(class.log_level(), Level::DEBUG);
        assert!(!class.counts_against_breaker());
    }

    #[test]
    fn settlement_errors_count_against_breaker() {
        let class = ErrorClass::classify(&BotError::settlement("reverted"));
        assert_eq!(class, ErrorClass::Dispatch);
        assert!(class.counts_against_breaker());
    }

    #[test]
    fn low_balance_is_fatal() {
        let err = BotError::InsufficientBalance {
            balance: rust_decimal_macros::dec!(0.01),
            required: rust_decimal_macros::dec!(0.1),
        };
        assert_eq!(ErrorClass::classify(&err), ErrorClass::Fatal);
    }
}
