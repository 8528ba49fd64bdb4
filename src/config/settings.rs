//! Bot configuration settings and environment variable handling

use alloy::primitives::Address;
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use std::env;
use std::str::FromStr;
use std::time::Duration;

use super::chains::{Chain, ChainConfig};
use crate::errors::{BotError, BotResult};

// Configuration constants
pub const MIN_TRADE_SIZE: Decimal = dec!(0.01);
pub const MAX_TRADE_SIZE: Decimal = dec!(100);
pub const DEFAULT_TRADE_SIZE: Decimal = dec!(1);
pub const MIN_CHECK_INTERVAL_MS: u64 = 250;

// Pipeline timing
pub const PRICE_CACHE_TTL_MS: u64 = 5_000;
pub const GAS_CACHE_TTL_MS: u64 = 10_000;
pub const VENUE_QUERY_TIMEOUT_MS: u64 = 3_000;
pub const GAS_QUERY_TIMEOUT_MS: u64 = 3_000;
pub const BALANCE_QUERY_TIMEOUT_MS: u64 = 5_000;
pub const RATE_LIMIT_WINDOW_MS: u64 = 3_600_000;

// Trade Execution Constants
pub const SETTLEMENT_GAS_LIMIT: u64 = 500_000;
pub const GAS_PRICE_BUFFER_PCT: u64 = 10;
pub const DEFAULT_GAS_PRICE_GWEI: u64 = 50;
pub const EXECUTION_TIMEOUT_SECS: u64 = 120;

/// Limits enforced by the risk gate.
#[derive(Debug, Clone)]
pub struct RiskLimits {
    pub max_consecutive_failures: u32,
    pub max_consecutive_losses: u32,
    pub circuit_breaker_cooldown: Duration,
    pub max_trades_per_hour: u32,
    pub max_daily_loss: Decimal,
    pub max_exposure: Decimal,
    pub max_gas_price_gwei: u64,
    pub opportunity_max_age: Duration,
    pub min_spread_pct: Decimal,
}

impl Default for RiskLimits {
    fn default() -> Self {
        Self {
            max_consecutive_failures: 5,
            max_consecutive_losses: 3,
            circuit_breaker_cooldown: Duration::from_secs(3600),
            max_trades_per_hour: 20,
            max_daily_loss: dec!(0.5),
            max_exposure: dec!(10),
            max_gas_price_gwei: 100,
            opportunity_max_age: Duration::from_millis(5_000),
            min_spread_pct: dec!(0.01),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub chain: ChainConfig,
    pub testnet: bool,
    pub rpc_url: Option<String>,
    pub private_key: Option<String>,
    pub arbitrage_contract: Option<Address>,
    /// Minimum spread (percent) before an opportunity is built.
    pub min_spread_pct: Decimal,
    /// Minimum net profit in native units before a trade is dispatched.
    pub min_profit_threshold: Decimal,
    pub max_trade_size: Decimal,
    pub check_interval: Duration,
    pub min_operating_balance: Decimal,
    pub risk: RiskLimits,
    // Notifications
    pub telegram_bot_token: Option<String>,
    pub telegram_chat_id: Option<String>,
}

impl Config {
    /// Builds the configuration once from the environment. Unset or malformed values fall
    /// back to the documented defaults.
    pub fn load() -> Self {
        let chain = env::var("CHAIN")
            .ok()
            .and_then(|s| Chain::from_str(&s).ok())
            .unwrap_or(Chain::Ethereum);
        let testnet = env::var("NETWORK").map(|n| n == "testnet").unwrap_or(false)
            || env_parse("TESTNET").unwrap_or(false);

        let max_trade_size = env_decimal("MAX_TRADE_SIZE")
            .unwrap_or(dec!(10))
            .max(MIN_TRADE_SIZE)
            .min(MAX_TRADE_SIZE);
        let default_gas_cap = match chain {
            Chain::Bnb => 5,
            Chain::Ethereum => 100,
        };
        let min_spread_pct = env_decimal("MIN_SPREAD_PCT")
            .unwrap_or(dec!(0.01))
            .max(Decimal::ZERO);

        let defaults = RiskLimits::default();
        let risk = RiskLimits {
            max_consecutive_failures: env_parse("MAX_CONSECUTIVE_FAILURES")
                .unwrap_or(defaults.max_consecutive_failures)
                .max(1),
            max_consecutive_losses: env_parse("MAX_CONSECUTIVE_LOSSES")
                .unwrap_or(defaults.max_consecutive_losses)
                .max(1),
            circuit_breaker_cooldown: env_parse("CIRCUIT_BREAKER_COOLDOWN_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.circuit_breaker_cooldown),
            max_trades_per_hour: env_parse("MAX_TRADES_PER_HOUR")
                .unwrap_or(defaults.max_trades_per_hour),
            max_daily_loss: env_decimal("MAX_DAILY_LOSS").unwrap_or(defaults.max_daily_loss),
            max_exposure: max_trade_size,
            max_gas_price_gwei: env_parse("MAX_GAS_PRICE_GWEI").unwrap_or(default_gas_cap),
            opportunity_max_age: env_parse("OPPORTUNITY_MAX_AGE_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.opportunity_max_age),
            min_spread_pct,
        };

        Self {
            chain: ChainConfig::for_chain(chain),
            testnet,
            rpc_url: env::var("RPC_URL").ok(),
            private_key: env::var("PRIVATE_KEY").ok(),
            arbitrage_contract: env::var("ARBITRAGE_CONTRACT_ADDRESS")
                .ok()
                .and_then(|s| Address::from_str(&s).ok()),
            min_spread_pct,
            min_profit_threshold: env_decimal("MIN_PROFIT_THRESHOLD").unwrap_or(dec!(0.01)),
            max_trade_size,
            check_interval: Duration::from_millis(
                env_parse("CHECK_INTERVAL_MS")
                    .unwrap_or(1000u64)
                    .max(MIN_CHECK_INTERVAL_MS),
            ),
            min_operating_balance: env_decimal("MIN_OPERATING_BALANCE").unwrap_or(dec!(0.1)),
            risk,
            telegram_bot_token: env::var("TELEGRAM_BOT_TOKEN").ok(),
            telegram_chat_id: env::var("TELEGRAM_CHAT_ID").ok(),
        }
    }

    /// Defaults for a chain with no environment applied.
    pub fn for_chain(chain: Chain) -> Self {
        Self {
            chain: ChainConfig::for_chain(chain),
            testnet: false,
            rpc_url: None,
            private_key: None,
            arbitrage_contract: None,
            min_spread_pct: dec!(0.01),
            min_profit_threshold: dec!(0.01),
            max_trade_size: dec!(10),
            check_interval: Duration::from_millis(1000),
            min_operating_balance: dec!(0.1),
            risk: RiskLimits::default(),
            telegram_bot_token: None,
            telegram_chat_id: None,
        }
    }

    pub fn chain_id(&self) -> u64 {
        if self.testnet {
            self.chain.testnet_chain_id
        } else {
            self.chain.chain_id
        }
    }

    pub fn telegram_enabled(&self) -> bool {
        self.telegram_bot_token.is_some() && self.telegram_chat_id.is_some()
    }

    /// Fields required before the bot may talk to a chain and submit trades.
    pub fn validate(&self) -> BotResult<()> {
        let mut missing = Vec::new();
        if self.rpc_url.is_none() {
            missing.push("RPC_URL");
        }
        if self.private_key.is_none() {
            missing.push("PRIVATE_KEY");
        }
        if self.arbitrage_contract.is_none() {
            missing.push("ARBITRAGE_CONTRACT_ADDRESS");
        }
        if !missing.is_empty() {
            return Err(BotError::Config(format!("missing {}", missing.join(", "))));
        }
        if self.chain.venues.len() < 2 {
            return Err(BotError::Config(
                "at least two venues are required to compare prices".to_string(),
            ));
        }
        Ok(())
    }
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.parse().ok())
}

fn env_decimal(key: &str) -> Option<Decimal> {
    env::var(key).ok().and_then(|s| Decimal::from_str(&s).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_defaults_are_complete() {
        let config = Config::for_chain(Chain::Ethereum);
        assert_eq!(config.risk.max_consecutive_failures, 5);
        assert_eq!(config.risk.max_consecutive_losses, 3);
        assert_eq!(config.risk.circuit_breaker_cooldown, Duration::from_secs(3600));
        assert_eq!(config.risk.opportunity_max_age, Duration::from_millis(5000));
        assert_eq!(config.check_interval, Duration::from_millis(1000));
        assert_eq!(config.chain_id(), 1);
    }

    #[test]
    fn validate_lists_missing_fields() {
        let config = Config::for_chain(Chain::Bnb);
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("RPC_URL"));
        assert!(err.contains("PRIVATE_KEY"));
        assert!(err.contains("ARBITRAGE_CONTRACT_ADDRESS"));
    }

    #[test]
    fn testnet_switches_chain_id() {
        let mut config = Config::for_chain(Chain::Bnb);
        config.testnet = true;
        assert_eq!(config.chain_id(), 97);
    }
}
