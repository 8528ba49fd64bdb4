//! Session counters owned by the orchestrator

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;
use crate::types::TradeOutcome;

#[derive(Debug, Clone, Serialize)]
pub struct TradingStats {
    pub started: DateTime<Utc>,
    #[serde(skip)]
    started_at: Instant,
    pub total_opportunities: u64,
    pub profitable_opportunities: u64,
    pub rejected_trades: u64,
    pub executed_trades: u64,
    pub successful_trades: u64,
    pub failed_trades: u64,
    pub total_profit: Decimal,
    pub total_gas_spent: Decimal,
    pub error_counts: HashMap<String, u32>,
}

impl Default for TradingStats {
    fn default() -> Self {
        Self::new()
    }
}

impl TradingStats {
    pub fn new() -> Self {
        Self {
            started: Utc::now(),
            started_at: Instant::now(),
            total_opportunities: 0,
            profitable_opportunities: 0,
            rejected_trades: 0,
            executed_trades: 0,
            successful_trades: 0,
            failed_trades: 0,
            total_profit: Decimal::ZERO,
            total_gas_spent: Decimal::ZERO,
            error_counts: HashMap::new(),
        }
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    pub fn record_outcome(&mut self, outcome: &TradeOutcome) {
        self.executed_trades += 1;
        self.total_gas_spent += outcome.gas_spent;
        if outcome.success {
            self.successful_trades += 1;
            self.total_profit += outcome.realized_profit;
        } else {
            self.failed_trades += 1;
        }
    }

    pub fn record_error(&mut self, kind: &str) {
        *self.error_counts.entry(kind.to_string()).or_insert(0) += 1;
    }

    pub fn net_profit(&self) -> Decimal {
        self.total_profit - self.total_gas_spent
    }

    /// Percentage of executed trades that settled successfully.
    pub fn success_rate(&self) -> Decimal {
        if self.executed_trades == 0 {
            return Decimal::ZERO;
        }
        Decimal::from(self.successful_trades) / Decimal::from(self.executed_trades) * dec!(100)
    }

    /// Clears counters after the daily summary; uptime is kept.
    pub fn reset_daily(&mut self) {
        let started = self.started;
        let started_at = self.started_at;
        *self = Self {
            started,
            started_at,
            ..Self::new()
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::Address;

    fn outcome(success: bool, profit: Decimal, gas: Decimal) -> TradeOutcome {
        TradeOutcome {
            opportunity_id: "id".to_string(),
            token: Address::ZERO,
            route: "a → b".to_string(),
            amount: dec!(1),
            timestamp: Utc::now(),
            success,
            realized_profit: profit,
            gas_spent: gas,
            reference: None,
            error_message: None,
        }
    }

    #[test]
    fn aggregates_outcomes() {
        let mut stats = TradingStats::new();
        stats.record_outcome(&outcome(true, dec!(0.05), dec!(0.01)));
        stats.record_outcome(&outcome(false, Decimal::ZERO, dec!(0.02)));
        assert_eq!(stats.executed_trades, 2);
        assert_eq!(stats.successful_trades, 1);
        assert_eq!(stats.failed_trades, 1);
        assert_eq!(stats.net_profit(), dec!(0.02));
        assert_eq!(stats.success_rate(), dec!(50));
    }

    #[test]
    fn daily_reset_clears_counters() {
        let mut stats = TradingStats::new();
        stats.total_opportunities = 7;
        stats.record_error("venue");
        stats.record_outcome(&outcome(true, dec!(1), dec!(0)));
        let started = stats.started;
        stats.reset_daily();
        assert_eq!(stats.total_opportunities, 0);
        assert_eq!(stats.executed_trades, 0);
        assert!(stats.error_counts.is_empty());
        assert_eq!(stats.started, started);
    }
}
