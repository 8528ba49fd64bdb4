//! Risk gate state and rejection reasons

use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BreakerStatus {
    Closed,
    Open,
}

/// Why the gate refuses all trading right now.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TradingHalt {
    CircuitBreakerOpen { reason: String, cooldown_remaining: Option<Duration> },
    RateLimited { trades: u32, limit: u32 },
    DailyLossLimit { loss: Decimal, limit: Decimal },
}

impl fmt::Display for TradingHalt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradingHalt::CircuitBreakerOpen { reason, cooldown_remaining: Some(left) } => {
                write!(f, "circuit breaker open ({}), {}s until reset", reason, left.as_secs())
            }
            TradingHalt::CircuitBreakerOpen { reason, cooldown_remaining: None } => {
                write!(f, "circuit breaker open ({}), manual reset required", reason)
            }
            TradingHalt::RateLimited { trades, limit } => {
                write!(f, "rate limit reached: {}/{} trades this hour", trades, limit)
            }
            TradingHalt::DailyLossLimit { loss, limit } => {
                write!(f, "daily loss limit reached: {} >= {}", loss, limit)
            }
        }
    }
}

/// One violated pre-submission constraint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TradeViolation {
    NonPositiveAmount { amount: Decimal },
    ExceedsExposure { amount: Decimal, current: Decimal, cap: Decimal },
    GasPriceTooHigh { gwei: Decimal, max_gwei: u64 },
    Stale { age_ms: u128, max_age_ms: u128 },
    SpreadBelowMinimum { spread_pct: Decimal, min_pct: Decimal },
}

impl fmt::Display for TradeViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeViolation::NonPositiveAmount { amount } => {
                write!(f, "trade amount must be positive (got {})", amount)
            }
            TradeViolation::ExceedsExposure { amount, current, cap } => write!(
                f,
                "trade amount {} with open exposure {} exceeds max exposure {}",
                amount, current, cap
            ),
            TradeViolation::GasPriceTooHigh { gwei, max_gwei } => {
                write!(f, "gas price too high: {} gwei (max {})", gwei.round_dp(2), max_gwei)
            }
            TradeViolation::Stale { age_ms, max_age_ms } => {
                write!(f, "opportunity too old: {}ms (max {}ms)", age_ms, max_age_ms)
            }
            TradeViolation::SpreadBelowMinimum { spread_pct, min_pct } => write!(
                f,
                "spread {}% below minimum {}%",
                spread_pct.round_dp(4),
                min_pct
            ),
        }
    }
}

/// Result of `RiskGate::validate_trade`; lists every violation, not only the first.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TradeValidation {
    pub violations: Vec<TradeViolation>,
}

impl TradeValidation {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn reasons(&self) -> Vec<String> {
        self.violations.iter().map(ToString::to_string).collect()
    }
}

/// Read-only view of the gate, for reports.
#[derive(Debug, Clone, Serialize)]
pub struct SafetyStatus {
    pub breaker: BreakerStatus,
    pub trip_reason: Option<String>,
    pub cooldown_remaining: Option<Duration>,
    pub consecutive_failures: u32,
    pub consecutive_losses: u32,
    pub trades_this_hour: u32,
    pub max_trades_per_hour: u32,
    pub daily_loss: Decimal,
    pub max_daily_loss: Decimal,
    pub current_exposure: Decimal,
    pub max_exposure: Decimal,
}

impl SafetyStatus {
    pub fn trades_remaining(&self) -> u32 {
        self.max_trades_per_hour.saturating_sub(self.trades_this_hour)
    }
}
