//! Safety state machine gating every trade decision

use rust_decimal::Decimal;
use std::time::Duration;
use tracing::{error, info, warn};
use crate::{
    config::{RiskLimits, RATE_LIMIT_WINDOW_MS},
    gas::is_gas_price_acceptable,
    types::{Opportunity, SafetyStatus, TradeValidation, TradeViolation, TradingHalt},
    utils::wei_to_gwei,
};
use super::{CircuitBreaker, ExposureTracker, LossTracker, RateLimiter};

/// Owns the circuit breaker, hourly rate limiter, loss tracker and exposure cap.
///
/// Mutated only from the orchestrator's loop, so no interior locking.
#[derive(Debug, Clone)]
pub struct RiskGate {
    breaker: CircuitBreaker,
    rate_limiter: RateLimiter,
    losses: LossTracker,
    exposure: ExposureTracker,
    max_gas_price_gwei: u64,
    opportunity_max_age: Duration,
    min_spread_pct: Decimal,
}

impl RiskGate {
    pub fn new(limits: &RiskLimits) -> Self {
        Self {
            breaker: CircuitBreaker::new(
                limits.max_consecutive_failures,
                limits.circuit_breaker_cooldown,
            ),
            rate_limiter: RateLimiter::new(
                limits.max_trades_per_hour,
                Duration::from_millis(RATE_LIMIT_WINDOW_MS),
            ),
            losses: LossTracker::new(limits.max_consecutive_losses, limits.max_daily_loss),
            exposure: ExposureTracker::new(limits.max_exposure),
            max_gas_price_gwei: limits.max_gas_price_gwei,
            opportunity_max_age: limits.opportunity_max_age,
            min_spread_pct: limits.min_spread_pct,
        }
    }

    /// First reason trading is halted, if any. Closes an expired breaker and rolls the
    /// hourly window as a side effect.
    pub fn trading_halt(&mut self) -> Option<TradingHalt> {
        if !self.breaker.can_proceed() {
            return Some(TradingHalt::CircuitBreakerOpen {
                reason: self.breaker.trip_reason().unwrap_or_default().to_string(),
                cooldown_remaining: self.breaker.cooldown_remaining(),
            });
        }

        if !self.rate_limiter.has_capacity() {
            return Some(TradingHalt::RateLimited {
                trades: self.rate_limiter.trades(),
                limit: self.rate_limiter.max_trades(),
            });
        }

        if self.losses.daily_limit_reached() {
            return Some(TradingHalt::DailyLossLimit {
                loss: self.losses.daily_loss(),
                limit: self.losses.max_daily_loss(),
            });
        }

        None
    }

    pub fn is_trading_allowed(&mut self) -> bool {
        self.trading_halt().is_none()
    }

    /// Checks every pre-submission constraint and reports all that fail.
    pub fn validate_trade(
        &self,
        opportunity: &Opportunity,
        trade_amount: Decimal,
        gas_price_wei: u128,
    ) -> TradeValidation {
        let mut violations = Vec::new();

        if trade_amount <= Decimal::ZERO {
            violations.push(TradeViolation::NonPositiveAmount {
                amount: trade_amount,
            });
        }

        if self.exposure.would_exceed(trade_amount) {
            violations.push(TradeViolation::ExceedsExposure {
                amount: trade_amount,
                current: self.exposure.current(),
                cap: self.exposure.cap(),
            });
        }

        if !is_gas_price_acceptable(gas_price_wei, self.max_gas_price_gwei) {
            violations.push(TradeViolation::GasPriceTooHigh {
                gwei: wei_to_gwei(gas_price_wei),
                max_gwei: self.max_gas_price_gwei,
            });
        }

        if !opportunity.is_valid(self.opportunity_max_age) {
            violations.push(TradeViolation::Stale {
                age_ms: opportunity.age().as_millis(),
                max_age_ms: self.opportunity_max_age.as_millis(),
            });
        }

        if opportunity.spread_pct < self.min_spread_pct {
            violations.push(TradeViolation::SpreadBelowMinimum {
                spread_pct: opportunity.spread_pct,
                min_pct: self.min_spread_pct,
            });
        }

        TradeValidation { violations }
    }

    pub fn record_success(&mut self, profit: Decimal) {
        self.breaker.record_success();
        self.losses.clear_streak();
        self.rate_limiter.record();
        info!(profit = %profit, "✅ Trade recorded as success");
    }

    /// A failed dispatch, optionally with the loss it realized. Either streak may open
    /// the breaker on its own.
    pub fn record_failure(&mut self, loss: Option<Decimal>) {
        self.breaker.record_failure();

        if let Some(loss) = loss {
            if self.losses.record_loss(loss) {
                let streak = self.losses.consecutive_losses();
                self.breaker
                    .trip(format!("{} consecutive losses", streak), false);
            }
        }

        warn!(
            consecutive_failures = self.breaker.consecutive_failures(),
            consecutive_losses = self.losses.consecutive_losses(),
            daily_loss = %self.losses.daily_loss(),
            "❌ Trade recorded as failure"
        );
    }

    pub fn trip(&mut self, reason: impl Into<String>, latched: bool) {
        self.breaker.trip(reason, latched);
    }

    /// Operator override: closes the breaker and clears loss streak and daily loss.
    pub fn manual_reset(&mut self) {
        self.breaker.reset();
        self.losses.reset();
        info!("✅ Manual safety reset performed");
    }

    /// Daily boundary: clears loss counters, leaves the breaker alone.
    pub fn reset_daily(&mut self) {
        self.losses.reset();
        info!("📊 Daily safety statistics reset");
    }

    /// Trips a latched breaker when the operating balance is under `min_balance`.
    pub fn check_operating_balance(&mut self, balance: Decimal, min_balance: Decimal) -> bool {
        if balance < min_balance {
            error!(
                balance = %balance,
                minimum = %min_balance,
                "⚠️ Operating balance too low"
            );
            self.breaker
                .trip(format!("operating balance {} below {}", balance, min_balance), true);
            return false;
        }
        true
    }

    pub fn open_exposure(&mut self, amount: Decimal) {
        self.exposure.open(amount);
    }

    pub fn close_exposure(&mut self, amount: Decimal) {
        self.exposure.close(amount);
    }

    /// Largest trade that moves a pool of `liquidity` by at most `impact_limit` (a fraction),
    /// capped at max exposure.
    pub fn max_safe_trade_size(&self, liquidity: Decimal, impact_limit: Decimal) -> Decimal {
        (liquidity * impact_limit).min(self.exposure.cap())
    }

    pub fn status(&self) -> SafetyStatus {
        SafetyStatus {
            breaker: self.breaker.status(),
            trip_reason: self.breaker.trip_reason().map(str::to_string),
            cooldown_remaining: self.breaker.cooldown_remaining(),
            consecutive_failures: self.breaker.consecutive_failures(),
            consecutive_losses: self.losses.consecutive_losses(),
            trades_this_hour: self.rate_limiter.trades(),
            max_trades_per_hour: self.rate_limiter.max_trades(),
            daily_loss: self.losses.daily_loss(),
            max_daily_loss: self.losses.max_daily_loss(),
            current_exposure: self.exposure.current(),
            max_exposure: self.exposure.cap(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BreakerStatus;
    use crate::utils::gwei_to_wei;
    use alloy::primitives::Address;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use tokio::time::Instant;

    fn limits() -> RiskLimits {
        RiskLimits::default()
    }

    fn opportunity(spread_pct: Decimal) -> Opportunity {
        Opportunity {
            id: "opp".to_string(),
            token: Address::ZERO,
            buy_venue: "a".to_string(),
            sell_venue: "b".to_string(),
            buy_rate: dec!(100),
            sell_rate: dec!(100) + spread_pct,
            spread_pct,
            timestamp: Utc::now(),
            detected_at: Instant::now(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn breaker_holds_after_max_failures_until_cooldown() {
        let mut gate = RiskGate::new(&limits());
        for _ in 0..4 {
            gate.record_failure(None);
            assert!(gate.is_trading_allowed());
        }
        gate.record_failure(None);
        assert!(!gate.is_trading_allowed());

        tokio::time::advance(Duration::from_secs(3599)).await;
        assert!(!gate.is_trading_allowed());

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(gate.is_trading_allowed());
    }

    #[tokio::test(start_paused = true)]
    async fn manual_reset_reopens_trading() {
        let mut gate = RiskGate::new(&limits());
        gate.record_failure(Some(dec!(0.01)));
        gate.record_failure(Some(dec!(0.02)));
        for _ in 0..3 {
            gate.record_failure(None);
        }
        assert!(matches!(
            gate.trading_halt(),
            Some(TradingHalt::CircuitBreakerOpen { .. })
        ));
        assert_eq!(gate.status().consecutive_losses, 2);
        assert_eq!(gate.status().daily_loss, dec!(0.03));

        gate.manual_reset();
        assert!(gate.is_trading_allowed());
        let status = gate.status();
        assert_eq!(status.consecutive_failures, 0);
        assert_eq!(status.consecutive_losses, 0);
        assert_eq!(status.daily_loss, Decimal::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn consecutive_losses_trip_independently() {
        let mut gate = RiskGate::new(&limits());
        gate.record_failure(Some(dec!(0.01)));
        gate.record_failure(Some(dec!(0.01)));
        assert!(gate.is_trading_allowed());
        gate.record_failure(Some(dec!(0.01)));

        let status = gate.status();
        assert_eq!(status.breaker, BreakerStatus::Open);
        assert_eq!(status.consecutive_losses, 3);
        assert_eq!(status.consecutive_failures, 3);
        assert_eq!(status.trip_reason.as_deref(), Some("3 consecutive losses"));
    }

    #[tokio::test(start_paused = true)]
    async fn success_clears_streaks() {
        let mut gate = RiskGate::new(&limits());
        gate.record_failure(Some(dec!(0.01)));
        gate.record_failure(Some(dec!(0.01)));
        gate.record_success(dec!(0.02));
        gate.record_failure(Some(dec!(0.01)));
        assert!(gate.is_trading_allowed());
        assert_eq!(gate.status().consecutive_losses, 1);
        assert_eq!(gate.status().daily_loss, dec!(0.03));
    }

    #[tokio::test(start_paused = true)]
    async fn rate_limit_blocks_until_window_rolls() {
        let mut limits = limits();
        limits.max_trades_per_hour = 3;
        let mut gate = RiskGate::new(&limits);
        for _ in 0..3 {
            assert!(gate.is_trading_allowed());
            gate.record_success(dec!(0.01));
        }
        assert_eq!(
            gate.trading_halt(),
            Some(TradingHalt::RateLimited { trades: 3, limit: 3 })
        );

        tokio::time::advance(Duration::from_millis(RATE_LIMIT_WINDOW_MS)).await;
        assert!(gate.is_trading_allowed());
        assert_eq!(gate.status().trades_remaining(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn daily_loss_cap_halts_and_resets_daily() {
        let mut limits = limits();
        limits.max_consecutive_losses = 100;
        limits.max_consecutive_failures = 100;
        let mut gate = RiskGate::new(&limits);
        gate.record_failure(Some(dec!(0.3)));
        gate.record_failure(Some(dec!(0.2)));
        assert!(matches!(
            gate.trading_halt(),
            Some(TradingHalt::DailyLossLimit { .. })
        ));

        gate.reset_daily();
        assert!(gate.is_trading_allowed());
    }

    #[tokio::test(start_paused = true)]
    async fn validate_trade_reports_every_violation() {
        let gate = RiskGate::new(&limits());
        let opp = opportunity(dec!(0.001));
        tokio::time::advance(Duration::from_millis(5_000)).await;

        let validation = gate.validate_trade(&opp, dec!(11), gwei_to_wei(150));
        assert!(!validation.is_valid());
        assert_eq!(validation.violations.len(), 4);
        assert!(validation.violations.iter().any(|v| matches!(v, TradeViolation::Stale { .. })));
        assert!(validation.violations.iter().any(|v| matches!(v, TradeViolation::ExceedsExposure { .. })));
        assert!(validation.violations.iter().any(|v| matches!(v, TradeViolation::GasPriceTooHigh { .. })));
        assert!(validation.violations.iter().any(|v| matches!(v, TradeViolation::SpreadBelowMinimum { .. })));
        assert_eq!(validation.reasons().len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn fresh_opportunity_within_limits_passes() {
        let gate = RiskGate::new(&limits());
        let validation = gate.validate_trade(&opportunity(dec!(2)), dec!(1), gwei_to_wei(100));
        assert!(validation.is_valid());

        let zero = gate.validate_trade(&opportunity(dec!(2)), Decimal::ZERO, gwei_to_wei(1));
        assert_eq!(
            zero.violations,
            vec![TradeViolation::NonPositiveAmount { amount: Decimal::ZERO }]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn stale_opportunity_always_rejected() {
        let gate = RiskGate::new(&limits());
        let opp = opportunity(dec!(5));
        tokio::time::advance(Duration::from_secs(60)).await;
        let validation = gate.validate_trade(&opp, dec!(1), 0);
        assert_eq!(validation.violations.len(), 1);
        assert!(matches!(validation.violations[0], TradeViolation::Stale { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn open_exposure_counts_against_cap() {
        let mut gate = RiskGate::new(&limits());
        gate.open_exposure(dec!(9.5));
        let validation = gate.validate_trade(&opportunity(dec!(2)), dec!(1), 0);
        assert!(matches!(
            validation.violations.as_slice(),
            [TradeViolation::ExceedsExposure { .. }]
        ));
        gate.close_exposure(dec!(9.5));
        assert!(gate.validate_trade(&opportunity(dec!(2)), dec!(1), 0).is_valid());
    }

    #[tokio::test(start_paused = true)]
    async fn low_balance_latches_breaker() {
        let mut gate = RiskGate::new(&limits());
        assert!(gate.check_operating_balance(dec!(1), dec!(0.1)));
        assert!(!gate.check_operating_balance(dec!(0.05), dec!(0.1)));

        tokio::time::advance(Duration::from_secs(7200)).await;
        assert!(!gate.is_trading_allowed());
        assert!(gate.status().cooldown_remaining.is_none());

        gate.manual_reset();
        assert!(gate.is_trading_allowed());
    }

    #[test]
    fn safe_trade_size_respects_exposure() {
        let gate = RiskGate::new(&limits());
        assert_eq!(gate.max_safe_trade_size(dec!(100), dec!(0.02)), dec!(2));
        assert_eq!(gate.max_safe_trade_size(dec!(10000), dec!(0.02)), dec!(10));
    }
}
