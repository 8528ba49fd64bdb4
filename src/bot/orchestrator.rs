//! Polling loop that turns venue quotes into gated, dispatched trades

use chrono::{DateTime, Utc};
use futures::future::join_all;
use rust_decimal::Decimal;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, interval_at, sleep, timeout, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};
use crate::{
    arbitrage::{find_opportunity, ProfitModel},
    bot::TradingStats,
    config::{Config, BALANCE_QUERY_TIMEOUT_MS},
    errors::{BotError, ErrorClass},
    execution::{encode_arbitrage_path, Settlement},
    gas::GasOracle,
    notify::{halt_message, startup_message, stats_message, stopped_message, trade_message, Notifier},
    risk::RiskGate,
    storage,
    types::{Opportunity, ProfitResult, SettlementRequest, TradeOutcome, TradeValidation, TradingHalt},
    utils::{print_opportunity, print_session_stats, print_trade_outcome, wei_to_gwei},
    venues::PriceAggregator,
};

const HOUR: Duration = Duration::from_secs(3600);
const DAY: Duration = Duration::from_secs(86_400);

/// What happened to one detected opportunity.
#[derive(Debug, Clone)]
pub enum Decision {
    Unprofitable(ProfitResult),
    Halted(TradingHalt),
    Rejected(TradeValidation),
    /// The score the trade was dispatched on, and how it settled.
    Dispatched(ProfitResult, TradeOutcome),
}

pub struct ArbitrageBot {
    config: Config,
    aggregator: PriceAggregator,
    gas: GasOracle,
    profit: ProfitModel,
    gate: RiskGate,
    settlement: Arc<dyn Settlement>,
    notifier: Option<Notifier>,
    stats: TradingStats,
    persist: bool,
    halted: bool,
}

impl ArbitrageBot {
    pub fn new(
        config: Config,
        aggregator: PriceAggregator,
        gas: GasOracle,
        settlement: Arc<dyn Settlement>,
    ) -> Self {
        let profit = ProfitModel::new(
            &config.chain.venues,
            config.chain.flashloan_provider.fee,
            config.max_trade_size,
            config.min_profit_threshold,
        );
        let gate = RiskGate::new(&config.risk);

        Self {
            config,
            aggregator,
            gas,
            profit,
            gate,
            settlement,
            notifier: None,
            stats: TradingStats::new(),
            persist: true,
            halted: false,
        }
    }

    pub fn with_notifier(mut self, notifier: Notifier) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Skips writing opportunities, outcomes and reports under `output/`.
    pub fn without_persistence(mut self) -> Self {
        self.persist = false;
        self
    }

    pub fn stats(&self) -> &TradingStats {
        &self.stats
    }

    pub fn gate(&self) -> &RiskGate {
        &self.gate
    }

    pub fn gate_mut(&mut self) -> &mut RiskGate {
        &mut self.gate
    }

    /// Drives the poll, hourly and daily timers until `shutdown` resolves. A trade already
    /// dispatched when the signal arrives is allowed to resolve first. Reports that fell due
    /// during a slow poll run before the next poll starts.
    pub async fn run<F>(&mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        let mut poll = interval(self.config.check_interval);
        poll.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut hourly = interval_at(Instant::now() + HOUR, HOUR);
        hourly.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let daily = sleep(until_next_utc_midnight(Utc::now()));
        tokio::pin!(daily);

        self.start().await;
        info!("\n🚀 Starting main monitoring loop...\n");

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("Shutdown signal received, exiting main loop...");
                    break;
                }
                _ = &mut daily => {
                    self.daily_rollover();
                    daily.as_mut().reset(Instant::now() + until_next_utc_midnight(Utc::now()));
                }
                _ = hourly.tick() => self.hourly_report(),
                _ = poll.tick() => {
                    let dispatched = self.tick().await;
                    if dispatched > 0 {
                        debug!(dispatched, "Iteration complete");
                    }
                }
            }
        }

        self.stop();
    }

    /// Logs the configuration, checks the operating balance and announces startup.
    pub async fn start(&mut self) {
        let config = &self.config;
        info!("📋 Configuration:");
        info!("   Network: {}{}", config.chain.name, if config.testnet { " (testnet)" } else { "" });
        info!("   Venues: {}", config.chain.venues.len());
        info!("   Tokens: {}", config.chain.watchlist.len());
        info!("   Min spread: {}%", config.min_spread_pct);
        info!("   Min profit: {} {}", config.min_profit_threshold, config.chain.native_symbol);
        info!("   Max trade size: {}", config.max_trade_size);
        info!("   Max gas price: {} gwei", config.risk.max_gas_price_gwei);
        info!("   Poll interval: {:?}", config.check_interval);

        if let Some(fees) = self.gas.eip1559_fees().await {
            info!(
                "   Network fees: max {} gwei, priority {} gwei",
                wei_to_gwei(fees.max_fee_per_gas).round_dp(2),
                wei_to_gwei(fees.max_priority_fee_per_gas).round_dp(2)
            );
        }
        self.check_balance().await;
        self.notify(startup_message(&self.config));
    }

    /// Final report once the loop has exited.
    pub fn stop(&self) {
        info!("\n🛑 Shutting down gracefully...");
        let safety = self.gate.status();
        print_session_stats(&self.stats, &safety, &self.config.chain.native_symbol);
        self.notify(stopped_message(&self.stats, &safety, &self.config.chain.native_symbol));
    }

    /// One poll: fetch every watched token concurrently, then evaluate the opportunities
    /// one at a time. Returns how many trades were dispatched.
    pub async fn tick(&mut self) -> usize {
        let opportunities = self.scan().await;

        let mut dispatched = 0;
        for opportunity in opportunities {
            if let Decision::Dispatched(..) = self.evaluate(opportunity).await {
                dispatched += 1;
            }
        }
        dispatched
    }

    /// Best buy/sell pair per watched token, only where the spread clears the minimum.
    pub async fn scan(&self) -> Vec<Opportunity> {
        let min_spread = self.config.min_spread_pct;
        let snapshots = join_all(
            self.config
                .chain
                .watchlist
                .iter()
                .map(|token| self.aggregator.fetch_prices(token)),
        )
        .await;

        snapshots
            .iter()
            .filter_map(|snapshot| find_opportunity(snapshot, min_spread))
            .collect()
    }

    pub async fn evaluate(&mut self, opportunity: Opportunity) -> Decision {
        self.stats.total_opportunities += 1;
        info!(
            token = %opportunity.token,
            buy_venue = %opportunity.buy_venue,
            sell_venue = %opportunity.sell_venue,
            buy_rate = %opportunity.buy_rate,
            sell_rate = %opportunity.sell_rate,
            spread = %opportunity.spread_pct.round_dp(4),
            "opportunity found"
        );

        let gas_price = self.gas.estimate().await;
        let amount = self.profit.optimal_trade_amount();
        let profit = self.profit.score(&opportunity, amount, gas_price);

        if !self.profit.clears_min_profit(&profit) {
            debug!(
                net_profit = %profit.net_profit,
                break_even_gwei = %wei_to_gwei(self.break_even_wei(&opportunity, amount)),
                "Opportunity below profit threshold"
            );
            self.persist_opportunity(&opportunity, &profit, false);
            return Decision::Unprofitable(profit);
        }

        self.stats.profitable_opportunities += 1;
        debug!(
            score = %self.profit.profitability_score(&opportunity, gas_price),
            "Profitable opportunity"
        );
        print_opportunity(&opportunity, &profit, &self.config.chain.native_symbol);

        if let Some(halt) = self.gate.trading_halt() {
            self.on_halt(&halt);
            self.stats.rejected_trades += 1;
            self.persist_opportunity(&opportunity, &profit, false);
            return Decision::Halted(halt);
        }
        self.halted = false;

        let validation = self.gate.validate_trade(&opportunity, amount, gas_price);
        if !validation.is_valid() {
            warn!(
                opportunity_id = %opportunity.id,
                reasons = ?validation.reasons(),
                "trade rejected"
            );
            self.stats.rejected_trades += 1;
            self.persist_opportunity(&opportunity, &profit, false);
            return Decision::Rejected(validation);
        }

        if !self.check_balance().await {
            let halt = self.gate.trading_halt().unwrap_or(TradingHalt::CircuitBreakerOpen {
                reason: "operating balance too low".to_string(),
                cooldown_remaining: None,
            });
            self.stats.rejected_trades += 1;
            self.persist_opportunity(&opportunity, &profit, false);
            return Decision::Halted(halt);
        }

        self.persist_opportunity(&opportunity, &profit, true);
        let outcome = self.dispatch(&opportunity, amount, gas_price).await;
        Decision::Dispatched(profit, outcome)
    }

    /// Submits the trade and feeds the outcome to the gate and the session counters.
    async fn dispatch(&mut self, opportunity: &Opportunity, amount: Decimal, gas_price: u128) -> TradeOutcome {
        info!(
            token = %opportunity.token,
            amount = %amount,
            route = %opportunity.route(),
            "trade dispatched"
        );

        self.gate.open_exposure(amount);
        let result = match self.settlement_request(opportunity, amount, gas_price) {
            Ok(request) => self.settlement.submit(&request).await,
            Err(e) => Err(e),
        };
        self.gate.close_exposure(amount);

        let mut outcome = TradeOutcome {
            opportunity_id: opportunity.id.clone(),
            token: opportunity.token,
            route: opportunity.route(),
            amount,
            timestamp: Utc::now(),
            success: false,
            realized_profit: Decimal::ZERO,
            gas_spent: Decimal::ZERO,
            reference: None,
            error_message: None,
        };

        match result {
            Ok(receipt) => {
                outcome.success = receipt.success;
                outcome.realized_profit = receipt.realized_profit;
                outcome.gas_spent = receipt.gas_spent;
                outcome.reference = receipt.reference;
                if !receipt.success {
                    outcome.error_message = Some("transaction reverted".to_string());
                }
            }
            Err(e) => {
                self.log_error("settlement", &e);
                outcome.error_message = Some(e.to_string());
            }
        }

        match (outcome.success, outcome.realized_loss()) {
            (true, None) => self.gate.record_success(outcome.net()),
            (_, loss) => self.gate.record_failure(loss),
        }
        self.stats.record_outcome(&outcome);

        print_trade_outcome(&outcome, &self.config.chain.native_symbol);
        if self.persist {
            if let Err(e) = storage::save_trade_outcome(&outcome) {
                error!("Failed to save trade outcome: {}", e);
                self.stats.record_error("save_outcome");
            }
        }
        self.notify(trade_message(
            &outcome,
            &self.config.chain.native_symbol,
            &self.config.chain.block_explorer,
        ));

        outcome
    }

    fn settlement_request(
        &self,
        opportunity: &Opportunity,
        amount: Decimal,
        gas_price: u128,
    ) -> Result<SettlementRequest, BotError> {
        let chain = &self.config.chain;
        let buy = chain
            .venue(&opportunity.buy_venue)
            .ok_or_else(|| BotError::Config(format!("unknown venue {}", opportunity.buy_venue)))?;
        let sell = chain
            .venue(&opportunity.sell_venue)
            .ok_or_else(|| BotError::Config(format!("unknown venue {}", opportunity.sell_venue)))?;
        let decimals = chain.token(opportunity.token).map(|t| t.decimals).unwrap_or(18);

        Ok(SettlementRequest {
            token: opportunity.token,
            amount,
            token_decimals: decimals,
            gas_price_wei: gas_price,
            encoded_path: encode_arbitrage_path(
                opportunity.token,
                chain.wrapped_native.address,
                buy,
                sell,
            ),
        })
    }

    /// False when the balance is below the configured minimum, which latches the breaker.
    /// A failed or timed out balance read is treated as missing data.
    async fn check_balance(&mut self) -> bool {
        let read = timeout(
            Duration::from_millis(BALANCE_QUERY_TIMEOUT_MS),
            self.settlement.operating_balance(),
        )
        .await
        .unwrap_or_else(|_| {
            Err(BotError::Network {
                message: "operating balance query timed out".to_string(),
                source: None,
                retry_count: 0,
            })
        });

        match read {
            Ok(balance) => {
                let was_open = self.gate.status().trip_reason.is_some();
                let ok = self
                    .gate
                    .check_operating_balance(balance, self.config.min_operating_balance);
                if !ok && !was_open {
                    let err = BotError::InsufficientBalance {
                        balance,
                        required: self.config.min_operating_balance,
                    };
                    self.notify(halt_message(&err.to_string()));
                    self.halted = true;
                }
                ok
            }
            Err(e) => {
                self.log_error("balance", &e);
                true
            }
        }
    }

    fn on_halt(&mut self, halt: &TradingHalt) {
        warn!(reason = %halt, "trading halted");
        if !self.halted {
            self.halted = true;
            self.notify(halt_message(&halt.to_string()));
        }
    }

    fn break_even_wei(&self, opportunity: &Opportunity, amount: Decimal) -> u128 {
        use rust_decimal::prelude::ToPrimitive;
        self.profit
            .break_even_gas_price(opportunity, amount)
            .to_u128()
            .unwrap_or_default()
    }

    /// Hourly tick: read-only report.
    pub fn hourly_report(&self) {
        let safety = self.gate.status();
        let symbol = &self.config.chain.native_symbol;
        print_session_stats(&self.stats, &safety, symbol);
        self.notify(stats_message("Hourly Stats", &self.stats, &safety, symbol));
    }

    /// Daily boundary: summary report, then loss counters and session counters start over.
    pub fn daily_rollover(&mut self) {
        let safety = self.gate.status();
        let symbol = &self.config.chain.native_symbol;
        self.notify(stats_message("Daily Summary", &self.stats, &safety, symbol));
        if self.persist {
            let day = Utc::now().date_naive().pred_opt().unwrap_or_else(|| Utc::now().date_naive());
            if let Err(e) = storage::save_daily_report(day, &self.stats, &safety) {
                error!("Failed to save daily report: {}", e);
            }
        }

        self.gate.reset_daily();
        self.stats.reset_daily();
    }

    fn persist_opportunity(&mut self, opportunity: &Opportunity, profit: &ProfitResult, dispatched: bool) {
        if !self.persist {
            return;
        }
        if let Err(e) = storage::save_opportunity(opportunity, profit, dispatched) {
            error!("Failed to save arbitrage opportunity: {}", e);
            self.stats.record_error("save_opportunity");
        }
    }

    fn notify(&self, message: String) {
        if let Some(notifier) = &self.notifier {
            notifier.notify(message);
        }
    }

    fn log_error(&mut self, context: &str, e: &BotError) {
        self.stats.record_error(context);
        match ErrorClass::classify(e) {
            ErrorClass::Transient => debug!(context, "{}", e),
            ErrorClass::Validation => info!(context, "{}", e),
            ErrorClass::Dispatch => warn!(context, "{}", e),
            ErrorClass::Fatal => error!(context, "{}", e),
        }
    }
}

/// Time from `now` to the next 00:00 UTC.
pub fn until_next_utc_midnight(now: DateTime<Utc>) -> Duration {
    now.date_naive()
        .succ_opt()
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .and_then(|midnight| (midnight.and_utc() - now).to_std().ok())
        .unwrap_or(DAY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn midnight_is_computed_in_utc() {
        let now = Utc.with_ymd_and_hms(2024, 3, 9, 22, 30, 0).unwrap();
        assert_eq!(until_next_utc_midnight(now), Duration::from_secs(90 * 60));

        let at_midnight = Utc.with_ymd_and_hms(2024, 3, 10, 0, 0, 0).unwrap();
        assert_eq!(until_next_utc_midnight(at_midnight), DAY);
    }
}
