//! Display and printing utilities

use rust_decimal::prelude::ToPrimitive;
use tracing::{error, info, warn};
use crate::{
    bot::TradingStats,
    types::{BreakerStatus, Opportunity, ProfitResult, SafetyStatus, TradeOutcome},
};

pub fn print_session_stats(stats: &TradingStats, safety: &SafetyStatus, native_symbol: &str) {
    let runtime = stats.uptime().as_secs() / 60;

    info!("\n📊 Session Statistics ({} minutes)", runtime);
    info!("   📈 OPPORTUNITIES:");
    info!("     Total found: {}", stats.total_opportunities);
    info!("     Profitable after fees: {}", stats.profitable_opportunities);
    info!("     Rejected by risk gate: {}", stats.rejected_trades);

    info!("   🚀 TRADES:");
    info!("     Executed: {}", stats.executed_trades);
    info!("     Successful: {}", stats.successful_trades);
    info!("     Failed: {}", stats.failed_trades);
    info!("     Success rate: {:.1}%", stats.success_rate());
    info!("     Net profit: {:.6} {}", stats.net_profit(), native_symbol);

    info!("   ⚙️  SAFETY:");
    info!("     Circuit breaker: {}",
        match safety.breaker {
            BreakerStatus::Open => "OPEN",
            BreakerStatus::Closed => "CLOSED",
        }
    );
    info!("     Trades remaining this hour: {}", safety.trades_remaining());
    info!("     Loss today: {} / {}", safety.daily_loss, safety.max_daily_loss);

    if !stats.error_counts.is_empty() {
        info!("     Error summary:");
        for (error_type, count) in stats.error_counts.iter() {
            info!("       {}: {}", error_type, count);
        }
    }

    info!("");
}

pub fn print_opportunity(opportunity: &Opportunity, profit: &ProfitResult, native_symbol: &str) {
    warn!("\n🎯 ARBITRAGE OPPORTUNITY #{}", opportunity.id);
    warn!("📍 Token: {}", opportunity.token);
    warn!("📋 Route: {}", opportunity.route());
    warn!("💰 Profit Analysis:");
    warn!("   Buy Rate:  {:.8}", opportunity.buy_rate.to_f64().unwrap_or_default());
    warn!("   Sell Rate: {:.8}", opportunity.sell_rate.to_f64().unwrap_or_default());
    warn!("   Spread: {:.3}%", opportunity.spread_pct.to_f64().unwrap_or_default());
    warn!("   Gross: {:.6}", profit.gross_profit.to_f64().unwrap_or_default());
    warn!("   Settlement fee: {:.6}", profit.settlement_fee.to_f64().unwrap_or_default());
    warn!("   Gas: {:.6} {}", profit.gas_cost.to_f64().unwrap_or_default(), native_symbol);
    warn!("   Net: {:.6} ({:.3}%)",
        profit.net_profit.to_f64().unwrap_or_default(),
        profit.net_profit_pct.to_f64().unwrap_or_default()
    );
}

pub fn print_trade_outcome(outcome: &TradeOutcome, native_symbol: &str) {
    if outcome.success {
        warn!("\n✅ TRADE SETTLED for opportunity #{}", outcome.opportunity_id);
        warn!("   Route: {}", outcome.route);
        warn!("   Amount: {}", outcome.amount);
        if let Some(reference) = &outcome.reference {
            warn!("   Tx Hash: {}", reference);
        }
        warn!("   Profit: {:.6} {}", outcome.realized_profit.to_f64().unwrap_or_default(), native_symbol);
        warn!("   Gas: {:.6} {}", outcome.gas_spent.to_f64().unwrap_or_default(), native_symbol);
    } else {
        error!("\n❌ TRADE FAILED for opportunity #{}", outcome.opportunity_id);
        error!("   Route: {}", outcome.route);
        error!("   Error: {}", outcome.error_message.as_deref().unwrap_or("Unknown"));
    }
}
