//! HTML message bodies for the notification channel

use rust_decimal::Decimal;
use crate::{
    bot::TradingStats,
    config::Config,
    types::{SafetyStatus, TradeOutcome},
};

pub fn startup_message(config: &Config) -> String {
    format!(
        "🤖 <b>Arbitrage bot started</b>\n\n\
         Network: {}{}\n\
         Venues: {}\n\
         Tokens: {}\n\
         Min spread: {}%\n\
         Min profit: {} {}\n\
         Max trade size: {}",
        config.chain.name,
        if config.testnet { " (testnet)" } else { "" },
        config.chain.venues.iter().map(|v| v.name.as_str()).collect::<Vec<_>>().join(", "),
        config.chain.watchlist.iter().map(|t| t.symbol.as_str()).collect::<Vec<_>>().join(", "),
        config.min_spread_pct,
        config.min_profit_threshold,
        config.chain.native_symbol,
        config.max_trade_size,
    )
}

pub fn trade_message(outcome: &TradeOutcome, symbol: &str, explorer: &str) -> String {
    if outcome.success {
        let link = outcome
            .reference
            .as_deref()
            .map(|tx| format!("\nTX: <a href=\"{}/tx/{}\">{}</a>", explorer, tx, short_hash(tx)))
            .unwrap_or_default();
        format!(
            "✅ <b>Successful Arbitrage!</b>\n\n\
             Token: <code>{}</code>\n\
             Route: {}\n\
             Profit: {} {}\n\
             Gas: {} {}\n\
             Net: {} {}{}",
            outcome.token,
            outcome.route,
            outcome.realized_profit.round_dp(6), symbol,
            outcome.gas_spent.round_dp(6), symbol,
            outcome.net().round_dp(6), symbol,
            link,
        )
    } else {
        format!(
            "❌ <b>Arbitrage failed</b>\n\n\
             Token: <code>{}</code>\n\
             Route: {}\n\
             Error: <code>{}</code>",
            outcome.token,
            outcome.route,
            escape(outcome.error_message.as_deref().unwrap_or("transaction reverted")),
        )
    }
}

pub fn stats_message(title: &str, stats: &TradingStats, safety: &SafetyStatus, symbol: &str) -> String {
    format!(
        "📈 <b>{}</b>\n\n\
         Opportunities: {}\n\
         Executed: {}\n\
         Successful: {}\n\
         Failed: {}\n\
         Total Profit: {} {}\n\
         Total Gas: {} {}\n\
         Net Profit: {} {}\n\
         Loss today: {} / {}\n\
         Trades left this hour: {}",
        title,
        stats.total_opportunities,
        stats.executed_trades,
        stats.successful_trades,
        stats.failed_trades,
        stats.total_profit.round_dp(6), symbol,
        stats.total_gas_spent.round_dp(6), symbol,
        stats.net_profit().round_dp(6), symbol,
        safety.daily_loss.round_dp(6),
        safety.max_daily_loss,
        safety.trades_remaining(),
    )
}

pub fn halt_message(reason: &str) -> String {
    format!("🚨 <b>Trading halted</b>\n\n{}", escape(reason))
}

pub fn stopped_message(stats: &TradingStats, safety: &SafetyStatus, symbol: &str) -> String {
    let minutes = Decimal::from(stats.uptime().as_secs()) / Decimal::from(60);
    format!(
        "🛑 <b>Arbitrage bot stopped</b> after {} minutes\n\n{}",
        minutes.round_dp(1),
        stats_message("Final statistics", stats, safety, symbol)
    )
}

fn short_hash(hash: &str) -> String {
    if hash.len() > 14 {
        format!("{}…{}", &hash[..8], &hash[hash.len() - 6..])
    } else {
        hash.to_string()
    }
}

/// Minimal escaping for text interpolated into Telegram HTML.
fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::Address;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn outcome(success: bool) -> TradeOutcome {
        TradeOutcome {
            opportunity_id: "id".to_string(),
            token: Address::ZERO,
            route: "uniswapV2 → sushiswap".to_string(),
            amount: dec!(1),
            timestamp: Utc::now(),
            success,
            realized_profit: dec!(0.02),
            gas_spent: dec!(0.005),
            reference: Some(format!("0x{}", "ab".repeat(32))),
            error_message: Some("revert <reason>".to_string()),
        }
    }

    #[test]
    fn success_links_to_explorer() {
        let msg = trade_message(&outcome(true), "ETH", "https://etherscan.io");
        assert!(msg.contains("Net: 0.015 ETH"));
        assert!(msg.contains("https://etherscan.io/tx/0xabab"));
    }

    #[test]
    fn failure_escapes_error_text() {
        let msg = trade_message(&outcome(false), "ETH", "https://etherscan.io");
        assert!(msg.contains("revert &lt;reason&gt;"));
    }
}
