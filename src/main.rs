//! Flash-loan arbitrage bot - Main Entry Point

use flash_arb_bot::*;
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize logging
    let _logging_guard = utils::setup_logging()?;
    utils::setup_output_directories()?;

    // Load configuration
    let config = CONFIG.clone();

    info!("⚡ Flash-loan Arbitrage Bot v{}", env!("CARGO_PKG_VERSION"));
    if let Err(e) = config.validate() {
        error!("❌ {}", e);
        return Err(e.into());
    }

    // Setup network provider
    let provider = network::setup_provider(&config).await?;

    let private_key = config.private_key.as_deref().context("PRIVATE_KEY is required")?;
    let contract = config
        .arbitrage_contract
        .context("ARBITRAGE_CONTRACT_ADDRESS is required")?;
    let settlement = execution::ContractSettlement::new(
        provider.clone(),
        private_key,
        contract,
        config.chain_id(),
    )?;
    info!("👛 Operator: {}", settlement.operator());

    let aggregator = venues::PriceAggregator::new(
        Arc::new(venues::OnChainPriceSource::new(
            provider.clone(),
            config.chain.wrapped_native.clone(),
        )),
        config.chain.venues.clone(),
    );
    let gas = gas::GasOracle::new(Arc::new(gas::ProviderGasSource::new(provider.clone())));

    let sink: Arc<dyn notify::NotificationSink> = match (
        config.telegram_bot_token.as_deref(),
        config.telegram_chat_id.as_deref(),
    ) {
        (Some(token), Some(chat_id)) => {
            info!("📨 Telegram notifications enabled");
            Arc::new(notify::TelegramNotifier::new(token, chat_id)?)
        }
        _ => {
            warn!("Telegram not configured, notifications go to the log only");
            Arc::new(notify::LogSink)
        }
    };
    let (notifier, notifier_task) = notify::Notifier::spawn(sink, notify::NOTIFICATION_QUEUE_SIZE);

    let mut bot = bot::ArbitrageBot::new(config, aggregator, gas, Arc::new(settlement))
        .with_notifier(notifier);

    // Setup shutdown handler
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            return;
        }
        info!("\n📛 Received shutdown signal (Ctrl+C)...");
        let _ = shutdown_tx.send(());
    });

    bot.run(async {
        if shutdown_rx.await.is_err() {
            std::future::pending::<()>().await;
        }
    })
    .await;

    // Let queued notifications, including the final statistics, go out
    drop(bot);
    if tokio::time::timeout(Duration::from_secs(10), notifier_task).await.is_err() {
        warn!("Timed out flushing notifications");
    }

    Ok(())
}
