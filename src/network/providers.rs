//! RPC provider setup

use alloy::providers::{Provider, ProviderBuilder};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};
use crate::{
    config::Config,
    network::retry::{retry_with_backoff, RetryConfig},
    ConcreteProvider,
};

pub async fn setup_provider(config: &Config) -> Result<Arc<ConcreteProvider>> {
    let rpc_url = config.rpc_url.as_ref()
        .context("RPC_URL is required")?;

    let provider: Arc<ConcreteProvider> = Arc::new(
        ProviderBuilder::new()
            .on_http(rpc_url.parse()?)
            .boxed()
    );

    info!("🔗 Testing connection to {}...", config.chain.name);
    let block = retry_with_backoff(
        || async {
            provider.get_block_number().await
                .context("Failed to get block number")
        },
        &RetryConfig::startup(),
        "RPC connection",
    ).await
    .map_err(|e| {
        warn!("⚠️ Network connection attempt failed: {}", e);
        anyhow::anyhow!("Network connection failed: {}", e)
    })?;

    let chain_id = provider.get_chain_id().await
        .context("Failed to read chain id")?;
    if chain_id != config.chain_id() {
        warn!("⚠️ RPC reports chain id {} but {} expects {}",
            chain_id, config.chain.name, config.chain_id());
    }

    info!("✅ Connected to {} at block {}", config.chain.name, block);
    Ok(provider)
}
