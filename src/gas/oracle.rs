//! Cached, buffered gas price estimation

use async_trait::async_trait;
use serde::Serialize;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::{timeout, Instant};
use tracing::{debug, warn};
use crate::{
    config::{DEFAULT_GAS_PRICE_GWEI, GAS_CACHE_TTL_MS, GAS_PRICE_BUFFER_PCT, GAS_QUERY_TIMEOUT_MS},
    errors::{BotError, BotResult},
    utils::{gwei_to_wei, wei_to_gwei},
    ConcreteProvider,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Eip1559Fees {
    pub max_fee_per_gas: u128,
    pub max_priority_fee_per_gas: u128,
}

/// Network gas price feed.
#[async_trait]
pub trait GasPriceSource: Send + Sync {
    async fn gas_price(&self) -> BotResult<u128>;

    async fn eip1559_fees(&self) -> BotResult<Eip1559Fees>;
}

pub struct ProviderGasSource {
    provider: Arc<ConcreteProvider>,
}

impl ProviderGasSource {
    pub fn new(provider: Arc<ConcreteProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl GasPriceSource for ProviderGasSource {
    async fn gas_price(&self) -> BotResult<u128> {
        use alloy::providers::Provider;
        self.provider.get_gas_price().await.map_err(|e| BotError::Network {
            message: "eth_gasPrice failed".to_string(),
            source: Some(e.into()),
            retry_count: 0,
        })
    }

    async fn eip1559_fees(&self) -> BotResult<Eip1559Fees> {
        use alloy::providers::Provider;
        let estimate = self.provider.estimate_eip1559_fees(None).await.map_err(|e| BotError::Network {
            message: "fee history estimation failed".to_string(),
            source: Some(e.into()),
            retry_count: 0,
        })?;
        Ok(Eip1559Fees {
            max_fee_per_gas: estimate.max_fee_per_gas,
            max_priority_fee_per_gas: estimate.max_priority_fee_per_gas,
        })
    }
}

pub struct GasOracle {
    source: Arc<dyn GasPriceSource>,
    cached: Mutex<Option<(Instant, u128)>>,
    cache_ttl: Duration,
    query_timeout: Duration,
    buffer_pct: u128,
    fallback_wei: u128,
}

impl GasOracle {
    pub fn new(source: Arc<dyn GasPriceSource>) -> Self {
        Self {
            source,
            cached: Mutex::new(None),
            cache_ttl: Duration::from_millis(GAS_CACHE_TTL_MS),
            query_timeout: Duration::from_millis(GAS_QUERY_TIMEOUT_MS),
            buffer_pct: GAS_PRICE_BUFFER_PCT as u128,
            fallback_wei: gwei_to_wei(DEFAULT_GAS_PRICE_GWEI),
        }
    }

    /// Current gas price in wei with the inclusion buffer applied. Never fails: a query
    /// error or timeout yields the fallback price, which is not cached.
    pub async fn estimate(&self) -> u128 {
        if let Some(price) = self.cached_price() {
            return price;
        }

        let queried = match timeout(self.query_timeout, self.source.gas_price()).await {
            Ok(Ok(price)) => price,
            Ok(Err(e)) => {
                warn!("Gas price query failed, using fallback: {}", e);
                return self.fallback_wei;
            }
            Err(_) => {
                warn!("Gas price query timed out, using fallback");
                return self.fallback_wei;
            }
        };

        let buffered = queried.saturating_mul(100 + self.buffer_pct) / 100;
        if let Ok(mut cached) = self.cached.lock() {
            *cached = Some((Instant::now(), buffered));
        }
        debug!("Gas price: {} gwei", wei_to_gwei(buffered));
        buffered
    }

    pub async fn eip1559_fees(&self) -> Option<Eip1559Fees> {
        match timeout(self.query_timeout, self.source.eip1559_fees()).await {
            Ok(Ok(fees)) => Some(fees),
            Ok(Err(e)) => {
                debug!("EIP-1559 fee estimation failed: {}", e);
                None
            }
            Err(_) => None,
        }
    }

    fn cached_price(&self) -> Option<u128> {
        let cached = *self.cached.lock().ok()?;
        cached
            .filter(|(at, _)| at.elapsed() < self.cache_ttl)
            .map(|(_, price)| price)
    }
}

pub fn is_gas_price_acceptable(gas_price_wei: u128, max_gas_price_gwei: u64) -> bool {
    gas_price_wei <= gwei_to_wei(max_gas_price_gwei)
}

/// Total cost of a transaction in wei.
pub fn transaction_cost(gas_limit: u64, gas_price_wei: u128) -> u128 {
    (gas_limit as u128).saturating_mul(gas_price_wei)
}
