//! Multi-venue price aggregation with a short-lived per-token cache

use alloy::primitives::Address;
use chrono::Utc;
use futures::future::join_all;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::{timeout, Instant};
use tracing::debug;
use crate::{
    config::{TokenInfo, VenueConfig, PRICE_CACHE_TTL_MS, VENUE_QUERY_TIMEOUT_MS},
    types::{PriceQuote, PriceSnapshot},
    venues::PriceSource,
};

struct CachedSnapshot {
    fetched: Instant,
    snapshot: PriceSnapshot,
}

pub struct PriceAggregator {
    source: Arc<dyn PriceSource>,
    venues: Vec<VenueConfig>,
    cache: Mutex<HashMap<Address, CachedSnapshot>>,
    cache_ttl: Duration,
    query_timeout: Duration,
}

impl PriceAggregator {
    pub fn new(source: Arc<dyn PriceSource>, venues: Vec<VenueConfig>) -> Self {
        Self {
            source,
            venues,
            cache: Mutex::new(HashMap::new()),
            cache_ttl: Duration::from_millis(PRICE_CACHE_TTL_MS),
            query_timeout: Duration::from_millis(VENUE_QUERY_TIMEOUT_MS),
        }
    }

    pub fn with_query_timeout(mut self, query_timeout: Duration) -> Self {
        self.query_timeout = query_timeout;
        self
    }

    pub fn venues(&self) -> &[VenueConfig] {
        &self.venues
    }

    /// Quotes `token` on every venue. Venues that fail, time out or lack liquidity come
    /// back as absent quotes; a fresh cached snapshot is returned as-is.
    pub async fn fetch_prices(&self, token: &TokenInfo) -> PriceSnapshot {
        if let Some(cached) = self.cached(token.address) {
            return cached;
        }

        let quotes = join_all(
            self.venues
                .iter()
                .map(|venue| self.query_venue(venue, token)),
        )
        .await;

        let snapshot = PriceSnapshot {
            token: token.address,
            quotes,
            fetched_at: Utc::now(),
        };
        debug!(
            token = %token.symbol,
            available = snapshot.available_count(),
            venues = self.venues.len(),
            "Prices fetched"
        );

        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(token.address, CachedSnapshot {
                fetched: Instant::now(),
                snapshot: snapshot.clone(),
            });
        }
        snapshot
    }

    pub fn clear_cache(&self) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.clear();
        }
    }

    fn cached(&self, token: Address) -> Option<PriceSnapshot> {
        let cache = self.cache.lock().ok()?;
        cache
            .get(&token)
            .filter(|entry| entry.fetched.elapsed() < self.cache_ttl)
            .map(|entry| entry.snapshot.clone())
    }

    async fn query_venue(&self, venue: &VenueConfig, token: &TokenInfo) -> PriceQuote {
        match timeout(self.query_timeout, self.source.quote(venue, token)).await {
            Ok(Ok(Some(rate))) if rate.is_sign_positive() && !rate.is_zero() => {
                PriceQuote::available(&venue.key, token.address, rate)
            }
            Ok(Ok(_)) => {
                debug!(venue = %venue.key, token = %token.symbol, "No liquidity");
                PriceQuote::absent(&venue.key, token.address)
            }
            Ok(Err(e)) => {
                debug!(venue = %venue.key, token = %token.symbol, "Venue query failed: {}", e);
                PriceQuote::absent(&venue.key, token.address)
            }
            Err(_) => {
                debug!(venue = %venue.key, token = %token.symbol,
                    "Venue query timed out after {:?}", self.query_timeout);
                PriceQuote::absent(&venue.key, token.address)
            }
        }
    }
}
