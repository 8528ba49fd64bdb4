//! Arbitrage opportunity types

use alloy::primitives::Address;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::time::Duration;
use tokio::time::Instant;

/// A buy-low/sell-high pair for one token across two venues.
#[derive(Debug, Clone, Serialize)]
pub struct Opportunity {
    pub id: String,
    pub token: Address,
    pub buy_venue: String,
    pub sell_venue: String,
    pub buy_rate: Decimal,
    pub sell_rate: Decimal,
    pub spread_pct: Decimal,
    pub timestamp: DateTime<Utc>,
    #[serde(skip)]
    pub detected_at: Instant,
}

impl Opportunity {
    pub fn age(&self) -> Duration {
        self.detected_at.elapsed()
    }

    pub fn is_valid(&self, max_age: Duration) -> bool {
        self.age() < max_age
    }

    pub fn route(&self) -> String {
        format!("{} → {}", self.buy_venue, self.sell_venue)
    }
}
