//! Venue price quotes

use alloy::primitives::Address;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

/// One venue's rate for a token against the reference asset. `rate` is `None` when the
/// venue reverted, timed out or had no liquidity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceQuote {
    pub venue: String,
    pub token: Address,
    pub rate: Option<Decimal>,
    pub timestamp: DateTime<Utc>,
}

impl PriceQuote {
    pub fn available(venue: &str, token: Address, rate: Decimal) -> Self {
        Self {
            venue: venue.to_string(),
            token,
            rate: Some(rate),
            timestamp: Utc::now(),
        }
    }

    pub fn absent(venue: &str, token: Address) -> Self {
        Self {
            venue: venue.to_string(),
            token,
            rate: None,
            timestamp: Utc::now(),
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self.rate, Some(rate) if rate > Decimal::ZERO)
    }
}

/// Every configured venue's quote for a single token, in venue configuration order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSnapshot {
    pub token: Address,
    pub quotes: Vec<PriceQuote>,
    pub fetched_at: DateTime<Utc>,
}

impl PriceSnapshot {
    pub fn rate(&self, venue: &str) -> Option<Decimal> {
        self.quotes
            .iter()
            .find(|q| q.venue == venue)
            .and_then(|q| q.rate)
    }

    pub fn valid_quotes(&self) -> impl Iterator<Item = &PriceQuote> {
        self.quotes.iter().filter(|q| q.is_valid())
    }

    pub fn available_count(&self) -> usize {
        self.valid_quotes().count()
    }
}
