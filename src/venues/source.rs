//! Venue price source seam

use async_trait::async_trait;
use rust_decimal::Decimal;
use crate::{
    config::{TokenInfo, VenueConfig},
    errors::BotResult,
};

/// Answers "how much of the reference asset is one whole `token` worth on `venue`".
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// `Ok(None)` means the venue has no usable market for the token.
    async fn quote(&self, venue: &VenueConfig, token: &TokenInfo) -> BotResult<Option<Decimal>>;
}
