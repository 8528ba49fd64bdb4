//! Settlement collaborator seam

use async_trait::async_trait;
use rust_decimal::Decimal;
use crate::{
    errors::BotResult,
    types::{SettlementReceipt, SettlementRequest},
};

/// Whatever actually borrows the principal and performs both swaps.
#[async_trait]
pub trait Settlement: Send + Sync {
    /// Submits one arbitrage and waits for it to resolve. A reverted transaction is an
    /// `Ok` receipt with `success == false`; `Err` means nothing usable came back.
    async fn submit(&self, request: &SettlementRequest) -> BotResult<SettlementReceipt>;

    /// Native balance available to pay gas.
    async fn operating_balance(&self) -> BotResult<Decimal>;
}
