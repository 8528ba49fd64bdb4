//! Trade dispatch and outcome types

use alloy::primitives::{Address, Bytes};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

/// What the settlement contract is asked to do.
#[derive(Debug, Clone)]
pub struct SettlementRequest {
    pub token: Address,
    pub amount: Decimal,
    pub token_decimals: u32,
    pub gas_price_wei: u128,
    pub encoded_path: Bytes,
}

/// What the settlement collaborator reports once the transaction resolves.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SettlementReceipt {
    pub success: bool,
    /// Realized profit in native units; negative for a loss.
    pub realized_profit: Decimal,
    pub gas_spent: Decimal,
    pub reference: Option<String>,
}

/// Immutable record of a dispatched trade.
#[derive(Debug, Clone, Serialize)]
pub struct TradeOutcome {
    pub opportunity_id: String,
    pub token: Address,
    pub route: String,
    pub amount: Decimal,
    pub timestamp: DateTime<Utc>,
    pub success: bool,
    pub realized_profit: Decimal,
    pub gas_spent: Decimal,
    pub reference: Option<String>,
    pub error_message: Option<String>,
}

impl TradeOutcome {
    pub fn net(&self) -> Decimal {
        self.realized_profit - self.gas_spent
    }

    /// Loss to charge against the risk gate, if any.
    pub fn realized_loss(&self) -> Option<Decimal> {
        let net = self.net();
        if net < Decimal::ZERO { Some(-net) } else { None }
    }
}
