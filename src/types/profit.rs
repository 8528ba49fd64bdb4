//! Profit model outputs

use rust_decimal::Decimal;
use serde::Serialize;

/// Fee-adjusted economics of one trade, in units of the traded token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfitResult {
    pub gross_profit: Decimal,
    pub settlement_fee: Decimal,
    pub gas_cost: Decimal,
    pub net_profit: Decimal,
    pub net_profit_pct: Decimal,
}

/// Constant-product sizing check for a single hop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceImpact {
    pub price_impact_pct: Decimal,
    pub execution_price: Decimal,
    pub expected_output: Decimal,
}
