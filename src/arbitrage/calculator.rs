//! Fee-, gas- and slippage-aware profit model

use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use crate::{
    config::{VenueConfig, DEFAULT_TRADE_SIZE, SETTLEMENT_GAS_LIMIT},
    types::{Opportunity, PriceImpact, ProfitResult},
    utils::{gas_cost_native, pow10},
};

pub const DEFAULT_VENUE_FEE: Decimal = dec!(0.003);

#[derive(Debug, Clone)]
pub struct ProfitModel {
    venue_fees: HashMap<String, Decimal>,
    settlement_fee_rate: Decimal,
    gas_limit: u64,
    max_trade_size: Decimal,
    min_profit: Decimal,
}

impl ProfitModel {
    pub fn new(
        venues: &[VenueConfig],
        settlement_fee_rate: Decimal,
        max_trade_size: Decimal,
        min_profit: Decimal,
    ) -> Self {
        Self {
            venue_fees: venues.iter().map(|v| (v.key.clone(), v.fee)).collect(),
            settlement_fee_rate,
            gas_limit: SETTLEMENT_GAS_LIMIT,
            max_trade_size,
            min_profit,
        }
    }

    pub fn venue_fee(&self, venue: &str) -> Decimal {
        self.venue_fees.get(venue).copied().unwrap_or(DEFAULT_VENUE_FEE)
    }

    pub fn gas_limit(&self) -> u64 {
        self.gas_limit
    }

    /// Amount returned after buying on the cheap venue and selling on the expensive one,
    /// both swap fees included.
    fn final_amount(&self, opportunity: &Opportunity, trade_amount: Decimal) -> Decimal {
        let buy_fee = self.venue_fee(&opportunity.buy_venue);
        let sell_fee = self.venue_fee(&opportunity.sell_venue);

        let effective_in = trade_amount * (Decimal::ONE - buy_fee);
        let converted = (effective_in * opportunity.sell_rate)
            .checked_div(opportunity.buy_rate)
            .unwrap_or(Decimal::ZERO);
        converted * (Decimal::ONE - sell_fee)
    }

    fn settlement_fee(&self, trade_amount: Decimal) -> Decimal {
        trade_amount * self.settlement_fee_rate
    }

    pub fn score(&self, opportunity: &Opportunity, trade_amount: Decimal, gas_price_wei: u128) -> ProfitResult {
        let final_amount = self.final_amount(opportunity, trade_amount);
        let gross_profit = final_amount - trade_amount;
        let settlement_fee = self.settlement_fee(trade_amount);
        let gas_cost = gas_cost_native(gas_price_wei, self.gas_limit);
        let net_profit = gross_profit - settlement_fee - gas_cost;
        let net_profit_pct = net_profit
            .checked_div(trade_amount)
            .map(|r| r * dec!(100))
            .unwrap_or(Decimal::ZERO);

        ProfitResult {
            gross_profit,
            settlement_fee,
            gas_cost,
            net_profit,
            net_profit_pct,
        }
    }

    /// Gas price in wei at which `score` nets exactly zero. Zero when fees alone eat the
    /// spread.
    pub fn break_even_gas_price(&self, opportunity: &Opportunity, trade_amount: Decimal) -> Decimal {
        let before_gas = self.final_amount(opportunity, trade_amount)
            - trade_amount
            - self.settlement_fee(trade_amount);
        if before_gas <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        before_gas * pow10(18) / Decimal::from(self.gas_limit)
    }

    pub fn is_profitable(&self, opportunity: &Opportunity, gas_price_wei: u128) -> bool {
        let profit = self.score(opportunity, self.optimal_trade_amount(), gas_price_wei);
        profit.net_profit > self.min_profit
    }

    pub fn clears_min_profit(&self, profit: &ProfitResult) -> bool {
        profit.net_profit > self.min_profit
    }

    /// Fixed one-unit trade capped at the configured maximum. Venue liquidity is not
    /// consulted.
    pub fn optimal_trade_amount(&self) -> Decimal {
        DEFAULT_TRADE_SIZE.min(self.max_trade_size)
    }

    /// Largest size that stays within 80% of `available_liquidity` and the configured maximum.
    pub fn optimal_trade_size(&self, available_liquidity: Decimal) -> Decimal {
        self.max_trade_size.min(available_liquidity * dec!(0.8))
    }

    /// 0-100, half from the net percentage and half from the absolute net profit.
    pub fn profitability_score(&self, opportunity: &Opportunity, gas_price_wei: u128) -> Decimal {
        let profit = self.score(opportunity, self.optimal_trade_amount(), gas_price_wei);
        let pct_score = (profit.net_profit_pct * dec!(10)).min(dec!(50));
        let amount_score = (profit.net_profit * dec!(10)).min(dec!(50));
        pct_score + amount_score
    }
}

/// Linear slippage estimate: share of the pool consumed, in percent.
pub fn estimate_slippage(trade_amount: Decimal, liquidity: Decimal) -> Option<Decimal> {
    trade_amount.checked_div(liquidity).map(|r| r * dec!(100))
}

/// Constant-product swap with the 0.3% fee folded in as 997/1000.
pub fn price_impact(amount_in: Decimal, reserve_in: Decimal, reserve_out: Decimal) -> Option<PriceImpact> {
    if amount_in <= Decimal::ZERO || reserve_in <= Decimal::ZERO || reserve_out <= Decimal::ZERO {
        return None;
    }

    let amount_in_with_fee = amount_in * dec!(997);
    let numerator = amount_in_with_fee * reserve_out;
    let denominator = reserve_in * dec!(1000) + amount_in_with_fee;
    let expected_output = numerator.checked_div(denominator)?;

    let execution_price = expected_output / amount_in;
    let spot_price = reserve_out / reserve_in;
    let price_impact_pct = (spot_price - execution_price) / spot_price * dec!(100);

    Some(PriceImpact {
        price_impact_pct,
        execution_price,
        expected_output,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::gwei_to_wei;
    use alloy::primitives::Address;
    use chrono::Utc;
    use proptest::prelude::*;
    use tokio::time::Instant;

    fn opportunity(buy_rate: Decimal, sell_rate: Decimal) -> Opportunity {
        Opportunity {
            id: "test".to_string(),
            token: Address::ZERO,
            buy_venue: "a".to_string(),
            sell_venue: "c".to_string(),
            buy_rate,
            sell_rate,
            spread_pct: (sell_rate - buy_rate) / buy_rate * dec!(100),
            timestamp: Utc::now(),
            detected_at: Instant::now(),
        }
    }

    fn model() -> ProfitModel {
        ProfitModel::new(&[], dec!(0.0009), dec!(10), dec!(0.001))
    }

    #[test]
    fn is_profitable_accounts_for_gas() {
        let opp = opportunity(dec!(100), dec!(102));
        let model = model();
        assert!(model.is_profitable(&opp, 0));
        // 500k gas at 1000 gwei costs 0.5 native, far more than the spread
        assert!(!model.is_profitable(&opp, gwei_to_wei(1000)));
        assert!(!model.is_profitable(&opportunity(dec!(100), dec!(100.5)), 0));
    }

    #[test]
    fn score_matches_closed_form_before_gas() {
        let opp = opportunity(dec!(100), dec!(102));
        let result = model().score(&opp, dec!(1), 0);

        // 1 * 0.997 * 102 / 100 * 0.997
        assert_eq!(result.gross_profit, dec!(0.01388918));
        assert_eq!(result.settlement_fee, dec!(0.0009));
        assert_eq!(result.gas_cost, Decimal::ZERO);
        assert_eq!(result.net_profit, dec!(0.01298918));
        assert_eq!(result.net_profit_pct, dec!(1.298918));
    }

    #[test]
    fn gas_cost_uses_fixed_limit() {
        let opp = opportunity(dec!(100), dec!(102));
        let result = model().score(&opp, dec!(1), gwei_to_wei(10));
        // 10 gwei * 500k = 0.005
        assert_eq!(result.gas_cost, dec!(0.005));
        assert_eq!(result.net_profit, dec!(0.00798918));
    }

    #[test]
    fn score_is_deterministic() {
        let opp = opportunity(dec!(0.000312), dec!(0.000318));
        let m = model();
        assert_eq!(m.score(&opp, dec!(2.5), 12_345), m.score(&opp, dec!(2.5), 12_345));
    }

    #[test]
    fn break_even_gas_zeroes_net_profit() {
        let opp = opportunity(dec!(100), dec!(102));
        let m = model();
        let break_even = m.break_even_gas_price(&opp, dec!(1));
        // 0.01298918 * 1e18 / 500000
        assert_eq!(break_even, dec!(25978360000));
        let at_break_even = m.score(&opp, dec!(1), 25_978_360_000);
        assert_eq!(at_break_even.net_profit, Decimal::ZERO);
    }

    #[test]
    fn break_even_is_zero_when_fees_exceed_spread() {
        let opp = opportunity(dec!(100), dec!(100.5));
        assert_eq!(model().break_even_gas_price(&opp, dec!(1)), Decimal::ZERO);
    }

    #[test]
    fn price_impact_matches_constant_product() {
        let impact = price_impact(dec!(10), dec!(1000), dec!(1000)).unwrap();
        let expected = dec!(9970) * dec!(1000) / (dec!(1000000) + dec!(9970));
        assert_eq!(impact.expected_output, expected);
        assert_eq!(impact.execution_price, expected / dec!(10));
        assert_eq!(impact.price_impact_pct, (dec!(1) - expected / dec!(10)) * dec!(100));
        assert!(impact.expected_output > dec!(9.87) && impact.expected_output < dec!(9.88));
    }

    #[test]
    fn price_impact_rejects_empty_pool() {
        assert!(price_impact(dec!(1), Decimal::ZERO, dec!(10)).is_none());
        assert!(price_impact(Decimal::ZERO, dec!(10), dec!(10)).is_none());
    }

    #[test]
    fn trade_sizing_is_capped() {
        let m = ProfitModel::new(&[], dec!(0.0009), dec!(0.5), dec!(0.001));
        assert_eq!(m.optimal_trade_amount(), dec!(0.5));
        assert_eq!(model().optimal_trade_amount(), dec!(1));
        assert_eq!(model().optimal_trade_size(dec!(5)), dec!(4));
        assert_eq!(model().optimal_trade_size(dec!(100)), dec!(10));
        assert_eq!(estimate_slippage(dec!(1), dec!(200)), Some(dec!(0.5)));
    }

    #[test]
    fn per_venue_fees_are_applied() {
        let venues = crate::config::ChainConfig::for_chain(crate::config::Chain::Bnb).venues;
        let m = ProfitModel::new(&venues, dec!(0.0009), dec!(10), dec!(0.001));
        assert_eq!(m.venue_fee("biswap"), dec!(0.001));
        assert_eq!(m.venue_fee("unknown"), DEFAULT_VENUE_FEE);
    }

    #[test]
    fn profitability_score_caps_percentage_component() {
        // ~49% net on one unit: percentage half saturates, absolute half does not
        let rich = model().profitability_score(&opportunity(dec!(100), dec!(150)), 0);
        assert!(rich > dec!(50) && rich < dec!(100));

        let flat = model().profitability_score(&opportunity(dec!(100), dec!(100)), 0);
        assert!(flat < Decimal::ZERO);
    }

    proptest! {
        #[test]
        fn net_profit_decreases_with_gas(low in 0u64..1_000_000_000_000, bump in 1u64..1_000_000_000_000) {
            let opp = opportunity(dec!(100), dec!(102));
            let m = model();
            let cheap = m.score(&opp, dec!(1), low as u128);
            let pricey = m.score(&opp, dec!(1), (low + bump) as u128);
            prop_assert!(pricey.net_profit < cheap.net_profit);
        }
    }
}
