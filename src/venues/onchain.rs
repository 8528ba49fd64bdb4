//! On-chain venue quotes through pair reserves and quoter contracts

use alloy::{
    primitives::{Address, Bytes, U256, aliases::{U24, U160}, keccak256},
    providers::Provider,
    rpc::types::eth::TransactionRequest,
    sol,
    sol_types::{SolCall, SolValue},
};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::debug;
use crate::{
    config::{TokenInfo, VenueConfig, VenueKind},
    errors::{BotError, BotResult},
    utils::u256_to_decimal,
    venues::PriceSource,
    ConcreteProvider,
};

/// Fee tiers tried in order against a V3 quoter; the first that quotes wins.
pub const V3_FEE_TIERS: [u32; 4] = [500, 2500, 3000, 10000];

sol! {
    interface IUniswapV2Factory {
        function getPair(address tokenA, address tokenB) external view returns (address pair);
    }

    interface IUniswapV2Pair {
        function token0() external view returns (address);
    }

    interface IQuoter {
        function quoteExactInputSingle(
            address tokenIn,
            address tokenOut,
            uint24 fee,
            uint256 amountIn,
            uint160 sqrtPriceLimitX96
        ) external returns (uint256 amountOut);
    }
}

pub struct OnChainPriceSource {
    provider: Arc<ConcreteProvider>,
    reference: TokenInfo,
}

impl OnChainPriceSource {
    pub fn new(provider: Arc<ConcreteProvider>, reference: TokenInfo) -> Self {
        Self { provider, reference }
    }

    async fn eth_call(&self, to: Address, data: Vec<u8>) -> BotResult<Bytes> {
        let tx = TransactionRequest::default().to(to).input(data.into());
        self.provider.call(&tx).await.map_err(|e| BotError::Contract {
            contract: to,
            message: "eth_call failed".to_string(),
            source: e.into(),
        })
    }

    async fn v2_rate(&self, factory: Address, token: &TokenInfo) -> BotResult<Option<Decimal>> {
        let call = IUniswapV2Factory::getPairCall {
            tokenA: token.address,
            tokenB: self.reference.address,
        };
        let raw = self.eth_call(factory, call.abi_encode()).await?;
        let pair = IUniswapV2Factory::getPairCall::abi_decode_returns(&raw, true)
            .map_err(|e| decode_error("getPair", e.into()))?
            .pair;
        if pair == Address::ZERO {
            return Ok(None);
        }

        let reserves_raw = self.eth_call(pair, keccak256("getReserves()")[..4].to_vec()).await?;
        let (reserve0, reserve1, _) = <(U256, U256, U256)>::abi_decode(&reserves_raw, true)
            .map_err(|e| decode_error("getReserves", e.into()))?;
        if reserve0.is_zero() || reserve1.is_zero() {
            return Ok(None);
        }

        let token0_raw = self.eth_call(pair, IUniswapV2Pair::token0Call {}.abi_encode()).await?;
        let token0 = IUniswapV2Pair::token0Call::abi_decode_returns(&token0_raw, true)
            .map_err(|e| decode_error("token0", e.into()))?
            ._0;

        let (token_reserve, reference_reserve) = if token0 == token.address {
            (reserve0, reserve1)
        } else {
            (reserve1, reserve0)
        };
        Ok(reserve_ratio(
            token_reserve,
            token.decimals,
            reference_reserve,
            self.reference.decimals,
        ))
    }

    async fn v3_rate(&self, quoter: Address, token: &TokenInfo) -> BotResult<Option<Decimal>> {
        let amount_in = U256::from(10u64).pow(U256::from(token.decimals));

        for fee in V3_FEE_TIERS {
            let call = IQuoter::quoteExactInputSingleCall {
                tokenIn: token.address,
                tokenOut: self.reference.address,
                fee: U24::saturating_from(fee),
                amountIn: amount_in,
                sqrtPriceLimitX96: U160::ZERO,
            };
            let raw = match self.eth_call(quoter, call.abi_encode()).await {
                Ok(raw) => raw,
                Err(e) => {
                    debug!("Quoter reverted for fee tier {}: {}", fee, e);
                    continue;
                }
            };
            let Ok(decoded) = IQuoter::quoteExactInputSingleCall::abi_decode_returns(&raw, true) else {
                continue;
            };
            if decoded.amountOut.is_zero() {
                continue;
            }
            return Ok(u256_to_decimal(decoded.amountOut, self.reference.decimals));
        }

        Ok(None)
    }
}

#[async_trait]
impl PriceSource for OnChainPriceSource {
    async fn quote(&self, venue: &VenueConfig, token: &TokenInfo) -> BotResult<Option<Decimal>> {
        if token.address == self.reference.address {
            return Ok(None);
        }
        match venue.kind {
            VenueKind::V2 { factory } => self.v2_rate(factory, token).await,
            VenueKind::V3 { quoter } => self.v3_rate(quoter, token).await,
        }
    }
}

/// Price of one whole token in reference units from raw pair reserves.
pub fn reserve_ratio(
    token_reserve: U256,
    token_decimals: u32,
    reference_reserve: U256,
    reference_decimals: u32,
) -> Option<Decimal> {
    let token_amount = u256_to_decimal(token_reserve, token_decimals)?;
    let reference_amount = u256_to_decimal(reference_reserve, reference_decimals)?;
    if token_amount.is_zero() {
        return None;
    }
    reference_amount.checked_div(token_amount)
}

fn decode_error(context: &str, source: anyhow::Error) -> BotError {
    BotError::DataParsing {
        context: format!("failed to decode {} response", context),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn reserve_ratio_normalizes_decimals() {
        // 2,000,000 USDC (6 decimals) against 1,000 WETH (18 decimals)
        let usdc = U256::from(2_000_000_000_000u64);
        let weth = U256::from(1_000u64) * U256::from(10u64).pow(U256::from(18u64));
        assert_eq!(reserve_ratio(usdc, 6, weth, 18), Some(dec!(0.0005)));
    }

    #[test]
    fn reserve_ratio_rejects_empty_side() {
        assert_eq!(reserve_ratio(U256::ZERO, 18, U256::from(5u64), 18), None);
    }

    #[test]
    fn fee_tiers_are_tried_cheapest_first() {
        assert!(V3_FEE_TIERS.windows(2).all(|w| w[0] < w[1]));
    }
}
