//! Swap route encoding for the settlement contract

use alloy::{
    primitives::{Address, Bytes, aliases::U24},
    sol,
    sol_types::SolValue,
};
use crate::config::VenueConfig;

sol! {
    /// Decoded on-chain as `abi.decode(data, (address[], address[], uint24[], bool))`.
    #[derive(Debug, PartialEq)]
    struct ArbitragePath {
        address[] path;
        address[] routers;
        uint24[] fees;
        bool reverse;
    }
}

/// Route that buys `token` with the wrapped native asset on `buy` and sells it back on `sell`.
pub fn build_arbitrage_path(
    token: Address,
    wrapped_native: Address,
    buy: &VenueConfig,
    sell: &VenueConfig,
) -> ArbitragePath {
    ArbitragePath {
        path: vec![token, wrapped_native, token],
        routers: vec![buy.router, sell.router],
        fees: vec![
            U24::saturating_from(buy.fee_tier()),
            U24::saturating_from(sell.fee_tier()),
        ],
        reverse: false,
    }
}

pub fn encode_arbitrage_path(
    token: Address,
    wrapped_native: Address,
    buy: &VenueConfig,
    sell: &VenueConfig,
) -> Bytes {
    build_arbitrage_path(token, wrapped_native, buy, sell)
        .abi_encode_params()
        .into()
}
