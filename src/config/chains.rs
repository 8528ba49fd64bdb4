//! Chain presets: venues, flash loan provider and watched tokens

use alloy::primitives::{Address, address};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::errors::BotError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Chain {
    Ethereum,
    Bnb,
}

impl FromStr for Chain {
    type Err = BotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ethereum" | "eth" | "mainnet" => Ok(Chain::Ethereum),
            "bnb" | "bsc" => Ok(Chain::Bnb),
            other => Err(BotError::Config(format!(
                "unsupported chain '{}' (supported: ethereum, bnb)",
                other
            ))),
        }
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Chain::Ethereum => write!(f, "ethereum"),
            Chain::Bnb => write!(f, "bnb"),
        }
    }
}

/// How a venue is asked for a price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum VenueKind {
    /// Constant-product pair discovered through a factory; price is the reserve ratio.
    V2 { factory: Address },
    /// Concentrated-liquidity pool priced through a static quoter call.
    V3 { quoter: Address },
}

#[derive(Debug, Clone, Serialize)]
pub struct VenueConfig {
    pub key: String,
    pub name: String,
    pub router: Address,
    pub kind: VenueKind,
    /// Swap fee as a fraction, 0.003 = 0.3%.
    pub fee: Decimal,
}

impl VenueConfig {
    pub fn v2(key: &str, name: &str, router: Address, factory: Address, fee: Decimal) -> Self {
        Self {
            key: key.to_string(),
            name: name.to_string(),
            router,
            kind: VenueKind::V2 { factory },
            fee,
        }
    }

    pub fn v3(key: &str, name: &str, router: Address, quoter: Address, fee: Decimal) -> Self {
        Self {
            key: key.to_string(),
            name: name.to_string(),
            router,
            kind: VenueKind::V3 { quoter },
            fee,
        }
    }

    /// Fee tier in hundredths of a basis point, as pool contracts expect (0.3% -> 3000).
    pub fn fee_tier(&self) -> u32 {
        use rust_decimal::prelude::ToPrimitive;
        (self.fee * dec!(1_000_000)).round().to_u32().unwrap_or(3000)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenInfo {
    pub symbol: String,
    pub address: Address,
    pub decimals: u32,
}

impl TokenInfo {
    pub fn new(symbol: &str, address: Address, decimals: u32) -> Self {
        Self {
            symbol: symbol.to_string(),
            address,
            decimals,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FlashloanProvider {
    pub name: String,
    pub address: Address,
    /// Fee charged on borrowed principal, 0.0009 = 0.09%.
    pub fee: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChainConfig {
    pub chain: Chain,
    pub name: String,
    pub chain_id: u64,
    pub testnet_chain_id: u64,
    pub native_symbol: String,
    pub block_explorer: String,
    pub flashloan_provider: FlashloanProvider,
    pub wrapped_native: TokenInfo,
    pub venues: Vec<VenueConfig>,
    pub watchlist: Vec<TokenInfo>,
}

impl ChainConfig {
    pub fn for_chain(chain: Chain) -> Self {
        match chain {
            Chain::Ethereum => ethereum(),
            Chain::Bnb => bnb_chain(),
        }
    }

    pub fn venue(&self, key: &str) -> Option<&VenueConfig> {
        self.venues.iter().find(|v| v.key == key)
    }

    pub fn token(&self, address: Address) -> Option<&TokenInfo> {
        if self.wrapped_native.address == address {
            return Some(&self.wrapped_native);
        }
        self.watchlist.iter().find(|t| t.address == address)
    }
}

fn ethereum() -> ChainConfig {
    let weth = TokenInfo::new("WETH", address!("C02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2"), 18);
    ChainConfig {
        chain: Chain::Ethereum,
        name: "Ethereum".to_string(),
        chain_id: 1,
        testnet_chain_id: 5,
        native_symbol: "ETH".to_string(),
        block_explorer: "https://etherscan.io".to_string(),
        flashloan_provider: FlashloanProvider {
            name: "Aave V3".to_string(),
            address: address!("7d2768dE32b0b80b7a3454c06BdAc94A69DDc7A9"),
            fee: dec!(0.0009),
        },
        venues: vec![
            VenueConfig::v2(
                "uniswapV2",
                "Uniswap V2",
                address!("7a250d5630B4cF539739dF2C5dAcb4c659F2488D"),
                address!("5C69bEe701ef814a2B6a3EDD4B1652CB9cc5aA6f"),
                dec!(0.003),
            ),
            VenueConfig::v3(
                "uniswapV3",
                "Uniswap V3",
                address!("E592427A0AEce92De3Edee1F18E0157C05861564"),
                address!("b27308f9F90D607463bb33eA1BeBb41C27CE5AB6"),
                dec!(0.003),
            ),
            VenueConfig::v2(
                "sushiswap",
                "SushiSwap",
                address!("d9e1cE17f2641f24aE83637ab66a2cca9C378B9F"),
                address!("C0AEe478e3658e2610c5F7A4A2E1777cE9e4f2Ac"),
                dec!(0.003),
            ),
        ],
        watchlist: vec![
            TokenInfo::new("USDC", address!("A0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48"), 6),
            TokenInfo::new("DAI", address!("6B175474E89094C44Da98b954EedeAC495271d0F"), 18),
            TokenInfo::new("WBTC", address!("2260FAC5E5542a773Aa44fBCfeDf7C193bc2C599"), 8),
            TokenInfo::new("LINK", address!("514910771AF9Ca656af840dff83E8264EcF986CA"), 18),
        ],
        wrapped_native: weth,
    }
}

fn bnb_chain() -> ChainConfig {
    let wbnb = TokenInfo::new("WBNB", address!("bb4CdB9CBd36B01bD1cBaEBF2De08d9173bc095c"), 18);
    ChainConfig {
        chain: Chain::Bnb,
        name: "BNB Chain".to_string(),
        chain_id: 56,
        testnet_chain_id: 97,
        native_symbol: "BNB".to_string(),
        block_explorer: "https://bscscan.com".to_string(),
        flashloan_provider: FlashloanProvider {
            name: "PancakeSwap".to_string(),
            address: Address::ZERO,
            fee: dec!(0.0009),
        },
        venues: vec![
            VenueConfig::v2(
                "pancakeswapV2",
                "PancakeSwap V2",
                address!("10ED43C718714eb63d5aA57B78B54704E256024E"),
                address!("cA143Ce32Fe78f1f7019d7d551a6402fC5350c73"),
                dec!(0.0025),
            ),
            VenueConfig::v3(
                "pancakeswapV3",
                "PancakeSwap V3",
                address!("13f4EA83D0bd40E75C8222255bc855a974568Dd4"),
                address!("B048Bbc1Ee6b733FFfCFb9e9CeF7375518e25997"),
                dec!(0.0025),
            ),
            VenueConfig::v2(
                "biswap",
                "Biswap",
                address!("3a6d8cA21D1CF76F653A67577FA0D27453350dD8"),
                address!("858E3312ed3A876947EA49d572A7C42DE08af7EE"),
                dec!(0.001),
            ),
        ],
        watchlist: vec![
            TokenInfo::new("USDT", address!("55d398326f99059fF775485246999027B3197955"), 18),
            TokenInfo::new("BUSD", address!("e9e7CEA3DedcA5984780Bafc599bD69ADd087D56"), 18),
            TokenInfo::new("CAKE", address!("0E09FaBB73Bd3Ade0a17ECC321fD13a19e81cE82"), 18),
            TokenInfo::new("ETH", address!("2170Ed0880ac9A755fd29B2688956BD959F933F8"), 18),
        ],
        wrapped_native: wbnb,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_chain_names() {
        assert_eq!("Ethereum".parse::<Chain>().unwrap(), Chain::Ethereum);
        assert_eq!("bsc".parse::<Chain>().unwrap(), Chain::Bnb);
        assert!("solana".parse::<Chain>().is_err());
    }

    #[test]
    fn fee_tier_matches_pool_units() {
        let chain = ChainConfig::for_chain(Chain::Ethereum);
        let uni = chain.venue("uniswapV2").unwrap();
        assert_eq!(uni.fee_tier(), 3000);

        let bnb = ChainConfig::for_chain(Chain::Bnb);
        assert_eq!(bnb.venue("pancakeswapV2").unwrap().fee_tier(), 2500);
        assert_eq!(bnb.venue("biswap").unwrap().fee_tier(), 1000);
    }

    #[test]
    fn token_lookup_includes_wrapped_native() {
        let chain = ChainConfig::for_chain(Chain::Ethereum);
        let weth = chain.wrapped_native.address;
        assert_eq!(chain.token(weth).unwrap().symbol, "WETH");
        assert_eq!(chain.token(chain.watchlist[0].address).unwrap().decimals, 6);
        assert!(chain.token(Address::ZERO).is_none());
    }
}
