/*
 * Data models and types for the price quoting library
 */

use chrono::{DateTime, Utc};
use ethers::types::Address;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A token resolved for one chain. The chain itself is implied by the call
/// context and never stored here; two tokens are the same iff their addresses
/// match (parsing normalizes hex case, so byte equality is enough).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub symbol: String,
    pub address: Address,
    pub decimals: u8,
}

/// How a protocol discriminates its pools: Uniswap V3-style fee tiers, or
/// Slipstream-style tick spacings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TierType {
    Fee,
    TickSpacing,
}

/// One discrete pool parameterization a protocol supports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolTier {
    pub tier_type: TierType,
    pub value: u32,
    pub display: String,
}

impl PoolTier {
    #[must_use]
    pub fn new(tier_type: TierType, value: u32) -> Self {
        let display = match tier_type {
            TierType::Fee => format!("{:.2}% fee", f64::from(value) / 10_000.0),
            TierType::TickSpacing => format!("tickSpacing: {value}"),
        };
        Self {
            tier_type,
            value,
            display,
        }
    }
}

/// Supported DEX protocols. Fee-tier forks of Uniswap V3 share one call
/// shape, tick-spacing forks (Velodrome Slipstream lineage) share another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DexType {
    #[serde(rename = "uniswap-v3")]
    UniswapV3,
    #[serde(rename = "sushiswap-v3")]
    SushiswapV3,
    #[serde(rename = "pancakeswap-v3")]
    PancakeswapV3,
    #[serde(rename = "velodrome")]
    Velodrome,
    #[serde(rename = "aerodrome")]
    Aerodrome,
}

impl std::fmt::Display for DexType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DexType::UniswapV3 => "uniswap-v3",
            DexType::SushiswapV3 => "sushiswap-v3",
            DexType::PancakeswapV3 => "pancakeswap-v3",
            DexType::Velodrome => "velodrome",
            DexType::Aerodrome => "aerodrome",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for DexType {
    type Err = DexQuoteError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "uniswap-v3" => Ok(DexType::UniswapV3),
            "sushiswap-v3" => Ok(DexType::SushiswapV3),
            "pancakeswap-v3" => Ok(DexType::PancakeswapV3),
            "velodrome" => Ok(DexType::Velodrome),
            "aerodrome" => Ok(DexType::Aerodrome),
            _ => Err(DexQuoteError::InvalidInput(format!(
                "Unknown DEX type: {s}"
            ))),
        }
    }
}

/// The best quote one DEX produced for a pair. Amounts are decimal-integer
/// strings so full precision survives serialization; `price` and
/// `price_impact` are display-grade floats only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceResult {
    pub token_in: TokenInfo,
    pub token_out: TokenInfo,
    pub amount_in: String,
    pub amount_out: String,
    pub price: f64,
    pub formatted: String,
    pub pool_tier: PoolTier,
    pub chain_id: u64,
    pub gas_estimate: String,
    pub price_impact: f64,
}

/// A `PriceResult` tagged with the DEX that produced it; the aggregation
/// engine's input unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DexQuote {
    pub dex_type: DexType,
    #[serde(flatten)]
    pub result: PriceResult,
}

/// Cross-DEX summary statistics plus a best-quote recommendation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatedPrice {
    pub average: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    pub best: DexQuote,
    pub all: Vec<DexQuote>,
    pub token_in: TokenInfo,
    pub token_out: TokenInfo,
    pub chain_id: u64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum DexQuoteError {
    #[error("RPC error: {0}")]
    RpcError(String),

    #[error("Contract interaction error: {0}")]
    ContractError(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unsupported chain ID: {0}")]
    UnsupportedChain(u64),

    #[error("DEX {dex_type} not configured for chain {chain_id}")]
    DexNotConfigured { dex_type: DexType, chain_id: u64 },

    #[error("Token \"{symbol}\" not found on chain {chain_id}")]
    TokenNotFound { symbol: String, chain_id: u64 },

    #[error("Token {symbol} ({address}) does not belong to chain {chain_id}")]
    ChainMismatch {
        symbol: String,
        address: String,
        chain_id: u64,
    },

    #[error("No liquidity found for {token_in}/{token_out} on {dex_name} (chain {chain_id})")]
    NoLiquidity {
        token_in: String,
        token_out: String,
        dex_name: String,
        chain_id: u64,
    },

    #[error("No price quotes to aggregate")]
    EmptyQuoteSet,

    #[error("All quotes were filtered as outliers")]
    AllQuotesFiltered,

    #[error("No prices found for {token_in}/{token_out} on chain {chain_id}")]
    NoPricesFound {
        token_in: String,
        token_out: String,
        chain_id: u64,
    },
}

pub type Result<T> = std::result::Result<T, DexQuoteError>;
