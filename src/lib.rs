//! Multi-chain price quoting and aggregation for concentrated liquidity
//! DEXes (Uniswap V3 lineage, fee-tier and tick-spacing families).
//!
//! ```no_run
//! use dexquote::{chains, Client};
//!
//! # #[tokio::main]
//! # async fn main() -> dexquote::Result<()> {
//! let client = Client::from_env();
//! let best = client
//!     .get_best_price_by_symbols("WETH", "USDC", "1.0", chains::ETHEREUM)
//!     .await?;
//! println!("{}", best.result.formatted);
//! # Ok(())
//! # }
//! ```

pub mod aggregation;
pub mod chains;
pub mod client;
pub mod dex;
pub mod models;
pub mod rpc;
pub mod tokens;
pub mod utils;

pub use client::{Client, ClientConfig};
pub use dex::{DexAdapter, DexConfig, DexProtocol, QuoterAdapter};
pub use models::{
    AggregatedPrice, DexQuote, DexQuoteError, DexType, PoolTier, PriceResult, Result, TierType,
    TokenInfo,
};
