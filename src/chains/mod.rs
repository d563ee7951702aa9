/*
 * Chain registry: static per-chain configuration and lookup functions
 */

use serde::{Deserialize, Serialize};

use crate::models::{DexQuoteError, DexType, Result};

pub const ETHEREUM: u64 = 1;
pub const OPTIMISM: u64 = 10;
pub const BSC: u64 = 56;
pub const POLYGON: u64 = 137;
pub const BASE: u64 = 8453;
pub const ARBITRUM: u64 = 42161;
pub const AVALANCHE: u64 = 43114;

/// Static configuration for one supported chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainConfig {
    pub chain_id: u64,
    pub key: String,
    pub name: String,
    pub wrapped_native_symbol: String,
    pub explorer_url: String,
    pub public_rpc_url: String,
    pub supported_dexes: Vec<DexType>,
}

fn chain(
    chain_id: u64,
    key: &str,
    name: &str,
    wrapped_native_symbol: &str,
    explorer_url: &str,
    public_rpc_url: &str,
    supported_dexes: Vec<DexType>,
) -> ChainConfig {
    ChainConfig {
        chain_id,
        key: key.to_string(),
        name: name.to_string(),
        wrapped_native_symbol: wrapped_native_symbol.to_string(),
        explorer_url: explorer_url.to_string(),
        public_rpc_url: public_rpc_url.to_string(),
        supported_dexes,
    }
}

/// All chain configurations, freshly built on every call. Callers may mutate
/// the returned collection without affecting later lookups; the tables behind
/// it never change after process start.
#[must_use]
pub fn all_chain_configs() -> Vec<ChainConfig> {
    vec![
        chain(
            ETHEREUM,
            "mainnet",
            "Ethereum",
            "WETH",
            "https://etherscan.io",
            "https://eth.merkle.io",
            vec![
                DexType::UniswapV3,
                DexType::SushiswapV3,
                DexType::PancakeswapV3,
            ],
        ),
        chain(
            OPTIMISM,
            "optimism",
            "Optimism",
            "WETH",
            "https://optimistic.etherscan.io",
            "https://mainnet.optimism.io",
            vec![
                DexType::UniswapV3,
                DexType::SushiswapV3,
                DexType::Velodrome,
            ],
        ),
        chain(
            BSC,
            "bsc",
            "BNB Smart Chain",
            "WBNB",
            "https://bscscan.com",
            "https://bsc-dataseed.binance.org",
            vec![
                DexType::UniswapV3,
                DexType::SushiswapV3,
                DexType::PancakeswapV3,
            ],
        ),
        chain(
            POLYGON,
            "polygon",
            "Polygon",
            "WPOL",
            "https://polygonscan.com",
            "https://polygon-rpc.com",
            vec![DexType::UniswapV3, DexType::SushiswapV3],
        ),
        chain(
            BASE,
            "base",
            "Base",
            "WETH",
            "https://basescan.org",
            "https://mainnet.base.org",
            vec![
                DexType::UniswapV3,
                DexType::SushiswapV3,
                DexType::PancakeswapV3,
                DexType::Aerodrome,
            ],
        ),
        chain(
            ARBITRUM,
            "arbitrum",
            "Arbitrum",
            "WETH",
            "https://arbiscan.io",
            "https://arb1.arbitrum.io/rpc",
            vec![
                DexType::UniswapV3,
                DexType::SushiswapV3,
                DexType::PancakeswapV3,
            ],
        ),
        chain(
            AVALANCHE,
            "avalanche",
            "Avalanche",
            "WAVAX",
            "https://snowtrace.io",
            "https://api.avax.network/ext/bc/C/rpc",
            vec![DexType::UniswapV3, DexType::SushiswapV3],
        ),
    ]
}

pub fn chain_config(chain_id: u64) -> Result<ChainConfig> {
    all_chain_configs()
        .into_iter()
        .find(|c| c.chain_id == chain_id)
        .ok_or(DexQuoteError::UnsupportedChain(chain_id))
}

pub fn chain_config_by_key(key: &str) -> Result<ChainConfig> {
    all_chain_configs()
        .into_iter()
        .find(|c| c.key == key)
        .ok_or_else(|| DexQuoteError::InvalidInput(format!("Unsupported chain key: {key}")))
}

#[must_use]
pub fn supported_chain_ids() -> Vec<u64> {
    all_chain_configs().iter().map(|c| c.chain_id).collect()
}

#[must_use]
pub fn supported_chain_keys() -> Vec<String> {
    all_chain_configs().into_iter().map(|c| c.key).collect()
}

pub fn chain_name(chain_id: u64) -> Result<String> {
    Ok(chain_config(chain_id)?.name)
}

pub fn chain_id_by_key(key: &str) -> Result<u64> {
    Ok(chain_config_by_key(key)?.chain_id)
}

pub fn chain_key_by_id(chain_id: u64) -> Result<String> {
    Ok(chain_config(chain_id)?.key)
}

pub fn public_rpc_url(chain_id: u64) -> Result<String> {
    Ok(chain_config(chain_id)?.public_rpc_url)
}

pub fn explorer_url(chain_id: u64) -> Result<String> {
    Ok(chain_config(chain_id)?.explorer_url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn looks_up_chains_by_id_and_key() {
        let eth = chain_config(ETHEREUM).unwrap();
        assert_eq!(eth.name, "Ethereum");
        assert_eq!(eth.key, "mainnet");

        let base = chain_config_by_key("base").unwrap();
        assert_eq!(base.chain_id, BASE);
        assert_eq!(base.wrapped_native_symbol, "WETH");

        assert_eq!(chain_id_by_key("polygon").unwrap(), POLYGON);
        assert_eq!(chain_key_by_id(AVALANCHE).unwrap(), "avalanche");
    }

    #[test]
    fn unsupported_chain_errors_name_the_offending_id() {
        let err = chain_config(999_999).unwrap_err();
        assert!(err.to_string().contains("999999"));
        assert!(chain_config_by_key("solana").is_err());
    }

    #[test]
    fn list_accessors_return_independent_copies() {
        let first = all_chain_configs();
        let mut second = all_chain_configs();
        assert_eq!(first, second);

        second.clear();
        let third = all_chain_configs();
        assert_eq!(first, third);

        // Mutating nested data must not leak into the registry either.
        let mut fourth = all_chain_configs();
        fourth[0].supported_dexes.clear();
        assert_eq!(all_chain_configs()[0], first[0]);
    }

    #[test]
    fn every_chain_lists_at_least_one_dex() {
        for config in all_chain_configs() {
            assert!(
                !config.supported_dexes.is_empty(),
                "chain {} has no DEXes",
                config.chain_id
            );
        }
    }
}
