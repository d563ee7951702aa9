/*
 * Token registry: metadata, per-chain deployments, resolution and validation
 */

use crate::chains::{self, chain_config};
use crate::models::{DexQuoteError, Result, TokenInfo};
use crate::utils::format_address;

const MAX_DECIMALS: u8 = 32;

struct TokenMetadata {
    symbol: &'static str,
    name: &'static str,
    decimals: u8,
}

struct TokenDeployment {
    symbol: &'static str,
    chain_id: u64,
    address: &'static str,
    /// Some deployments diverge from the canonical decimals (e.g. USDC on BSC).
    decimals_override: Option<u8>,
}

fn metadata_table() -> &'static [TokenMetadata] {
    &[
        TokenMetadata {
            symbol: "WETH",
            name: "Wrapped Ether",
            decimals: 18,
        },
        TokenMetadata {
            symbol: "USDC",
            name: "USD Coin",
            decimals: 6,
        },
        TokenMetadata {
            symbol: "USDT",
            name: "Tether USD",
            decimals: 6,
        },
        TokenMetadata {
            symbol: "DAI",
            name: "Dai Stablecoin",
            decimals: 18,
        },
        TokenMetadata {
            symbol: "WBTC",
            name: "Wrapped BTC",
            decimals: 8,
        },
        TokenMetadata {
            symbol: "WBNB",
            name: "Wrapped BNB",
            decimals: 18,
        },
        TokenMetadata {
            symbol: "WPOL",
            name: "Wrapped Polygon Ecosystem Token",
            decimals: 18,
        },
        TokenMetadata {
            symbol: "WAVAX",
            name: "Wrapped AVAX",
            decimals: 18,
        },
    ]
}

fn deployment_table() -> &'static [TokenDeployment] {
    &[
        // WETH
        TokenDeployment {
            symbol: "WETH",
            chain_id: chains::ETHEREUM,
            address: "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2",
            decimals_override: None,
        },
        TokenDeployment {
            symbol: "WETH",
            chain_id: chains::BSC,
            address: "0x2170Ed0880ac9A755fd29B2688956BD959F933F8",
            decimals_override: None,
        },
        TokenDeployment {
            symbol: "WETH",
            chain_id: chains::POLYGON,
            address: "0x7ceB23fD6bC0adD59E62ac25578270cFf1b9f619",
            decimals_override: None,
        },
        TokenDeployment {
            symbol: "WETH",
            chain_id: chains::ARBITRUM,
            address: "0x82aF49447D8a07e3bd95BD0d56f35241523fBab1",
            decimals_override: None,
        },
        TokenDeployment {
            symbol: "WETH",
            chain_id: chains::OPTIMISM,
            address: "0x4200000000000000000000000000000000000006",
            decimals_override: None,
        },
        TokenDeployment {
            symbol: "WETH",
            chain_id: chains::BASE,
            address: "0x4200000000000000000000000000000000000006",
            decimals_override: None,
        },
        TokenDeployment {
            symbol: "WETH",
            chain_id: chains::AVALANCHE,
            address: "0x49D5c2BdFfac6CE2BFdB6640F4F80f226bc10bAB",
            decimals_override: None,
        },
        // USDC
        TokenDeployment {
            symbol: "USDC",
            chain_id: chains::ETHEREUM,
            address: "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48",
            decimals_override: None,
        },
        TokenDeployment {
            symbol: "USDC",
            chain_id: chains::BSC,
            address: "0x8AC76a51cc950d9822D68b83fE1Ad97B32Cd580d",
            decimals_override: Some(18),
        },
        TokenDeployment {
            symbol: "USDC",
            chain_id: chains::POLYGON,
            address: "0x3c499c542cEF5E3811e1192ce70d8cC03d5c3359",
            decimals_override: None,
        },
        TokenDeployment {
            symbol: "USDC",
            chain_id: chains::ARBITRUM,
            address: "0xaf88d065e77c8cC2239327C5EDb3A432268e5831",
            decimals_override: None,
        },
        TokenDeployment {
            symbol: "USDC",
            chain_id: chains::OPTIMISM,
            address: "0x0b2C639c533813f4Aa9D7837CAf62653d097Ff85",
            decimals_override: None,
        },
        TokenDeployment {
            symbol: "USDC",
            chain_id: chains::BASE,
            address: "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913",
            decimals_override: None,
        },
        TokenDeployment {
            symbol: "USDC",
            chain_id: chains::AVALANCHE,
            address: "0xB97EF9Ef8734C71904D8002F8b6Bc66Dd9c48a6E",
            decimals_override: None,
        },
        // Mainnet-only stables and BTC
        TokenDeployment {
            symbol: "USDT",
            chain_id: chains::ETHEREUM,
            address: "0xdAC17F958D2ee523a2206206994597C13D831ec7",
            decimals_override: None,
        },
        TokenDeployment {
            symbol: "DAI",
            chain_id: chains::ETHEREUM,
            address: "0x6B175474E89094C44Da98b954EedeAC495271d0F",
            decimals_override: None,
        },
        TokenDeployment {
            symbol: "WBTC",
            chain_id: chains::ETHEREUM,
            address: "0x2260FAC5E5542a773Aa44fBCfeDf7C193bc2C599",
            decimals_override: None,
        },
        // Wrapped natives on their home chains
        TokenDeployment {
            symbol: "WBNB",
            chain_id: chains::BSC,
            address: "0xbb4CdB9CBd36B01bD1cBaEBF2De08d9173bc095c",
            decimals_override: None,
        },
        TokenDeployment {
            symbol: "WPOL",
            chain_id: chains::POLYGON,
            address: "0x0d500B1d8E8eF31E21C99d1Db9A6444d3ADf1270",
            decimals_override: None,
        },
        TokenDeployment {
            symbol: "WAVAX",
            chain_id: chains::AVALANCHE,
            address: "0xB31f66AA3C1e785363F0875A1B74E27b85FD66c7",
            decimals_override: None,
        },
    ]
}

/// Look a token up by symbol on a chain.
pub fn resolve_token(symbol: &str, chain_id: u64) -> Result<TokenInfo> {
    let metadata = metadata_table()
        .iter()
        .find(|m| m.symbol == symbol)
        .ok_or_else(|| DexQuoteError::TokenNotFound {
            symbol: symbol.to_string(),
            chain_id,
        })?;

    let deployment = deployment_table()
        .iter()
        .find(|d| d.symbol == symbol && d.chain_id == chain_id)
        .ok_or_else(|| DexQuoteError::TokenNotFound {
            symbol: symbol.to_string(),
            chain_id,
        })?;

    let address = deployment
        .address
        .parse()
        .map_err(|e| DexQuoteError::InvalidToken(format!("{}: {e}", deployment.address)))?;

    Ok(TokenInfo {
        symbol: symbol.to_string(),
        address,
        decimals: deployment.decimals_override.unwrap_or(metadata.decimals),
    })
}

/// Build a validated `TokenInfo` from caller-supplied parts (custom tokens
/// outside the registry).
pub fn token_from_parts(symbol: &str, address: &str, decimals: u8) -> Result<TokenInfo> {
    let normalized = format_address(address)?;
    let token = TokenInfo {
        symbol: symbol.to_string(),
        address: normalized
            .parse()
            .map_err(|e| DexQuoteError::InvalidToken(format!("{normalized}: {e}")))?,
        decimals,
    };
    validate_token_info(&token)?;
    Ok(token)
}

/// Field-level validation, raised before any network call is attempted.
pub fn validate_token_info(token: &TokenInfo) -> Result<()> {
    if token.symbol.is_empty() {
        return Err(DexQuoteError::InvalidToken(
            "Token symbol cannot be empty".to_string(),
        ));
    }
    if token.address.is_zero() {
        return Err(DexQuoteError::InvalidToken(format!(
            "Token {} has the zero address",
            token.symbol
        )));
    }
    if token.decimals > MAX_DECIMALS {
        return Err(DexQuoteError::InvalidToken(format!(
            "Invalid decimals for {}: {} (must be 0-{MAX_DECIMALS})",
            token.symbol, token.decimals
        )));
    }
    Ok(())
}

/// Guard against cross-chain token pairing: a registry-known symbol whose
/// address is not that symbol's deployment on `chain_id` was resolved for a
/// different chain. Symbols outside the registry pass through.
pub fn ensure_on_chain(token: &TokenInfo, chain_id: u64) -> Result<()> {
    if !metadata_table().iter().any(|m| m.symbol == token.symbol) {
        return Ok(());
    }

    let matches = deployment_table()
        .iter()
        .filter(|d| d.symbol == token.symbol && d.chain_id == chain_id)
        .any(|d| {
            d.address
                .parse::<ethers::types::Address>()
                .map(|a| a == token.address)
                .unwrap_or(false)
        });

    if matches {
        Ok(())
    } else {
        Err(DexQuoteError::ChainMismatch {
            symbol: token.symbol.clone(),
            address: format!("{:#x}", token.address),
            chain_id,
        })
    }
}

/// The wrapped native token of a chain, if the registry knows it.
#[must_use]
pub fn wrapped_native_token(chain_id: u64) -> Option<TokenInfo> {
    let config = chain_config(chain_id).ok()?;
    resolve_token(&config.wrapped_native_symbol, chain_id).ok()
}

#[must_use]
pub fn is_token_available(symbol: &str, chain_id: u64) -> bool {
    deployment_table()
        .iter()
        .any(|d| d.symbol == symbol && d.chain_id == chain_id)
}

/// Chains a symbol is deployed on, in registry order.
#[must_use]
pub fn supported_chains(symbol: &str) -> Vec<u64> {
    deployment_table()
        .iter()
        .filter(|d| d.symbol == symbol)
        .map(|d| d.chain_id)
        .collect()
}

/// All registry tokens resolvable on a chain; a fresh collection per call.
#[must_use]
pub fn chain_tokens(chain_id: u64) -> Vec<TokenInfo> {
    deployment_table()
        .iter()
        .filter(|d| d.chain_id == chain_id)
        .filter_map(|d| resolve_token(d.symbol, chain_id).ok())
        .collect()
}

/// Every known symbol, sorted; a fresh collection per call.
#[must_use]
pub fn all_token_symbols() -> Vec<String> {
    let mut symbols: Vec<String> = metadata_table()
        .iter()
        .map(|m| m.symbol.to_string())
        .collect();
    symbols.sort();
    symbols
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chains::{BASE, BSC, ETHEREUM};

    #[test]
    fn resolves_registry_tokens() {
        let weth = resolve_token("WETH", ETHEREUM).unwrap();
        assert_eq!(weth.decimals, 18);
        assert_eq!(
            format!("{:#x}", weth.address),
            "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2"
        );

        // BSC USDC is an 18-decimal deployment.
        let usdc = resolve_token("USDC", BSC).unwrap();
        assert_eq!(usdc.decimals, 18);
    }

    #[test]
    fn unknown_tokens_name_symbol_and_chain() {
        let err = resolve_token("SHIB", ETHEREUM).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("SHIB"));
        assert!(msg.contains("chain 1"));

        // Known symbol, missing deployment.
        assert!(resolve_token("WBTC", BASE).is_err());
    }

    #[test]
    fn validation_rejects_malformed_fields() {
        assert!(token_from_parts("", "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2", 18).is_err());
        assert!(token_from_parts("WETH", "0x1234", 18).is_err());
        assert!(token_from_parts("ODD", "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2", 33).is_err());
        assert!(token_from_parts(
            "OK",
            "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2",
            18
        )
        .is_ok());
    }

    #[test]
    fn cross_chain_pairing_is_detected() {
        let mainnet_weth = resolve_token("WETH", ETHEREUM).unwrap();
        assert!(ensure_on_chain(&mainnet_weth, ETHEREUM).is_ok());

        let err = ensure_on_chain(&mainnet_weth, BSC).unwrap_err();
        assert!(matches!(
            err,
            crate::models::DexQuoteError::ChainMismatch { .. }
        ));

        // Custom tokens outside the registry are the caller's responsibility.
        let custom =
            token_from_parts("XYZ", "0x1111111111111111111111111111111111111111", 18).unwrap();
        assert!(ensure_on_chain(&custom, ETHEREUM).is_ok());
    }

    #[test]
    fn wrapped_native_lookup_is_optional() {
        let wbnb = wrapped_native_token(BSC).unwrap();
        assert_eq!(wbnb.symbol, "WBNB");
        assert!(wrapped_native_token(999_999).is_none());
    }

    #[test]
    fn list_accessors_return_independent_copies() {
        let first = chain_tokens(ETHEREUM);
        let mut second = chain_tokens(ETHEREUM);
        assert_eq!(first, second);

        second.clear();
        assert_eq!(chain_tokens(ETHEREUM), first);

        let symbols = all_token_symbols();
        let mut sorted = symbols.clone();
        sorted.sort();
        assert_eq!(symbols, sorted);
    }

    #[test]
    fn supported_chains_covers_every_deployment() {
        let chains = supported_chains("WETH");
        assert_eq!(chains.len(), 7);
        assert!(chains.contains(&ETHEREUM));
        assert!(supported_chains("SHIB").is_empty());
    }
}
