/*
 * Per-chain DEX configuration tables
 */

use std::str::FromStr;

use ethers::types::Address;

use crate::chains;
use crate::models::{DexQuoteError, DexType, Result, TierType};

use super::{DexAdapter, DexConfig, DexProtocol, QuoterAdapter};

/// Fee tiers common to every Uniswap V3-ABI fork, in hundredths of a basis
/// point.
const FEE_TIERS: [u32; 4] = [100, 500, 3000, 10000];

/// Tick spacings the Slipstream quoters accept on Optimism and Base.
const SLIPSTREAM_TICK_SPACINGS: [u32; 5] = [1, 50, 100, 200, 2000];

struct RawDexConfig {
    dex_type: DexType,
    chain_id: u64,
    quoter_address: &'static str,
    factory_address: &'static str,
    tiers: &'static [u32],
    tier_type: TierType,
}

fn fee_dex(dex_type: DexType, chain_id: u64, quoter: &'static str, factory: &'static str) -> RawDexConfig {
    RawDexConfig {
        dex_type,
        chain_id,
        quoter_address: quoter,
        factory_address: factory,
        tiers: &FEE_TIERS,
        tier_type: TierType::Fee,
    }
}

fn slipstream_dex(dex_type: DexType, chain_id: u64, quoter: &'static str, factory: &'static str) -> RawDexConfig {
    RawDexConfig {
        dex_type,
        chain_id,
        quoter_address: quoter,
        factory_address: factory,
        tiers: &SLIPSTREAM_TICK_SPACINGS,
        tier_type: TierType::TickSpacing,
    }
}

fn config_table() -> Vec<RawDexConfig> {
    use DexType::{Aerodrome, PancakeswapV3, SushiswapV3, UniswapV3, Velodrome};

    vec![
        // Ethereum
        fee_dex(
            UniswapV3,
            chains::ETHEREUM,
            "0x61fFE014bA17989E743c5F6cB21bF9697530B21e",
            "0x1F98431c8aD98523631AE4a59f267346ea31F984",
        ),
        fee_dex(
            SushiswapV3,
            chains::ETHEREUM,
            "0x64e8802FE490fa7cc61d3463958199161Bb608A7",
            "0xbACEB8eC6b9355Dfc0269C18bac9d6E2Bdc29C4F",
        ),
        fee_dex(
            PancakeswapV3,
            chains::ETHEREUM,
            "0xB048Bbc1Ee6b733FFfCFb9e9CeF7375518e25997",
            "0x0BFbCF9fa4f9C56B0F40a671Ad40E0805A091865",
        ),
        // Optimism
        fee_dex(
            UniswapV3,
            chains::OPTIMISM,
            "0x61fFE014bA17989E743c5F6cB21bF9697530B21e",
            "0x1F98431c8aD98523631AE4a59f267346ea31F984",
        ),
        fee_dex(
            SushiswapV3,
            chains::OPTIMISM,
            "0xb1E835Dc2785b52265711e17fCCb0fd018226a6e",
            "0x9c6522117e2ed1fE5bdb72bb0eD5E3f2bdE7DBe0",
        ),
        slipstream_dex(
            Velodrome,
            chains::OPTIMISM,
            "0x89D8218ed5fF1e46d8dcd33fb0bbeE3be1621466",
            "0xCc0bDDB707055e04e497aB22a59c2aF4391cd12F",
        ),
        // BNB Smart Chain
        fee_dex(
            UniswapV3,
            chains::BSC,
            "0x78D78E420Da98ad378D7799bE8f4AF69033EB077",
            "0xdB1d10011AD0Ff90774D0C6Bb92e5C5c8b4461F7",
        ),
        fee_dex(
            SushiswapV3,
            chains::BSC,
            "0xb1E835Dc2785b52265711e17fCCb0fd018226a6e",
            "0x126555dd55a39328F69400d6aE4F782Bd4C34ABb",
        ),
        fee_dex(
            PancakeswapV3,
            chains::BSC,
            "0xB048Bbc1Ee6b733FFfCFb9e9CeF7375518e25997",
            "0x0BFbCF9fa4f9C56B0F40a671Ad40E0805A091865",
        ),
        // Polygon
        fee_dex(
            UniswapV3,
            chains::POLYGON,
            "0x61fFE014bA17989E743c5F6cB21bF9697530B21e",
            "0x1F98431c8aD98523631AE4a59f267346ea31F984",
        ),
        fee_dex(
            SushiswapV3,
            chains::POLYGON,
            "0xb1E835Dc2785b52265711e17fCCb0fd018226a6e",
            "0x917933899c6a5F8E37F31E19f92CdBFF7e8FF0e2",
        ),
        // Base
        fee_dex(
            UniswapV3,
            chains::BASE,
            "0x3d4e44Eb1374240CE5F1B871ab261CD16335B76a",
            "0x33128a8fC17869897dcE68Ed026d694621f6FDfD",
        ),
        fee_dex(
            SushiswapV3,
            chains::BASE,
            "0xb1E835Dc2785b52265711e17fCCb0fd018226a6e",
            "0xc35DADB65012eC5796536bD9864eD8773aBc74C4",
        ),
        fee_dex(
            PancakeswapV3,
            chains::BASE,
            "0xB048Bbc1Ee6b733FFfCFb9e9CeF7375518e25997",
            "0x0BFbCF9fa4f9C56B0F40a671Ad40E0805A091865",
        ),
        slipstream_dex(
            Aerodrome,
            chains::BASE,
            "0x254cF9E1E6e233aa1AC962CB9B05b2cfeAaE15b0",
            "0x5e7BB104d84c7CB9B682AaC2F3d509f5F406809A",
        ),
        // Arbitrum
        fee_dex(
            UniswapV3,
            chains::ARBITRUM,
            "0x61fFE014bA17989E743c5F6cB21bF9697530B21e",
            "0x1F98431c8aD98523631AE4a59f267346ea31F984",
        ),
        fee_dex(
            SushiswapV3,
            chains::ARBITRUM,
            "0x0524E833cCD057e4d7A296e3aaAb9f7675964Ce1",
            "0x1af415a1EbA07a4986a52B6f2e7dE7003D82231e",
        ),
        fee_dex(
            PancakeswapV3,
            chains::ARBITRUM,
            "0xB048Bbc1Ee6b733FFfCFb9e9CeF7375518e25997",
            "0x0BFbCF9fa4f9C56B0F40a671Ad40E0805A091865",
        ),
        // Avalanche
        fee_dex(
            UniswapV3,
            chains::AVALANCHE,
            "0xbe0F5544EC67e9B3b2D979aaA43f18Fd87E6257F",
            "0x740b1c1de25031C31FF4fC9A62f554A55cdC1baD",
        ),
        fee_dex(
            SushiswapV3,
            chains::AVALANCHE,
            "0xb1E835Dc2785b52265711e17fCCb0fd018226a6e",
            "0x3e603C14aF37EBdaD31709C4f848Fc6aD5BEc715",
        ),
    ]
}

/// Protocol identity for a DEX type.
#[must_use]
pub fn dex_protocol(dex_type: DexType) -> DexProtocol {
    let (name, website) = match dex_type {
        DexType::UniswapV3 => ("Uniswap", "https://uniswap.org"),
        DexType::SushiswapV3 => ("SushiSwap", "https://sushi.com"),
        DexType::PancakeswapV3 => ("PancakeSwap", "https://pancakeswap.finance"),
        DexType::Velodrome => ("Velodrome", "https://velodrome.finance"),
        DexType::Aerodrome => ("Aerodrome", "https://aerodrome.finance"),
    };
    DexProtocol {
        dex_type,
        name: name.to_string(),
        website: website.to_string(),
    }
}

fn build_config(raw: &RawDexConfig) -> Result<DexConfig> {
    let quoter_address = Address::from_str(raw.quoter_address).map_err(|e| {
        DexQuoteError::ContractError(format!(
            "Invalid quoter address for {}: {e}",
            raw.dex_type
        ))
    })?;
    let factory_address = Address::from_str(raw.factory_address).ok();

    Ok(DexConfig {
        protocol: dex_protocol(raw.dex_type),
        chain_id: raw.chain_id,
        quoter_address,
        factory_address,
        tiers: raw.tiers.to_vec(),
        tier_type: raw.tier_type,
    })
}

/// Configuration for one DEX on one chain.
pub fn dex_config(chain_id: u64, dex_type: DexType) -> Result<DexConfig> {
    let table = config_table();
    let raw = table
        .iter()
        .find(|c| c.chain_id == chain_id && c.dex_type == dex_type)
        .ok_or(DexQuoteError::DexNotConfigured { dex_type, chain_id })?;
    build_config(raw)
}

/// Every DEX configured for a chain, in registration order; a fresh
/// collection per call. Unknown chains yield an empty list.
#[must_use]
pub fn chain_dex_configs(chain_id: u64) -> Vec<DexConfig> {
    config_table()
        .iter()
        .filter(|c| c.chain_id == chain_id)
        .filter_map(|c| build_config(c).ok())
        .collect()
}

#[must_use]
pub fn supported_dex_types(chain_id: u64) -> Vec<DexType> {
    chain_dex_configs(chain_id)
        .iter()
        .map(|c| c.protocol.dex_type)
        .collect()
}

#[must_use]
pub fn is_dex_supported(chain_id: u64, dex_type: DexType) -> bool {
    config_table()
        .iter()
        .any(|c| c.chain_id == chain_id && c.dex_type == dex_type)
}

/// Adapter for one DEX on one chain.
pub fn create_adapter(chain_id: u64, dex_type: DexType) -> Result<Box<dyn DexAdapter>> {
    let config = dex_config(chain_id, dex_type)?;
    Ok(Box::new(QuoterAdapter::new(config)))
}

/// Adapters for every DEX on a chain, in registration order.
#[must_use]
pub fn create_all_adapters(chain_id: u64) -> Vec<Box<dyn DexAdapter>> {
    chain_dex_configs(chain_id)
        .into_iter()
        .map(|config| Box::new(QuoterAdapter::new(config)) as Box<dyn DexAdapter>)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fee_family_configs_carry_the_universal_tiers() {
        let config = dex_config(chains::ETHEREUM, DexType::UniswapV3).unwrap();
        assert_eq!(config.tiers, vec![100, 500, 3000, 10000]);
        assert_eq!(config.tier_type, TierType::Fee);
        assert_eq!(config.protocol.name, "Uniswap");
        assert!(config.factory_address.is_some());
    }

    #[test]
    fn slipstream_configs_use_tick_spacings() {
        let velo = dex_config(chains::OPTIMISM, DexType::Velodrome).unwrap();
        assert_eq!(velo.tier_type, TierType::TickSpacing);
        assert_eq!(velo.tiers, vec![1, 50, 100, 200, 2000]);

        let aero = dex_config(chains::BASE, DexType::Aerodrome).unwrap();
        assert_eq!(aero.tier_type, TierType::TickSpacing);
    }

    #[test]
    fn unconfigured_combinations_are_errors() {
        let err = dex_config(chains::POLYGON, DexType::Aerodrome).unwrap_err();
        assert!(err.to_string().contains("aerodrome"));
        assert!(err.to_string().contains("137"));
        assert!(!is_dex_supported(chains::ETHEREUM, DexType::Velodrome));
    }

    #[test]
    fn chain_listings_preserve_registration_order() {
        let types = supported_dex_types(chains::BASE);
        assert_eq!(
            types,
            vec![
                DexType::UniswapV3,
                DexType::SushiswapV3,
                DexType::PancakeswapV3,
                DexType::Aerodrome,
            ]
        );
        assert!(supported_dex_types(999_999).is_empty());
    }

    #[test]
    fn list_accessors_return_independent_copies() {
        let first = chain_dex_configs(chains::OPTIMISM);
        let mut second = chain_dex_configs(chains::OPTIMISM);
        assert_eq!(first, second);

        second[0].tiers.clear();
        assert_eq!(chain_dex_configs(chains::OPTIMISM), first);
    }

    #[test]
    fn adapters_are_created_for_every_configured_dex() {
        let adapters = create_all_adapters(chains::BASE);
        assert_eq!(adapters.len(), 4);
        assert_eq!(
            adapters[3].config().protocol.dex_type,
            DexType::Aerodrome
        );
        assert!(create_adapter(chains::POLYGON, DexType::Velodrome).is_err());
    }
}
