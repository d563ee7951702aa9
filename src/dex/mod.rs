/*
 * DEX integration: adapter contract shared by fee-tier and tick-spacing
 * protocol families
 */

pub mod adapter;
pub mod registry;

use async_trait::async_trait;
use ethers::types::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::models::{DexType, PoolTier, PriceResult, Result, TierType, TokenInfo};
use crate::rpc::RpcClient;

pub use adapter::QuoterAdapter;
pub use registry::{
    chain_dex_configs, create_adapter, create_all_adapters, dex_config, dex_protocol,
    is_dex_supported, supported_dex_types,
};

/// Descriptive protocol identity, shared by every chain a DEX is deployed on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DexProtocol {
    pub dex_type: DexType,
    pub name: String,
    pub website: String,
}

/// One DEX deployment on one chain: where its quoter lives and which pool
/// tiers it supports. `tier_type` decides how `tiers` values are interpreted
/// and how the quoter call is shaped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DexConfig {
    pub protocol: DexProtocol,
    pub chain_id: u64,
    pub quoter_address: Address,
    pub factory_address: Option<Address>,
    pub tiers: Vec<u32>,
    pub tier_type: TierType,
}

/// Per-tier result, alive only between the batched call and the reduction to
/// a single best quote.
#[derive(Debug, Clone)]
pub struct PoolQuote {
    pub pool_tier: PoolTier,
    pub amount_out: U256,
    pub price: f64,
    pub formatted: String,
    pub gas_estimate: U256,
    pub price_impact: f64,
}

/// The per-DEX quoting contract. One implementation covers both protocol
/// families; the trait is the seam the client façade fans out over.
#[async_trait]
pub trait DexAdapter: Send + Sync {
    fn config(&self) -> &DexConfig;

    /// Best quote across every configured tier, in one batched round trip.
    /// Fails with a no-liquidity error only when every tier call fails.
    async fn get_quote(
        &self,
        rpc: &RpcClient,
        token_in: &TokenInfo,
        token_out: &TokenInfo,
        amount_in: U256,
    ) -> Result<PriceResult>;

    /// Quote a single tier. `None` means the pool either failed to answer or
    /// answered with zero output; callers treat both as unusable liquidity.
    async fn get_quote_for_pool_param(
        &self,
        rpc: &RpcClient,
        token_in: &TokenInfo,
        token_out: &TokenInfo,
        amount_in: U256,
        tier: u32,
    ) -> Result<Option<PriceResult>>;
}
