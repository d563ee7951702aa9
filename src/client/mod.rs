/*
 * Client façade: provider URL resolution, per-chain connection cache and
 * the public quoting entry points
 */

use std::collections::HashMap;
use std::sync::Arc;

use ethers::types::U256;
use futures::future::join_all;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::aggregation::{calculate_aggregated_price, select_best_quote};
use crate::chains::{self, ChainConfig};
use crate::dex::{create_adapter, create_all_adapters};
use crate::models::{
    AggregatedPrice, DexQuote, DexQuoteError, DexType, PriceResult, Result, TokenInfo,
};
use crate::rpc::RpcClient;
use crate::tokens::{ensure_on_chain, resolve_token};
use crate::utils::parse_units;

/// Provider credentials and per-chain endpoint overrides.
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    pub alchemy_api_key: Option<String>,
    pub infura_api_key: Option<String>,
    /// Explicit RPC URL per chain id; wins over any derived provider URL.
    pub rpc_overrides: HashMap<u64, String>,
}

impl ClientConfig {
    /// Load from the environment (`.env` honored): `ALCHEMY_API_KEY`,
    /// `INFURA_API_KEY`, and `RPC_URL_<CHAIN_KEY>` per-chain overrides.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |var: &str| lookup(var).filter(|v| !v.is_empty());

        let mut rpc_overrides = HashMap::new();
        for config in chains::all_chain_configs() {
            let var = format!("RPC_URL_{}", config.key.to_uppercase());
            if let Some(url) = non_empty(&var) {
                rpc_overrides.insert(config.chain_id, url);
            }
        }

        Self {
            alchemy_api_key: non_empty("ALCHEMY_API_KEY"),
            infura_api_key: non_empty("INFURA_API_KEY"),
            rpc_overrides,
        }
    }
}

fn alchemy_rpc_url(chain_key: &str, api_key: &str) -> Option<String> {
    let subdomain = match chain_key {
        "mainnet" => "eth-mainnet",
        "optimism" => "opt-mainnet",
        "bsc" => "bnb-mainnet",
        "polygon" => "polygon-mainnet",
        "base" => "base-mainnet",
        "arbitrum" => "arb-mainnet",
        "avalanche" => "avax-mainnet",
        _ => return None,
    };
    Some(format!("https://{subdomain}.g.alchemy.com/v2/{api_key}"))
}

fn infura_rpc_url(chain_key: &str, api_key: &str) -> Option<String> {
    let subdomain = match chain_key {
        "mainnet" => "mainnet",
        "optimism" => "optimism-mainnet",
        "bsc" => "bsc-mainnet",
        "polygon" => "polygon-mainnet",
        "base" => "base-mainnet",
        "arbitrum" => "arbitrum-mainnet",
        "avalanche" => "avalanche-mainnet",
        _ => return None,
    };
    Some(format!("https://{subdomain}.infura.io/v3/{api_key}"))
}

/// Endpoint precedence: explicit override, then Alchemy, then Infura, then
/// the chain's public RPC (with a warning, public endpoints rate-limit
/// aggressively).
fn resolve_rpc_url(config: &ClientConfig, chain: &ChainConfig) -> String {
    if let Some(url) = config.rpc_overrides.get(&chain.chain_id) {
        return url.clone();
    }
    if let Some(url) = config
        .alchemy_api_key
        .as_deref()
        .and_then(|key| alchemy_rpc_url(&chain.key, key))
    {
        return url;
    }
    if let Some(url) = config
        .infura_api_key
        .as_deref()
        .and_then(|key| infura_rpc_url(&chain.key, key))
    {
        return url;
    }

    warn!(
        chain = %chain.name,
        "no provider credentials configured, falling back to public RPC"
    );
    chain.public_rpc_url.clone()
}

/// The main entry point. Owns one lazily-created `RpcClient` per chain;
/// all quoting operations go through it.
pub struct Client {
    config: ClientConfig,
    connections: Mutex<HashMap<u64, Arc<RpcClient>>>,
}

impl Client {
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        info!(
            chains = chains::supported_chain_ids().len(),
            "price client initialized"
        );
        Self {
            config,
            connections: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn from_env() -> Self {
        Self::new(ClientConfig::from_env())
    }

    /// Connection for a chain, created on first use. The cache lock is held
    /// across creation so racing callers settle on a single connection.
    async fn rpc(&self, chain_id: u64) -> Result<Arc<RpcClient>> {
        let chain = chains::chain_config(chain_id)?;

        let mut connections = self.connections.lock().await;
        if let Some(client) = connections.get(&chain_id) {
            return Ok(client.clone());
        }

        let url = resolve_rpc_url(&self.config, &chain);
        let client = Arc::new(RpcClient::new(&url, chain_id).await?);
        connections.insert(chain_id, client.clone());
        Ok(client)
    }

    /// Pre-flight shared by every quoting entry point: both tokens must
    /// belong to the chain, and the human-unit amount must parse against the
    /// input token's decimals.
    fn prepare(
        &self,
        token_in: &TokenInfo,
        token_out: &TokenInfo,
        amount_in: &str,
        chain_id: u64,
    ) -> Result<U256> {
        chains::chain_config(chain_id)?;
        ensure_on_chain(token_in, chain_id)?;
        ensure_on_chain(token_out, chain_id)?;
        parse_units(amount_in, token_in.decimals)
    }

    /// Best quote from one specific DEX.
    pub async fn get_price(
        &self,
        token_in: &TokenInfo,
        token_out: &TokenInfo,
        amount_in: &str,
        chain_id: u64,
        dex_type: DexType,
    ) -> Result<PriceResult> {
        let amount = self.prepare(token_in, token_out, amount_in, chain_id)?;
        let adapter = create_adapter(chain_id, dex_type)?;
        let rpc = self.rpc(chain_id).await?;
        adapter.get_quote(rpc.as_ref(), token_in, token_out, amount).await
    }

    /// Quotes from every DEX configured on the chain, queried concurrently.
    /// Individual DEX failures are logged and excluded; the call itself fails
    /// only when the inputs cannot be validated or the chain is unreachable.
    pub async fn get_prices_from_all_dexes(
        &self,
        token_in: &TokenInfo,
        token_out: &TokenInfo,
        amount_in: &str,
        chain_id: u64,
    ) -> Result<Vec<DexQuote>> {
        let amount = self.prepare(token_in, token_out, amount_in, chain_id)?;
        let adapters = create_all_adapters(chain_id);
        let rpc = self.rpc(chain_id).await?;

        let settled = join_all(
            adapters
                .iter()
                .map(|adapter| adapter.get_quote(rpc.as_ref(), token_in, token_out, amount)),
        )
        .await;

        let mut quotes = Vec::with_capacity(settled.len());
        for (adapter, outcome) in adapters.iter().zip(settled) {
            let dex_type = adapter.config().protocol.dex_type;
            match outcome {
                Ok(result) => quotes.push(DexQuote { dex_type, result }),
                Err(e) => {
                    warn!(dex = %dex_type, chain_id, error = %e, "quote failed, excluding DEX");
                }
            }
        }

        Ok(quotes)
    }

    /// The single best quote across all DEXes on the chain, by raw output
    /// amount.
    pub async fn get_best_price(
        &self,
        token_in: &TokenInfo,
        token_out: &TokenInfo,
        amount_in: &str,
        chain_id: u64,
    ) -> Result<DexQuote> {
        let quotes = self
            .get_prices_from_all_dexes(token_in, token_out, amount_in, chain_id)
            .await?;
        if quotes.is_empty() {
            return Err(DexQuoteError::NoPricesFound {
                token_in: token_in.symbol.clone(),
                token_out: token_out.symbol.clone(),
                chain_id,
            });
        }
        Ok(select_best_quote(&quotes)?.clone())
    }

    /// Cross-DEX aggregate with optional outlier filtering.
    pub async fn get_aggregated_price(
        &self,
        token_in: &TokenInfo,
        token_out: &TokenInfo,
        amount_in: &str,
        chain_id: u64,
        filter_outliers: bool,
    ) -> Result<AggregatedPrice> {
        let quotes = self
            .get_prices_from_all_dexes(token_in, token_out, amount_in, chain_id)
            .await?;
        calculate_aggregated_price(quotes, token_in, token_out, filter_outliers)
    }

    pub async fn get_price_by_symbols(
        &self,
        token_in: &str,
        token_out: &str,
        amount_in: &str,
        chain_id: u64,
        dex_type: DexType,
    ) -> Result<PriceResult> {
        let token_in = resolve_token(token_in, chain_id)?;
        let token_out = resolve_token(token_out, chain_id)?;
        self.get_price(&token_in, &token_out, amount_in, chain_id, dex_type)
            .await
    }

    pub async fn get_best_price_by_symbols(
        &self,
        token_in: &str,
        token_out: &str,
        amount_in: &str,
        chain_id: u64,
    ) -> Result<DexQuote> {
        let token_in = resolve_token(token_in, chain_id)?;
        let token_out = resolve_token(token_out, chain_id)?;
        self.get_best_price(&token_in, &token_out, amount_in, chain_id)
            .await
    }

    pub async fn get_aggregated_price_by_symbols(
        &self,
        token_in: &str,
        token_out: &str,
        amount_in: &str,
        chain_id: u64,
        filter_outliers: bool,
    ) -> Result<AggregatedPrice> {
        let token_in = resolve_token(token_in, chain_id)?;
        let token_out = resolve_token(token_out, chain_id)?;
        self.get_aggregated_price(&token_in, &token_out, amount_in, chain_id, filter_outliers)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(key: &str) -> ChainConfig {
        chains::chain_config_by_key(key).unwrap()
    }

    #[test]
    fn provider_urls_use_network_subdomains() {
        assert_eq!(
            alchemy_rpc_url("mainnet", "key").unwrap(),
            "https://eth-mainnet.g.alchemy.com/v2/key"
        );
        assert_eq!(
            alchemy_rpc_url("arbitrum", "key").unwrap(),
            "https://arb-mainnet.g.alchemy.com/v2/key"
        );
        assert_eq!(
            infura_rpc_url("optimism", "key").unwrap(),
            "https://optimism-mainnet.infura.io/v3/key"
        );
        assert!(alchemy_rpc_url("solana", "key").is_none());
    }

    #[test]
    fn explicit_override_beats_everything() {
        let mut overrides = HashMap::new();
        overrides.insert(chains::ETHEREUM, "https://my-node.internal:8545".to_string());
        let config = ClientConfig {
            alchemy_api_key: Some("alchemy".to_string()),
            infura_api_key: Some("infura".to_string()),
            rpc_overrides: overrides,
        };

        assert_eq!(
            resolve_rpc_url(&config, &chain("mainnet")),
            "https://my-node.internal:8545"
        );
        // Other chains still go through the provider.
        assert!(resolve_rpc_url(&config, &chain("base")).contains("alchemy.com"));
    }

    #[test]
    fn alchemy_beats_infura_beats_public() {
        let both = ClientConfig {
            alchemy_api_key: Some("a".to_string()),
            infura_api_key: Some("i".to_string()),
            ..Default::default()
        };
        assert!(resolve_rpc_url(&both, &chain("polygon")).contains("alchemy.com"));

        let infura_only = ClientConfig {
            infura_api_key: Some("i".to_string()),
            ..Default::default()
        };
        assert!(resolve_rpc_url(&infura_only, &chain("polygon")).contains("infura.io"));

        let none = ClientConfig::default();
        assert_eq!(
            resolve_rpc_url(&none, &chain("polygon")),
            chain("polygon").public_rpc_url
        );
    }

    #[test]
    fn env_overrides_are_keyed_by_chain_key() {
        let mut vars = HashMap::new();
        vars.insert("RPC_URL_BSC", "https://bsc-node.example/rpc");
        vars.insert("ALCHEMY_API_KEY", "");

        let config = ClientConfig::from_lookup(|var| vars.get(var).map(|v| v.to_string()));

        assert_eq!(
            config.rpc_overrides.get(&chains::BSC).map(String::as_str),
            Some("https://bsc-node.example/rpc")
        );
        assert!(config.rpc_overrides.get(&chains::ETHEREUM).is_none());
        // Blank credentials count as unset.
        assert!(config.alchemy_api_key.is_none());
    }

    #[tokio::test]
    async fn unsupported_chain_fails_before_any_connection() {
        let client = Client::new(ClientConfig::default());
        let weth = resolve_token("WETH", chains::ETHEREUM).unwrap();
        let usdc = resolve_token("USDC", chains::ETHEREUM).unwrap();

        let err = client
            .get_prices_from_all_dexes(&weth, &usdc, "1.0", 999_999)
            .await
            .unwrap_err();
        assert!(matches!(err, DexQuoteError::UnsupportedChain(999_999)));
    }

    #[tokio::test]
    async fn cross_chain_token_pairing_is_rejected() {
        let client = Client::new(ClientConfig::default());
        // WETH resolved for Ethereum, queried against Base.
        let weth = resolve_token("WETH", chains::ETHEREUM).unwrap();
        let usdc = resolve_token("USDC", chains::BASE).unwrap();

        let err = client
            .get_prices_from_all_dexes(&weth, &usdc, "1.0", chains::BASE)
            .await
            .unwrap_err();
        assert!(matches!(err, DexQuoteError::ChainMismatch { .. }));
    }

    #[tokio::test]
    async fn bad_amounts_fail_during_preparation() {
        let client = Client::new(ClientConfig::default());
        let weth = resolve_token("WETH", chains::ETHEREUM).unwrap();
        let usdc = resolve_token("USDC", chains::ETHEREUM).unwrap();

        for bad in ["", "abc", "-1", "1.2.3"] {
            assert!(client
                .get_best_price(&weth, &usdc, bad, chains::ETHEREUM)
                .await
                .is_err());
        }
    }
}
