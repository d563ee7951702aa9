/*
 * RPC client: one HTTP provider per chain plus the Multicall3 batched
 * read capability the adapters depend on
 */

use ethers::abi::{self, ParamType, Token};
use ethers::providers::{Http, Middleware, Provider};
use ethers::types::{Address, Bytes, TransactionRequest, U256};
use ethers::utils::keccak256;
use std::str::FromStr;
use std::sync::Arc;

use crate::models::{DexQuoteError, Result};

/// Canonical Multicall3 deployment, identical on every supported chain.
const MULTICALL3_ADDRESS: &str = "0xcA11bde05977b3631167028862bE2a173976CA11";

/// One read request inside a batch.
#[derive(Debug, Clone)]
pub struct Call3 {
    pub target: Address,
    pub allow_failure: bool,
    pub calldata: Bytes,
}

/// Per-call outcome of a batch. A failed call never fails the batch; it is
/// reported here with `success == false` and consumed by the caller's
/// exclusion policy.
#[derive(Debug, Clone)]
pub struct CallOutcome {
    pub success: bool,
    pub return_data: Bytes,
}

pub struct RpcClient {
    provider: Arc<Provider<Http>>,
    chain_id: u64,
    multicall_address: Address,
}

impl RpcClient {
    /// Connect to an endpoint and verify it serves the expected chain.
    pub async fn new(rpc_url: &str, chain_id: u64) -> Result<Self> {
        let provider = Provider::<Http>::try_from(rpc_url)
            .map_err(|e| DexQuoteError::RpcError(format!("Failed to create provider: {e}")))?;

        let reported = provider
            .get_chainid()
            .await
            .map_err(|e| DexQuoteError::RpcError(format!("Failed to get chain ID: {e}")))?;

        if reported.as_u64() != chain_id {
            return Err(DexQuoteError::RpcError(format!(
                "Chain ID mismatch: expected {}, got {}",
                chain_id,
                reported.as_u64()
            )));
        }

        let multicall_address = Address::from_str(MULTICALL3_ADDRESS)
            .map_err(|e| DexQuoteError::RpcError(format!("Invalid multicall address: {e}")))?;

        Ok(Self {
            provider: Arc::new(provider),
            chain_id,
            multicall_address,
        })
    }

    #[must_use]
    pub fn provider(&self) -> Arc<Provider<Http>> {
        self.provider.clone()
    }

    #[must_use]
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub async fn get_gas_price(&self) -> Result<U256> {
        self.provider
            .get_gas_price()
            .await
            .map_err(|e| DexQuoteError::RpcError(format!("Failed to get gas price: {e}")))
    }

    /// Execute a batch of read calls through Multicall3 `aggregate3` in a
    /// single round trip. Returns one outcome per input call, in input order.
    pub async fn multicall(&self, calls: &[Call3]) -> Result<Vec<CallOutcome>> {
        if calls.is_empty() {
            return Ok(Vec::new());
        }

        let selector = &keccak256(b"aggregate3((address,bool,bytes)[])")[0..4];

        let tuples: Vec<Token> = calls
            .iter()
            .map(|c| {
                Token::Tuple(vec![
                    Token::Address(c.target),
                    Token::Bool(c.allow_failure),
                    Token::Bytes(c.calldata.to_vec()),
                ])
            })
            .collect();

        let mut call_data = Vec::from(selector);
        call_data.extend_from_slice(&abi::encode(&[Token::Array(tuples)]));

        let tx = TransactionRequest::new()
            .to(self.multicall_address)
            .data(Bytes::from(call_data));

        let raw = self
            .provider
            .call(&tx.into(), None)
            .await
            .map_err(|e| DexQuoteError::RpcError(format!("Multicall failed: {e}")))?;

        let outcomes = decode_aggregate3_response(&raw)?;
        if outcomes.len() != calls.len() {
            return Err(DexQuoteError::ContractError(format!(
                "Multicall returned {} results for {} calls",
                outcomes.len(),
                calls.len()
            )));
        }

        Ok(outcomes)
    }
}

fn decode_aggregate3_response(raw: &[u8]) -> Result<Vec<CallOutcome>> {
    let decoded = abi::decode(
        &[ParamType::Array(Box::new(ParamType::Tuple(vec![
            ParamType::Bool,
            ParamType::Bytes,
        ])))],
        raw,
    )
    .map_err(|e| DexQuoteError::ContractError(format!("Invalid multicall response: {e}")))?;

    let items = match decoded.into_iter().next() {
        Some(Token::Array(items)) => items,
        _ => {
            return Err(DexQuoteError::ContractError(
                "Multicall response missing result array".to_string(),
            ))
        }
    };

    items
        .into_iter()
        .map(|item| match item {
            Token::Tuple(fields) => {
                let mut fields = fields.into_iter();
                match (fields.next(), fields.next()) {
                    (Some(Token::Bool(success)), Some(Token::Bytes(return_data))) => {
                        Ok(CallOutcome {
                            success,
                            return_data: Bytes::from(return_data),
                        })
                    }
                    _ => Err(DexQuoteError::ContractError(
                        "Malformed multicall result tuple".to_string(),
                    )),
                }
            }
            _ => Err(DexQuoteError::ContractError(
                "Malformed multicall result tuple".to_string(),
            )),
        })
        .collect()
}
