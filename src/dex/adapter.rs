/*
 * Shared quoter adapter. Fee-tier forks (Uniswap V3 ABI) and tick-spacing
 * forks (Slipstream ABI) differ only in one field of the quoter params
 * struct; the batching, reduction and price impact logic is common.
 */

use async_trait::async_trait;
use ethers::abi::{self, ParamType, Token};
use ethers::types::{Bytes, U256};
use ethers::utils::keccak256;
use tracing::{debug, info};

use crate::models::{DexQuoteError, PoolTier, PriceResult, Result, TierType, TokenInfo};
use crate::rpc::{Call3, CallOutcome, RpcClient};
use crate::tokens::validate_token_info;
use crate::utils::{format_units, u256_to_f64};

use super::{DexAdapter, DexConfig, PoolQuote};

/// Fixed reference trade used to estimate the undisturbed spot rate:
/// 0.001 in 18-decimal units.
fn spot_reference_amount() -> U256 {
    U256::exp10(15)
}

pub struct QuoterAdapter {
    config: DexConfig,
}

impl QuoterAdapter {
    #[must_use]
    pub fn new(config: DexConfig) -> Self {
        Self { config }
    }

    fn validate_inputs(
        token_in: &TokenInfo,
        token_out: &TokenInfo,
        amount_in: U256,
    ) -> Result<()> {
        validate_token_info(token_in)?;
        validate_token_info(token_out)?;
        if token_in.address == token_out.address {
            return Err(DexQuoteError::InvalidInput(format!(
                "tokenIn and tokenOut share the same address ({:#x})",
                token_in.address
            )));
        }
        if amount_in.is_zero() {
            return Err(DexQuoteError::InvalidInput(
                "amount_in must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// ABI-encode `quoteExactInputSingle` for one tier. The params struct
    /// carries `fee: uint24` for the fee family and `tickSpacing: int24` for
    /// the Slipstream family; field order is otherwise identical.
    fn build_quote_calldata(
        &self,
        token_in: &TokenInfo,
        token_out: &TokenInfo,
        amount_in: U256,
        tier: u32,
    ) -> Bytes {
        let (signature, tier_token): (&[u8], Token) = match self.config.tier_type {
            TierType::Fee => (
                b"quoteExactInputSingle((address,address,uint256,uint24,uint160))",
                Token::Uint(U256::from(tier)),
            ),
            TierType::TickSpacing => (
                b"quoteExactInputSingle((address,address,uint256,int24,uint160))",
                Token::Int(U256::from(tier)),
            ),
        };

        let selector = &keccak256(signature)[0..4];
        let params = abi::encode(&[Token::Tuple(vec![
            Token::Address(token_in.address),
            Token::Address(token_out.address),
            Token::Uint(amount_in),
            tier_token,
            // sqrtPriceLimitX96 = 0: no limit, quote the full amount
            Token::Uint(U256::zero()),
        ])]);

        let mut call_data = Vec::from(selector);
        call_data.extend_from_slice(&params);
        Bytes::from(call_data)
    }

    fn quote_call(
        &self,
        token_in: &TokenInfo,
        token_out: &TokenInfo,
        amount_in: U256,
        tier: u32,
    ) -> Call3 {
        Call3 {
            target: self.config.quoter_address,
            allow_failure: true,
            calldata: self.build_quote_calldata(token_in, token_out, amount_in, tier),
        }
    }

    /// Decode one tier's outcome into a `PoolQuote`. Failed or undecodable
    /// calls mean "no usable pool at this tier" and yield `None`; a zero
    /// `amountOut` is kept here and filtered only where callers require it.
    fn tier_quote(
        &self,
        actual: &CallOutcome,
        spot: &CallOutcome,
        token_in: &TokenInfo,
        token_out: &TokenInfo,
        amount_in: U256,
        tier: u32,
    ) -> Option<PoolQuote> {
        if !actual.success {
            return None;
        }
        let (amount_out, gas_estimate) = match decode_quoter_response(&actual.return_data) {
            Ok(decoded) => decoded,
            Err(e) => {
                debug!(tier, error = %e, "skipping undecodable quoter response");
                return None;
            }
        };

        let pool_tier = PoolTier::new(self.config.tier_type, tier);
        let price = format_units(amount_out, token_out.decimals)
            / format_units(amount_in, token_in.decimals);
        let price_impact = price_impact_from_spot(spot, amount_out, amount_in);
        let formatted = format!(
            "1 {} = {:.2} {} ({})",
            token_in.symbol, price, token_out.symbol, pool_tier.display
        );

        Some(PoolQuote {
            pool_tier,
            amount_out,
            price,
            formatted,
            gas_estimate,
            price_impact,
        })
    }

    fn single_tier_result(
        &self,
        actual: &CallOutcome,
        spot: &CallOutcome,
        token_in: &TokenInfo,
        token_out: &TokenInfo,
        amount_in: U256,
        tier: u32,
    ) -> Option<PriceResult> {
        self.tier_quote(actual, spot, token_in, token_out, amount_in, tier)
            .filter(|quote| !quote.amount_out.is_zero())
            .map(|quote| self.to_price_result(quote, token_in, token_out, amount_in))
    }

    fn to_price_result(
        &self,
        quote: PoolQuote,
        token_in: &TokenInfo,
        token_out: &TokenInfo,
        amount_in: U256,
    ) -> PriceResult {
        PriceResult {
            token_in: token_in.clone(),
            token_out: token_out.clone(),
            amount_in: amount_in.to_string(),
            amount_out: quote.amount_out.to_string(),
            price: quote.price,
            formatted: quote.formatted,
            pool_tier: quote.pool_tier,
            chain_id: self.config.chain_id,
            gas_estimate: quote.gas_estimate.to_string(),
            price_impact: quote.price_impact,
        }
    }

    fn no_liquidity(&self, token_in: &TokenInfo, token_out: &TokenInfo) -> DexQuoteError {
        DexQuoteError::NoLiquidity {
            token_in: token_in.symbol.clone(),
            token_out: token_out.symbol.clone(),
            dex_name: self.config.protocol.name.clone(),
            chain_id: self.config.chain_id,
        }
    }

    fn reduce_to_result(
        &self,
        quotes: Vec<PoolQuote>,
        token_in: &TokenInfo,
        token_out: &TokenInfo,
        amount_in: U256,
    ) -> Result<PriceResult> {
        let found = quotes.len();
        let best =
            select_best_tier(quotes).ok_or_else(|| self.no_liquidity(token_in, token_out))?;

        info!(
            protocol = %self.config.protocol.name,
            chain_id = self.config.chain_id,
            pools = found,
            best_tier = %best.pool_tier.display,
            "found pools for {}/{}",
            token_in.symbol,
            token_out.symbol
        );

        Ok(self.to_price_result(best, token_in, token_out, amount_in))
    }
}

/// Stable left-to-right max by raw output amount: a later tier wins only
/// with a strictly greater `amount_out`, so ties resolve to the earliest
/// tier in configured order.
fn select_best_tier(quotes: Vec<PoolQuote>) -> Option<PoolQuote> {
    quotes.into_iter().reduce(|best, current| {
        if current.amount_out > best.amount_out {
            current
        } else {
            best
        }
    })
}

/// Decode the QuoterV2-style response tuple
/// `(amountOut, sqrtPriceX96After, initializedTicksCrossed, gasEstimate)`.
fn decode_quoter_response(data: &[u8]) -> Result<(U256, U256)> {
    let tokens = abi::decode(
        &[
            ParamType::Uint(256),
            ParamType::Uint(160),
            ParamType::Uint(32),
            ParamType::Uint(256),
        ],
        data,
    )
    .map_err(|e| DexQuoteError::ContractError(format!("Invalid quoter response: {e}")))?;

    let amount_out = tokens
        .first()
        .and_then(|t| t.clone().into_uint())
        .ok_or_else(|| {
            DexQuoteError::ContractError("Quoter response missing amountOut".to_string())
        })?;
    let gas_estimate = tokens
        .get(3)
        .and_then(|t| t.clone().into_uint())
        .ok_or_else(|| {
            DexQuoteError::ContractError("Quoter response missing gasEstimate".to_string())
        })?;

    Ok((amount_out, gas_estimate))
}

/// Price impact from a spot reference quote: how far the achieved raw rate
/// falls short of the undisturbed rate, as a percentage. Reported as exactly
/// zero when the spot call failed or its rate is non-positive.
fn price_impact_from_spot(spot: &CallOutcome, amount_out: U256, amount_in: U256) -> f64 {
    if !spot.success {
        return 0.0;
    }
    let Ok((spot_out, _)) = decode_quoter_response(&spot.return_data) else {
        return 0.0;
    };

    let spot_rate = u256_to_f64(spot_out) / u256_to_f64(spot_reference_amount());
    if spot_rate <= 0.0 {
        return 0.0;
    }
    let actual_rate = u256_to_f64(amount_out) / u256_to_f64(amount_in);

    ((spot_rate - actual_rate) / spot_rate * 100.0).max(0.0)
}

#[async_trait]
impl DexAdapter for QuoterAdapter {
    fn config(&self) -> &DexConfig {
        &self.config
    }

    async fn get_quote(
        &self,
        rpc: &RpcClient,
        token_in: &TokenInfo,
        token_out: &TokenInfo,
        amount_in: U256,
    ) -> Result<PriceResult> {
        Self::validate_inputs(token_in, token_out, amount_in)?;

        // One actual-amount read plus one spot-reference read per tier, all
        // in a single batched round trip.
        let tiers = self.config.tiers.clone();
        let mut calls = Vec::with_capacity(tiers.len() * 2);
        for &tier in &tiers {
            calls.push(self.quote_call(token_in, token_out, amount_in, tier));
        }
        for &tier in &tiers {
            calls.push(self.quote_call(token_in, token_out, spot_reference_amount(), tier));
        }

        let outcomes = rpc.multicall(&calls).await?;
        let (actual_outcomes, spot_outcomes) = outcomes.split_at(tiers.len());

        let quotes: Vec<PoolQuote> = tiers
            .iter()
            .enumerate()
            .filter_map(|(i, &tier)| {
                self.tier_quote(
                    &actual_outcomes[i],
                    &spot_outcomes[i],
                    token_in,
                    token_out,
                    amount_in,
                    tier,
                )
            })
            .collect();

        self.reduce_to_result(quotes, token_in, token_out, amount_in)
    }

    async fn get_quote_for_pool_param(
        &self,
        rpc: &RpcClient,
        token_in: &TokenInfo,
        token_out: &TokenInfo,
        amount_in: U256,
        tier: u32,
    ) -> Result<Option<PriceResult>> {
        Self::validate_inputs(token_in, token_out, amount_in)?;

        let calls = vec![
            self.quote_call(token_in, token_out, amount_in, tier),
            self.quote_call(token_in, token_out, spot_reference_amount(), tier),
        ];
        let outcomes = rpc.multicall(&calls).await?;

        Ok(self.single_tier_result(
            &outcomes[0],
            &outcomes[1],
            token_in,
            token_out,
            amount_in,
            tier,
        ))
    }
}
