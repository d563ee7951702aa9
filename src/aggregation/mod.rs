/*
 * Cross-DEX aggregation: IQR outlier filtering, summary statistics and
 * best-quote selection over a set of per-DEX quotes
 */

use chrono::Utc;
use num_bigint::BigUint;
use tracing::{debug, warn};

use crate::models::{AggregatedPrice, DexQuote, DexQuoteError, Result, TokenInfo};

const IQR_MULTIPLIER: f64 = 1.5;

/// Fold a set of per-DEX quotes into one `AggregatedPrice`. Statistics are
/// computed over the retained set only, so a filtered outlier influences
/// neither the averages nor the best-quote pick.
pub fn calculate_aggregated_price(
    quotes: Vec<DexQuote>,
    token_in: &TokenInfo,
    token_out: &TokenInfo,
    filter_outliers: bool,
) -> Result<AggregatedPrice> {
    if quotes.is_empty() {
        return Err(DexQuoteError::EmptyQuoteSet);
    }
    let chain_id = quotes[0].result.chain_id;

    let retained = if filter_outliers {
        filter_outlier_quotes(quotes)
    } else {
        quotes
    };
    if retained.is_empty() {
        return Err(DexQuoteError::AllQuotesFiltered);
    }

    let mut prices: Vec<f64> = retained.iter().map(|q| q.result.price).collect();
    prices.sort_by(f64::total_cmp);

    let average = prices.iter().sum::<f64>() / prices.len() as f64;
    let median = median_of_sorted(&prices);
    let min = prices[0];
    let max = prices[prices.len() - 1];

    let best = select_best_quote(&retained)?.clone();

    Ok(AggregatedPrice {
        average,
        median,
        min,
        max,
        best,
        all: retained,
        token_in: token_in.clone(),
        token_out: token_out.clone(),
        chain_id,
        timestamp: Utc::now(),
    })
}

/// Drop quotes whose price falls outside `[q1 - 1.5*iqr, q3 + 1.5*iqr]`,
/// bounds inclusive. Quartiles are taken by index on the sorted prices:
/// `q1 = sorted[floor(n * 0.25)]`, `q3 = sorted[floor(n * 0.75)]`.
///
/// Fewer than three quotes pass through unfiltered; exactly three get
/// filtered, but the bounds are weak enough to warrant a warning.
pub fn filter_outlier_quotes(quotes: Vec<DexQuote>) -> Vec<DexQuote> {
    let n = quotes.len();
    if n < 3 {
        warn!(quotes = n, "too few quotes for outlier filtering, keeping all");
        return quotes;
    }
    if n == 3 {
        warn!("filtering outliers from only three quotes, bounds are weak");
    }

    let mut sorted: Vec<f64> = quotes.iter().map(|q| q.result.price).collect();
    sorted.sort_by(f64::total_cmp);

    let q1 = sorted[(n as f64 * 0.25).floor() as usize];
    let q3 = sorted[(n as f64 * 0.75).floor() as usize];
    let iqr = q3 - q1;
    let lower = q1 - IQR_MULTIPLIER * iqr;
    let upper = q3 + IQR_MULTIPLIER * iqr;

    let (kept, dropped): (Vec<DexQuote>, Vec<DexQuote>) = quotes
        .into_iter()
        .partition(|q| q.result.price >= lower && q.result.price <= upper);

    for quote in &dropped {
        debug!(
            dex = %quote.dex_type,
            price = quote.result.price,
            lower,
            upper,
            "dropped outlier quote"
        );
    }

    kept
}

/// Pick the quote with the greatest raw `amount_out`, comparing the decimal
/// strings as arbitrary-precision integers. A later quote wins only with a
/// strictly greater amount, so ties resolve to the earliest quote.
pub fn select_best_quote(quotes: &[DexQuote]) -> Result<&DexQuote> {
    let mut best: Option<(&DexQuote, BigUint)> = None;

    for quote in quotes {
        let amount: BigUint = quote.result.amount_out.parse().map_err(|e| {
            DexQuoteError::CalculationError(format!(
                "Invalid amountOut \"{}\" from {}: {e}",
                quote.result.amount_out, quote.dex_type
            ))
        })?;

        best = match best {
            Some((prev, prev_amount)) if amount <= prev_amount => Some((prev, prev_amount)),
            _ => Some((quote, amount)),
        };
    }

    best.map(|(quote, _)| quote)
        .ok_or(DexQuoteError::EmptyQuoteSet)
}

fn median_of_sorted(prices: &[f64]) -> f64 {
    let mid = prices.len() / 2;
    if prices.len() % 2 == 0 {
        (prices[mid - 1] + prices[mid]) / 2.0
    } else {
        prices[mid]
    }
}
