/*
 * Unit conversion helpers shared by the adapters and the client façade
 */

use ethers::types::U256;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::models::{DexQuoteError, Result};

/// Convert a raw integer amount into human units as an f64.
///
/// Lossy past ~15 significant digits, which is fine for display-grade prices;
/// selection logic must compare raw integers instead.
#[must_use]
pub fn format_units(amount: U256, decimals: u8) -> f64 {
    u256_to_f64(amount) / 10f64.powi(i32::from(decimals))
}

/// Approximate an U256 as f64 via its decimal string. A decimal integer
/// string always parses as a float, so the fallback is unreachable.
#[must_use]
pub fn u256_to_f64(value: U256) -> f64 {
    value.to_string().parse::<f64>().unwrap_or(f64::MAX)
}

/// Parse a human-unit amount ("1.5") into raw integer units for a token with
/// the given decimals. Exact: scales the decimal mantissa instead of going
/// through floats.
pub fn parse_units(amount: &str, decimals: u8) -> Result<U256> {
    let parsed = Decimal::from_str(amount)
        .map_err(|e| DexQuoteError::InvalidInput(format!("Invalid amount \"{amount}\": {e}")))?;

    if parsed.is_sign_negative() {
        return Err(DexQuoteError::InvalidInput(format!(
            "Amount cannot be negative: {amount}"
        )));
    }

    let scale = parsed.scale();
    if scale > u32::from(decimals) {
        return Err(DexQuoteError::InvalidInput(format!(
            "Amount {amount} has more than {decimals} decimal places"
        )));
    }

    let mantissa = parsed.mantissa().unsigned_abs();
    let shift = u32::from(decimals) - scale;

    let base = U256::from_dec_str(&mantissa.to_string())
        .map_err(|e| DexQuoteError::CalculationError(format!("Amount conversion error: {e}")))?;

    base.checked_mul(U256::exp10(shift as usize))
        .ok_or_else(|| {
            DexQuoteError::CalculationError(format!(
                "Amount {amount} overflows 256 bits at {decimals} decimals"
            ))
        })
}

/// Validate a 0x-prefixed, 40-hex-digit address string and return it
/// lowercased.
pub fn format_address(address: &str) -> Result<String> {
    if !address.starts_with("0x")
        || address.len() != 42
        || !address[2..].chars().all(|c| c.is_ascii_hexdigit())
    {
        return Err(DexQuoteError::InvalidToken(format!(
            "Invalid address format: {address}"
        )));
    }
    Ok(address.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_units_scales_whole_amounts() {
        assert_eq!(parse_units("1", 18).unwrap(), U256::exp10(18));
        assert_eq!(parse_units("10", 6).unwrap(), U256::from(10_000_000u64));
        assert_eq!(parse_units("0", 18).unwrap(), U256::zero());
    }

    #[test]
    fn parse_units_scales_fractional_amounts() {
        assert_eq!(
            parse_units("1.5", 6).unwrap(),
            U256::from(1_500_000u64)
        );
        assert_eq!(parse_units("0.001", 18).unwrap(), U256::exp10(15));
    }

    #[test]
    fn parse_units_rejects_excess_precision() {
        assert!(parse_units("1.0000001", 6).is_err());
        assert!(parse_units("-1", 18).is_err());
        assert!(parse_units("abc", 18).is_err());
    }

    #[test]
    fn format_units_adjusts_by_decimals() {
        let one_eth = U256::exp10(18);
        assert!((format_units(one_eth, 18) - 1.0).abs() < 1e-12);

        let usdc = U256::from(2_500_000_000u64);
        assert!((format_units(usdc, 6) - 2500.0).abs() < 1e-9);
    }

    #[test]
    fn u256_to_f64_handles_values_beyond_u128() {
        let huge = U256::exp10(40);
        let approx = u256_to_f64(huge);
        assert!((approx - 1e40).abs() / 1e40 < 1e-10);
    }

    #[test]
    fn format_address_lowercases_and_validates() {
        let checksummed = "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2";
        assert_eq!(
            format_address(checksummed).unwrap(),
            checksummed.to_lowercase()
        );
        assert!(format_address("0x1234").is_err());
        assert!(format_address("C02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2").is_err());
        assert!(format_address("0xZZZaaA39b223FE8D0A0e5C4F27eAD9083C756Cc2").is_err());
    }
}
