//! Token amounts in smallest units.
//!
//! Amounts are `U256` smallest-unit integers as the token contract stores them.
//! Whole-token values are only produced for display.

use alloy_primitives::U256;

use crate::error::TypesError;

/// Largest decimals value whose unit (`10^77`) still fits in a `U256`.
pub const MAX_DECIMALS: u8 = 77;

/// `10^decimals` as a `U256`.
pub fn unit(decimals: u8) -> Result<U256, TypesError> {
    U256::from(10u64)
        .checked_pow(U256::from(decimals))
        .ok_or(TypesError::DecimalsOutOfRange(decimals))
}

/// Convert a whole-token amount into smallest units.
pub fn scale_to_units(whole: u64, decimals: u8) -> Result<U256, TypesError> {
    U256::from(whole)
        .checked_mul(unit(decimals)?)
        .ok_or(TypesError::AmountOverflow { whole, decimals })
}

/// Render a smallest-unit amount as a whole-token decimal string.
///
/// Trailing fractional zeros are trimmed: `1_500_000` at 6 decimals is `"1.5"`.
/// Past [`MAX_DECIMALS`] the raw smallest-unit integer is returned.
pub fn format_token_amount(amount: U256, decimals: u8) -> String {
    let Ok(base) = unit(decimals) else {
        return amount.to_string();
    };
    let whole = amount / base;
    let frac = amount % base;
    if frac.is_zero() {
        return whole.to_string();
    }
    let padded = format!("{:0>width$}", frac.to_string(), width = decimals as usize);
    format!("{whole}.{}", padded.trim_end_matches('0'))
}
