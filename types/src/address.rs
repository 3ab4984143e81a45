//! EVM account addresses and the referral-address format rules.

pub use alloy_primitives::Address;

use crate::error::TypesError;

/// Sentinel address meaning "no referrer".
pub const NEUTRAL_ADDRESS: Address = Address::ZERO;

/// Length of a `0x`-prefixed, 20-byte hex address string.
pub const ADDRESS_STR_LEN: usize = 42;

/// Whether `candidate` is `0x` followed by exactly 40 hex characters.
///
/// Mixed case is accepted; the EIP-55 checksum is not enforced.
pub fn is_address_format(candidate: &str) -> bool {
    candidate.len() == ADDRESS_STR_LEN
        && candidate.starts_with("0x")
        && candidate.as_bytes()[2..].iter().all(u8::is_ascii_hexdigit)
}

/// Parse a string that passes [`is_address_format`] into an [`Address`].
pub fn parse_address(candidate: &str) -> Result<Address, TypesError> {
    if !is_address_format(candidate) {
        return Err(TypesError::InvalidAddress(candidate.to_string()));
    }
    candidate
        .parse::<Address>()
        .map_err(|e| TypesError::InvalidAddress(format!("{candidate}: {e}")))
}

/// Case-insensitive address string comparison.
pub fn addresses_match(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

/// Whether an address is the "no referrer" sentinel.
pub fn is_neutral(address: &Address) -> bool {
    *address == NEUTRAL_ADDRESS
}
