//! Short display forms for addresses and hashes.

use asty_types::{Address, TxHash};

/// `0x1234…abcd` form of an address (checksummed).
pub fn short_address(address: &Address) -> String {
    abbreviate(&address.to_string())
}

/// `0x1234…abcd` form of a transaction hash.
pub fn short_hash(hash: &TxHash) -> String {
    abbreviate(&hash.to_string())
}

fn abbreviate(full: &str) -> String {
    if full.len() <= 10 {
        return full.to_string();
    }
    format!("{}…{}", &full[..6], &full[full.len() - 4..])
}
