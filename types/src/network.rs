//! Chain identifiers.

/// EIP-155 chain id.
pub type ChainId = u64;

/// Ethereum mainnet.
pub const ETHEREUM_MAINNET: ChainId = 1;
/// Base mainnet, the default target chain.
pub const BASE_MAINNET: ChainId = 8453;
/// Base Sepolia testnet.
pub const BASE_SEPOLIA: ChainId = 84532;

/// Human-readable name for known chains.
pub fn chain_name(chain_id: ChainId) -> &'static str {
    match chain_id {
        ETHEREUM_MAINNET => "Ethereum",
        BASE_MAINNET => "Base",
        BASE_SEPOLIA => "Base Sepolia",
        _ => "unknown chain",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_chain_names() {
        assert_eq!(chain_name(8453), "Base");
        assert_eq!(chain_name(1), "Ethereum");
        assert_eq!(chain_name(999_999), "unknown chain");
    }
}
