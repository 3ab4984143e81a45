//! Transaction hash type.

/// A 32-byte transaction hash as returned by the wallet on submission.
pub type TxHash = alloy_primitives::B256;
