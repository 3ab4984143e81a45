//! Errors raised by chain collaborators.

use asty_types::TxHash;
use thiserror::Error;

/// EIP-1193 "user rejected request".
pub const USER_REJECTED_CODE: i64 = 4001;
/// EIP-3326 "unrecognized chain id" returned by `wallet_switchEthereumChain`.
pub const UNRECOGNIZED_CHAIN_CODE: i64 = 4902;
/// JSON-RPC "method not found".
pub const METHOD_NOT_FOUND_CODE: i64 = -32601;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChainError {
    #[error("RPC transport error: {0}")]
    Transport(String),

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("request rejected in wallet")]
    Rejected,

    #[error("transaction {0} reverted")]
    Reverted(TxHash),

    #[error("wallet cannot switch to chain {chain_id}: {reason}")]
    SwitchUnsupported { chain_id: u64, reason: String },

    #[error("{operation} timed out after {seconds}s")]
    Timeout { operation: &'static str, seconds: u64 },

    #[error("could not decode {0}")]
    Decode(String),
}

impl ChainError {
    /// Map a JSON-RPC error object onto the taxonomy.
    pub fn from_rpc(code: i64, message: impl Into<String>) -> Self {
        match code {
            USER_REJECTED_CODE => Self::Rejected,
            _ => Self::Rpc {
                code,
                message: message.into(),
            },
        }
    }

    /// Short human-readable text for display next to the control that failed.
    pub fn user_message(&self) -> String {
        match self {
            Self::Rpc { message, .. } if !message.is_empty() => message.clone(),
            Self::Rejected => "Transaction was rejected in your wallet".to_string(),
            Self::Reverted(_) => "Transaction failed on-chain".to_string(),
            Self::Timeout { operation, .. } => {
                format!("Timed out waiting for {operation}, please try again")
            }
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_rejection_maps_to_rejected() {
        assert_eq!(ChainError::from_rpc(4001, "User denied"), ChainError::Rejected);
    }

    #[test]
    fn rpc_message_is_shown_verbatim() {
        let err = ChainError::from_rpc(-32000, "execution reverted: not registered");
        assert_eq!(err.user_message(), "execution reverted: not registered");
    }

    #[test]
    fn empty_rpc_message_falls_back_to_display() {
        let err = ChainError::from_rpc(-32000, "");
        assert_eq!(err.user_message(), "RPC error -32000: ");
    }

    #[test]
    fn timeout_message_names_operation() {
        let err = ChainError::Timeout {
            operation: "transaction receipt",
            seconds: 300,
        };
        assert!(err.user_message().contains("transaction receipt"));
        assert_eq!(err.to_string(), "transaction receipt timed out after 300s");
    }
}
