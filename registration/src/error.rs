//! Error types for the registration core.
//!
//! The `Display` text of the user-facing variants is exactly what the
//! controllers store in their state records.

use asty_chain::ChainError;
use asty_types::{ChainId, TxHash};
use thiserror::Error;

/// Why a candidate referral address cannot be used.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReferralError {
    #[error("Invalid address format")]
    InvalidFormat,

    #[error("You cannot refer yourself")]
    SelfReferral,

    #[error("Referral address is not registered")]
    NotRegistered,
}

/// Rejections of a registration attempt.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubmissionError {
    #[error("Please connect your wallet")]
    WalletNotConnected,

    #[error("This wallet is already registered")]
    AlreadyRegistered,

    #[error("{0}")]
    InvalidReferral(ReferralError),

    #[error("Payment is not available right now")]
    PaymentUnavailable,

    #[error("A registration is already in progress")]
    InProgress,
}

/// Rejections and failures of a reward withdrawal.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WithdrawalError {
    #[error("Please connect your wallet")]
    WalletNotConnected,

    #[error("Referral contract is not configured. Please contact support.")]
    MissingContract,

    #[error("No rewards available to withdraw yet")]
    NoRewards,

    #[error("Please switch your wallet to chain {required} to withdraw")]
    WrongNetwork { required: ChainId },

    #[error("Withdrawal transaction {0} reverted")]
    Reverted(TxHash),

    #[error("{}", .0.user_message())]
    Chain(#[from] ChainError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store serialization error: {0}")]
    Serialization(String),

    #[error("store lock poisoned")]
    Poisoned,
}
