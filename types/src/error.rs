//! Error type for parsing the shared types.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypesError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("token decimals {0} out of range")]
    DecimalsOutOfRange(u8),

    #[error("{whole} tokens at {decimals} decimals overflows 256 bits")]
    AmountOverflow { whole: u64, decimals: u8 },
}
