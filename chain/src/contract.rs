//! Read port for the on-chain referral contract.

use async_trait::async_trait;
use asty_types::{Address, ReferralLevels, UserSnapshot};

use crate::ChainError;

/// Read-only views of the referral contract.
///
/// Writes (`depositFor`, `withdrawRewards`) are signed by the wallet and go
/// through [`crate::WalletProvider::send_transaction`].
#[async_trait]
pub trait ReferralContract: Send + Sync {
    /// `getUser(address)`.
    async fn get_user(&self, user: Address) -> Result<UserSnapshot, ChainError>;

    /// `totalRegisteredUsers()`.
    async fn total_registered_users(&self) -> Result<u64, ChainError>;

    /// `getReferralCountsByLevel(address)`, mapped to levels 1–12.
    async fn referral_counts_by_level(&self, user: Address) -> Result<ReferralLevels, ChainError>;
}
