//! Port for the connected wallet.

use alloy_primitives::Bytes;
use async_trait::async_trait;
use asty_types::{Address, ChainId, TxHash};
use serde::{Deserialize, Serialize};

use crate::ChainError;

/// An unsigned contract call for the wallet to sign and broadcast.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRequest {
    pub from: Address,
    pub to: Address,
    pub data: Bytes,
}

/// The parts of a mined receipt the flow cares about.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceipt {
    pub transaction_hash: TxHash,
    pub block_number: u64,
    /// `status == 1`.
    pub success: bool,
}

/// The wallet the user connected.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// The first account the wallet exposes, if any.
    async fn account(&self) -> Result<Option<Address>, ChainError>;

    /// Chain the wallet is currently on.
    async fn chain_id(&self) -> Result<ChainId, ChainError>;

    /// Ask the wallet to move to `chain_id`. May fail or be unsupported.
    async fn switch_chain(&self, chain_id: ChainId) -> Result<(), ChainError>;

    /// Sign and broadcast; returns once the wallet hands back the hash.
    async fn send_transaction(&self, request: TransactionRequest) -> Result<TxHash, ChainError>;

    /// Wait until `hash` is mined. Unbounded; callers apply their own timeout.
    async fn wait_for_receipt(&self, hash: TxHash) -> Result<TransactionReceipt, ChainError>;
}
