//! Nullable wallet — records transactions instead of signing them.

use std::sync::Mutex;
use std::time::Duration;

use alloy_primitives::B256;
use async_trait::async_trait;
use asty_chain::{ChainError, TransactionReceipt, TransactionRequest, WalletProvider};
use asty_types::{Address, ChainId, TxHash};

/// A test wallet on a configurable chain.
///
/// Transaction hashes are deterministic: the n-th sent transaction gets a
/// hash whose last byte is n.
pub struct NullWallet {
    account: Mutex<Option<Address>>,
    chain_id: Mutex<ChainId>,
    switch_error: Mutex<Option<ChainError>>,
    send_error: Mutex<Option<ChainError>>,
    receipt_success: Mutex<bool>,
    receipt_delay: Mutex<Option<Duration>>,
    switch_requests: Mutex<Vec<ChainId>>,
    sent: Mutex<Vec<TransactionRequest>>,
}

impl NullWallet {
    pub fn new(account: Option<Address>, chain_id: ChainId) -> Self {
        Self {
            account: Mutex::new(account),
            chain_id: Mutex::new(chain_id),
            switch_error: Mutex::new(None),
            send_error: Mutex::new(None),
            receipt_success: Mutex::new(true),
            receipt_delay: Mutex::new(None),
            switch_requests: Mutex::new(Vec::new()),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn set_account(&self, account: Option<Address>) {
        *self.account.lock().unwrap() = account;
    }

    pub fn set_chain_id(&self, chain_id: ChainId) {
        *self.chain_id.lock().unwrap() = chain_id;
    }

    /// Make `switch_chain` fail with `error` (or succeed again on `None`).
    pub fn fail_switch_with(&self, error: Option<ChainError>) {
        *self.switch_error.lock().unwrap() = error;
    }

    /// Make `send_transaction` fail with `error` (or succeed again on `None`).
    pub fn fail_send_with(&self, error: Option<ChainError>) {
        *self.send_error.lock().unwrap() = error;
    }

    /// Whether mined receipts report success.
    pub fn set_receipt_success(&self, success: bool) {
        *self.receipt_success.lock().unwrap() = success;
    }

    /// Delay receipts by this long. Pair with a paused tokio clock.
    pub fn set_receipt_delay(&self, delay: Option<Duration>) {
        *self.receipt_delay.lock().unwrap() = delay;
    }

    /// Chains `switch_chain` was asked for, in order.
    pub fn switch_requests(&self) -> Vec<ChainId> {
        self.switch_requests.lock().unwrap().clone()
    }

    /// Every transaction handed to the wallet.
    pub fn sent(&self) -> Vec<TransactionRequest> {
        self.sent.lock().unwrap().clone()
    }
}

impl Default for NullWallet {
    fn default() -> Self {
        Self::new(None, 1)
    }
}

#[async_trait]
impl WalletProvider for NullWallet {
    async fn account(&self) -> Result<Option<Address>, ChainError> {
        Ok(*self.account.lock().unwrap())
    }

    async fn chain_id(&self) -> Result<ChainId, ChainError> {
        Ok(*self.chain_id.lock().unwrap())
    }

    async fn switch_chain(&self, chain_id: ChainId) -> Result<(), ChainError> {
        self.switch_requests.lock().unwrap().push(chain_id);
        if let Some(error) = self.switch_error.lock().unwrap().clone() {
            return Err(error);
        }
        *self.chain_id.lock().unwrap() = chain_id;
        Ok(())
    }

    async fn send_transaction(&self, request: TransactionRequest) -> Result<TxHash, ChainError> {
        if let Some(error) = self.send_error.lock().unwrap().clone() {
            return Err(error);
        }
        let mut sent = self.sent.lock().unwrap();
        sent.push(request);
        Ok(B256::with_last_byte(sent.len() as u8))
    }

    async fn wait_for_receipt(&self, hash: TxHash) -> Result<TransactionReceipt, ChainError> {
        let delay = *self.receipt_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(TransactionReceipt {
            transaction_hash: hash,
            block_number: 1,
            success: *self.receipt_success.lock().unwrap(),
        })
    }
}
