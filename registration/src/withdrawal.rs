//! Reward withdrawal for the connected wallet.
//!
//! Preconditions are checked in order and no transaction is attempted once
//! one fails:
//! 1. wallet connected
//! 2. referral contract configured
//! 3. withdrawable balance above zero
//! 4. wallet on the target chain, switching automatically if it is not
//!
//! `is_processing` is false again on every exit path.

use std::sync::Arc;

use alloy_primitives::U256;
use asty_chain::{abi, with_timeout, TransactionRequest, WalletProvider};
use asty_types::{chain_name, Address, TxHash, WithdrawalState};

use crate::cache::{CacheSlot, RefreshQueue};
use crate::{AppConfig, WithdrawalError};

pub struct WithdrawalController {
    config: Arc<AppConfig>,
    wallet: Arc<dyn WalletProvider>,
    refresh: RefreshQueue,
    state: WithdrawalState,
}

impl WithdrawalController {
    pub fn new(config: Arc<AppConfig>, wallet: Arc<dyn WalletProvider>, refresh: RefreshQueue) -> Self {
        Self {
            config,
            wallet,
            refresh,
            state: WithdrawalState::default(),
        }
    }

    pub fn state(&self) -> &WithdrawalState {
        &self.state
    }

    /// Back to the default state (wallet changed).
    pub fn reset(&mut self) {
        self.state = WithdrawalState::default();
    }

    /// Withdraw `withdrawable` rewards for `account` and wait for confirmation.
    ///
    /// Dropping the returned future mid-flight still clears `is_processing`.
    pub async fn withdraw(&mut self, account: Option<Address>, withdrawable: U256) -> &WithdrawalState {
        let guard = ProcessingGuard::start(&mut self.state);
        let outcome = Self::run(&self.config, self.wallet.as_ref(), account, withdrawable).await;

        match outcome {
            Ok(hash) => {
                tracing::info!(%hash, "rewards withdrawn");
                guard.0.was_successful = true;
                guard.0.last_transaction_hash = Some(hash);
                self.refresh.schedule(CacheSlot::UserSnapshot);
            }
            Err(error) => {
                tracing::warn!(%error, "withdrawal failed");
                guard.0.error = Some(error.to_string());
            }
        }
        drop(guard);
        &self.state
    }

    async fn run(
        config: &AppConfig,
        wallet: &dyn WalletProvider,
        account: Option<Address>,
        withdrawable: U256,
    ) -> Result<TxHash, WithdrawalError> {
        let account = account.ok_or(WithdrawalError::WalletNotConnected)?;
        let contract = config.referral_contract.ok_or(WithdrawalError::MissingContract)?;
        if withdrawable.is_zero() {
            return Err(WithdrawalError::NoRewards);
        }
        Self::ensure_target_chain(config, wallet).await?;

        let request = TransactionRequest {
            from: account,
            to: contract,
            data: abi::encode_withdraw_rewards(),
        };
        let hash = with_timeout("withdrawal submission", config.read_timeout(), wallet.send_transaction(request)).await?;
        tracing::info!(%hash, "withdrawal submitted, awaiting receipt");

        let receipt = with_timeout("transaction receipt", config.receipt_timeout(), wallet.wait_for_receipt(hash)).await?;
        if !receipt.success {
            return Err(WithdrawalError::Reverted(hash));
        }
        Ok(hash)
    }

    async fn ensure_target_chain(config: &AppConfig, wallet: &dyn WalletProvider) -> Result<(), WithdrawalError> {
        let target = config.target_chain_id;
        let timeout = config.read_timeout();

        let current = with_timeout("chain id", timeout, wallet.chain_id()).await?;
        if current == target {
            return Ok(());
        }

        tracing::info!(current, target, network = chain_name(target), "wallet on wrong network, requesting switch");
        if let Err(error) = with_timeout("network switch", timeout, wallet.switch_chain(target)).await {
            tracing::warn!(%error, target, "network switch failed");
            return Err(WithdrawalError::WrongNetwork { required: target });
        }

        let switched = with_timeout("chain id", timeout, wallet.chain_id()).await?;
        if switched != target {
            return Err(WithdrawalError::WrongNetwork { required: target });
        }
        Ok(())
    }
}

/// Holds `is_processing` up for as long as it lives.
struct ProcessingGuard<'a>(&'a mut WithdrawalState);

impl<'a> ProcessingGuard<'a> {
    fn start(state: &'a mut WithdrawalState) -> Self {
        state.is_processing = true;
        state.error = None;
        state.was_successful = false;
        Self(state)
    }
}

impl Drop for ProcessingGuard<'_> {
    fn drop(&mut self) {
        self.0.is_processing = false;
    }
}
