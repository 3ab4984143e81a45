//! Nullable referral contract — configured snapshots, recorded calls.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use asty_chain::{ChainError, ReferralContract};
use asty_types::{Address, ReferralLevels, UserSnapshot};

/// A contract call the flow made, for assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractCall {
    GetUser(Address),
    TotalRegistered,
    ReferralLevels(Address),
}

/// An in-memory referral contract.
///
/// Unknown users read as unregistered, like the real contract.
pub struct NullReferralContract {
    users: Mutex<HashMap<Address, UserSnapshot>>,
    levels: Mutex<HashMap<Address, ReferralLevels>>,
    total: Mutex<u64>,
    failure: Mutex<Option<ChainError>>,
    delay: Mutex<Option<Duration>>,
    calls: Mutex<Vec<ContractCall>>,
}

impl NullReferralContract {
    pub fn new() -> Self {
        Self {
            users: Mutex::new(HashMap::new()),
            levels: Mutex::new(HashMap::new()),
            total: Mutex::new(0),
            failure: Mutex::new(None),
            delay: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Store a snapshot for `user`.
    pub fn set_user(&self, user: Address, snapshot: UserSnapshot) {
        self.users.lock().unwrap().insert(user, snapshot);
    }

    /// Mark `user` as registered with no referrer and no rewards.
    pub fn register(&self, user: Address) {
        self.set_user(
            user,
            UserSnapshot {
                registered: true,
                ..UserSnapshot::unregistered()
            },
        );
    }

    pub fn set_levels(&self, user: Address, levels: ReferralLevels) {
        self.levels.lock().unwrap().insert(user, levels);
    }

    pub fn set_total_registered(&self, total: u64) {
        *self.total.lock().unwrap() = total;
    }

    /// Make every following call fail with `error` (or succeed again on `None`).
    pub fn fail_with(&self, error: Option<ChainError>) {
        *self.failure.lock().unwrap() = error;
    }

    /// Sleep this long before answering. Pair with a paused tokio clock.
    pub fn set_delay(&self, delay: Option<Duration>) {
        *self.delay.lock().unwrap() = delay;
    }

    /// All calls made so far.
    pub fn calls(&self) -> Vec<ContractCall> {
        self.calls.lock().unwrap().clone()
    }

    async fn enter(&self, call: ContractCall) -> Result<(), ChainError> {
        self.calls.lock().unwrap().push(call);
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        match self.failure.lock().unwrap().clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl Default for NullReferralContract {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReferralContract for NullReferralContract {
    async fn get_user(&self, user: Address) -> Result<UserSnapshot, ChainError> {
        self.enter(ContractCall::GetUser(user)).await?;
        Ok(self
            .users
            .lock()
            .unwrap()
            .get(&user)
            .cloned()
            .unwrap_or_else(UserSnapshot::unregistered))
    }

    async fn total_registered_users(&self) -> Result<u64, ChainError> {
        self.enter(ContractCall::TotalRegistered).await?;
        Ok(*self.total.lock().unwrap())
    }

    async fn referral_counts_by_level(&self, user: Address) -> Result<ReferralLevels, ChainError> {
        self.enter(ContractCall::ReferralLevels(user)).await?;
        Ok(self.levels.lock().unwrap().get(&user).copied().unwrap_or_default())
    }
}
