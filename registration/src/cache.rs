//! Read caches for on-chain views and their fire-and-forget refresh queue.
//!
//! Each slot is replaced wholesale by a successful fetch (last write wins);
//! a failed fetch leaves the previous value in place.

use std::collections::BTreeSet;

use asty_types::{Address, ReferralLevels, UserSnapshot};
use tokio::sync::mpsc;

/// A cache slot that can be scheduled for refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CacheSlot {
    /// `getUser` for the connected wallet.
    UserSnapshot,
    /// `totalRegisteredUsers`.
    TotalRegistered,
    /// `getReferralCountsByLevel` for the connected wallet.
    ReferralLevels,
}

/// Sending half of the refresh queue. Scheduling never blocks or waits.
#[derive(Debug, Clone)]
pub struct RefreshQueue {
    tx: mpsc::UnboundedSender<CacheSlot>,
}

impl RefreshQueue {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<CacheSlot>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn schedule(&self, slot: CacheSlot) {
        if self.tx.send(slot).is_err() {
            tracing::debug!(?slot, "refresh queue closed; dropping request");
        }
    }
}

/// Take every pending request, collapsing duplicates.
pub fn drain_pending(rx: &mut mpsc::UnboundedReceiver<CacheSlot>) -> Vec<CacheSlot> {
    let mut pending = BTreeSet::new();
    while let Ok(slot) = rx.try_recv() {
        pending.insert(slot);
    }
    pending.into_iter().collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadCaches {
    pub user: Option<UserSnapshot>,
    /// Last referral candidate lookup.
    pub referral: Option<(Address, UserSnapshot)>,
    pub total_registered: Option<u64>,
    pub levels: Option<ReferralLevels>,
}

impl ReadCaches {
    /// Drop everything scoped to the connected wallet.
    pub fn clear_wallet_scoped(&mut self) {
        self.user = None;
        self.levels = None;
    }

    /// Whether the connected wallet is registered according to the last fetch.
    pub fn user_registered(&self) -> bool {
        self.user.as_ref().is_some_and(|u| u.registered)
    }
}
