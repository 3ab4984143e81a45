//! Read-only projections of on-chain referral-contract state.

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::address::{is_neutral, NEUTRAL_ADDRESS};

/// Depth of the referral tree tracked by the contract.
pub const REFERRAL_DEPTH: usize = 12;

/// The contract's view of one address (`getUser`).
///
/// A newer fetch replaces it wholesale. The only local edit is zeroing
/// `accrued_rewards` after a confirmed withdrawal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSnapshot {
    /// Who referred this user, or the neutral address.
    pub referrer: Address,
    /// Accrued, withdrawable rewards in smallest token units.
    pub accrued_rewards: U256,
    pub registered: bool,
    pub direct_referral_count: u64,
}

impl UserSnapshot {
    /// The snapshot the contract returns for an address it has never seen.
    pub fn unregistered() -> Self {
        Self {
            referrer: NEUTRAL_ADDRESS,
            accrued_rewards: U256::ZERO,
            registered: false,
            direct_referral_count: 0,
        }
    }

    pub fn has_referrer(&self) -> bool {
        !is_neutral(&self.referrer)
    }
}

/// Referral counts per tree level, level 1 being direct referrals.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferralLevels([u64; REFERRAL_DEPTH]);

impl ReferralLevels {
    /// Build from the contract's 13-slot array. Slot 0 is the depth-0 (self)
    /// entry and is discarded.
    pub fn from_contract(raw: [u64; REFERRAL_DEPTH + 1]) -> Self {
        let mut levels = [0u64; REFERRAL_DEPTH];
        levels.copy_from_slice(&raw[1..]);
        Self(levels)
    }

    /// Count at a 1-based level; `None` outside `1..=12`.
    pub fn level(&self, level: usize) -> Option<u64> {
        level
            .checked_sub(1)
            .and_then(|index| self.0.get(index))
            .copied()
    }

    /// Total referrals across all levels.
    pub fn total(&self) -> u64 {
        self.0.iter().fold(0u64, |acc, n| acc.saturating_add(*n))
    }

    /// `(level, count)` pairs, level ascending from 1.
    pub fn iter(&self) -> impl Iterator<Item = (usize, u64)> + '_ {
        self.0.iter().enumerate().map(|(i, n)| (i + 1, *n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unregistered_snapshot_is_neutral() {
        let snapshot = UserSnapshot::unregistered();
        assert!(!snapshot.registered);
        assert!(!snapshot.has_referrer());
    }

    #[test]
    fn levels_discard_self_slot() {
        let mut raw = [0u64; REFERRAL_DEPTH + 1];
        raw[0] = 99;
        for (i, slot) in raw.iter_mut().enumerate().skip(1) {
            *slot = i as u64;
        }
        let levels = ReferralLevels::from_contract(raw);
        assert_eq!(levels.level(1), Some(1));
        assert_eq!(levels.level(12), Some(12));
        assert_eq!(levels.level(0), None);
        assert_eq!(levels.level(13), None);
        assert_eq!(levels.total(), (1..=12).sum::<u64>());
    }

    #[test]
    fn levels_iterate_in_order() {
        let levels = ReferralLevels::from_contract([0, 5, 3, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1]);
        let collected: Vec<_> = levels.iter().filter(|(_, n)| *n > 0).collect();
        assert_eq!(collected, vec![(1, 5), (2, 3), (12, 1)]);
    }

    #[test]
    fn snapshot_serializes_to_json() {
        let snapshot = UserSnapshot {
            referrer: NEUTRAL_ADDRESS,
            accrued_rewards: U256::from(5u64),
            registered: true,
            direct_referral_count: 2,
        };
        let json = serde_json::to_string(&snapshot).unwrap();
        let back: UserSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot);
    }
}
