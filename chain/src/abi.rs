//! ABI encodings for the referral contract and the deposit token.

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::{sol, SolCall};
use asty_types::{ReferralLevels, UserSnapshot, REFERRAL_DEPTH};

use crate::ChainError;

sol! {
    interface IAstyReferral {
        function getUser(address user) external view returns (address referrer, uint256 accruedRewards, bool registered, uint256 directReferralCount);
        function totalRegisteredUsers() external view returns (uint256 total);
        function getReferralCountsByLevel(address user) external view returns (uint256[13] counts);
        function depositFor(address user, address referrer) external;
        function withdrawRewards() external;
    }

    interface IERC20 {
        function approve(address spender, uint256 amount) external returns (bool);
    }
}

// ── Writes ─────────────────────────────────────────────────────────────

/// `approve(spender, amount)` on the deposit token.
pub fn encode_approve(spender: Address, amount: U256) -> Bytes {
    IERC20::approveCall { spender, amount }.abi_encode().into()
}

/// `depositFor(user, referrer)` on the referral contract.
pub fn encode_deposit_for(user: Address, referrer: Address) -> Bytes {
    IAstyReferral::depositForCall { user, referrer }.abi_encode().into()
}

/// `withdrawRewards()` on the referral contract.
pub fn encode_withdraw_rewards() -> Bytes {
    IAstyReferral::withdrawRewardsCall {}.abi_encode().into()
}

// ── Reads ──────────────────────────────────────────────────────────────

pub fn encode_get_user(user: Address) -> Bytes {
    IAstyReferral::getUserCall { user }.abi_encode().into()
}

pub fn encode_total_registered_users() -> Bytes {
    IAstyReferral::totalRegisteredUsersCall {}.abi_encode().into()
}

pub fn encode_referral_counts_by_level(user: Address) -> Bytes {
    IAstyReferral::getReferralCountsByLevelCall { user }.abi_encode().into()
}

pub fn decode_get_user(data: &[u8]) -> Result<UserSnapshot, ChainError> {
    let ret = IAstyReferral::getUserCall::abi_decode_returns(data, true)
        .map_err(|e| ChainError::Decode(format!("getUser result: {e}")))?;
    Ok(UserSnapshot {
        referrer: ret.referrer,
        accrued_rewards: ret.accruedRewards,
        registered: ret.registered,
        direct_referral_count: to_u64(ret.directReferralCount, "directReferralCount")?,
    })
}

pub fn decode_total_registered_users(data: &[u8]) -> Result<u64, ChainError> {
    let ret = IAstyReferral::totalRegisteredUsersCall::abi_decode_returns(data, true)
        .map_err(|e| ChainError::Decode(format!("totalRegisteredUsers result: {e}")))?;
    to_u64(ret.total, "totalRegisteredUsers")
}

pub fn decode_referral_counts_by_level(data: &[u8]) -> Result<ReferralLevels, ChainError> {
    let ret = IAstyReferral::getReferralCountsByLevelCall::abi_decode_returns(data, true)
        .map_err(|e| ChainError::Decode(format!("getReferralCountsByLevel result: {e}")))?;
    let mut raw = [0u64; REFERRAL_DEPTH + 1];
    for (slot, count) in raw.iter_mut().zip(ret.counts) {
        *slot = to_u64(count, "referral level count")?;
    }
    Ok(ReferralLevels::from_contract(raw))
}

fn to_u64(value: U256, field: &str) -> Result<u64, ChainError> {
    u64::try_from(value).map_err(|_| ChainError::Decode(format!("{field} exceeds u64: {value}")))
}
