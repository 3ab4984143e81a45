//! Synchronous referral-address checks.

use asty_types::{addresses_match, is_address_format, Address};

use crate::ReferralError;

/// Check a candidate referral address against the format and self-referral rules.
///
/// Empty or whitespace-only input means "no referral" and is valid. This never
/// reports on-chain registration status; that is [`crate::resolver`]'s job.
pub fn validate_referral(candidate: &str, own_address: Option<&Address>) -> Option<ReferralError> {
    if candidate.trim().is_empty() {
        return None;
    }
    if !is_address_format(candidate) {
        return Some(ReferralError::InvalidFormat);
    }
    match own_address {
        Some(own) if addresses_match(candidate, &own.to_string()) => Some(ReferralError::SelfReferral),
        _ => None,
    }
}
