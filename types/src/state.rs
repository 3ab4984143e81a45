//! State records owned by the registration and withdrawal controllers.
//!
//! These are plain data; the controllers in `asty-registration` are the only
//! writers.

use serde::{Deserialize, Serialize};

use crate::hash::TxHash;

/// Mutable form input. Persisted across reloads as a draft.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationFormData {
    /// Raw candidate referral address; may be empty or malformed.
    pub referral_address: String,
}

/// Field-scoped and form-wide error messages.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormErrors {
    pub referral_address: Option<String>,
    pub general: Option<String>,
}

impl FormErrors {
    pub fn is_empty(&self) -> bool {
        self.referral_address.is_none() && self.general.is_none()
    }
}

/// Lifecycle of a membership registration.
///
/// `is_submitted` never returns to `false` while the same wallet stays connected.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationState {
    pub is_submitting: bool,
    pub is_submitted: bool,
    pub errors: FormErrors,
}

/// Outcome of the last reward withdrawal for the connected wallet.
///
/// Reset to the default whenever the connected wallet changes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawalState {
    pub is_processing: bool,
    pub error: Option<String>,
    pub last_transaction_hash: Option<TxHash>,
    pub was_successful: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_idle() {
        let state = RegistrationState::default();
        assert!(!state.is_submitting);
        assert!(!state.is_submitted);
        assert!(state.errors.is_empty());

        let withdrawal = WithdrawalState::default();
        assert!(!withdrawal.is_processing);
        assert!(withdrawal.error.is_none());
        assert!(withdrawal.last_transaction_hash.is_none());
        assert!(!withdrawal.was_successful);
    }

    #[test]
    fn form_draft_round_trips_through_json() {
        let form = RegistrationFormData {
            referral_address: "0xabc".into(),
        };
        let json = serde_json::to_string(&form).unwrap();
        assert_eq!(json, r#"{"referral_address":"0xabc"}"#);
        let back: RegistrationFormData = serde_json::from_str(&json).unwrap();
        assert_eq!(back, form);
    }
}
