//! Registration submission lifecycle: `Idle → Submitting → Submitted`.
//!
//! Errors overlay any phase before `Submitted` and leave the controller
//! retryable. Once `Submitted`, the state only resets when the connected
//! wallet changes.

use std::sync::Arc;

use asty_types::{Address, FormErrors, RegistrationState};

use crate::cache::{CacheSlot, RefreshQueue};
use crate::{PaymentConfig, ReferralError, RegistrationUi, SubmissionError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionPhase {
    Idle,
    Submitting,
    Submitted,
}

/// Everything a submission attempt is checked against.
#[derive(Debug, Clone, Copy)]
pub struct SubmissionContext<'a> {
    pub account: Option<Address>,
    /// Last on-chain `registered` flag for `account`.
    pub registered_on_chain: bool,
    /// Synchronous validation error for the referral input, if any.
    pub referral_error: Option<&'a ReferralError>,
    pub payment: Option<&'a PaymentConfig>,
}

pub struct SubmissionController {
    ui: Arc<dyn RegistrationUi>,
    refresh: RefreshQueue,
    reduced_motion: bool,
    state: RegistrationState,
}

impl SubmissionController {
    pub fn new(ui: Arc<dyn RegistrationUi>, refresh: RefreshQueue) -> Self {
        Self {
            ui,
            refresh,
            reduced_motion: false,
            state: RegistrationState::default(),
        }
    }

    pub fn state(&self) -> &RegistrationState {
        &self.state
    }

    pub(crate) fn errors_mut(&mut self) -> &mut FormErrors {
        &mut self.state.errors
    }

    pub fn phase(&self) -> SubmissionPhase {
        if self.state.is_submitted {
            SubmissionPhase::Submitted
        } else if self.state.is_submitting {
            SubmissionPhase::Submitting
        } else {
            SubmissionPhase::Idle
        }
    }

    /// Suppress the celebratory effect when the user prefers reduced motion.
    pub fn set_reduced_motion(&mut self, reduced_motion: bool) {
        self.reduced_motion = reduced_motion;
    }

    /// Check the guards and open the payment dialog.
    ///
    /// On rejection the error is stored in the state record (field-scoped for
    /// referral problems, general otherwise) and returned.
    pub fn begin(&mut self, ctx: SubmissionContext<'_>) -> Result<(), SubmissionError> {
        self.state.errors.general = None;
        match self.check(&ctx) {
            Ok(payment) => {
                tracing::info!(account = ?ctx.account, "opening payment dialog");
                self.state.is_submitting = true;
                self.ui.open_payment_dialog(payment);
                Ok(())
            }
            Err(error) => {
                tracing::debug!(%error, "registration attempt rejected");
                match &error {
                    SubmissionError::InvalidReferral(referral) => {
                        self.state.errors.referral_address = Some(referral.to_string());
                    }
                    other => self.state.errors.general = Some(other.to_string()),
                }
                Err(error)
            }
        }
    }

    fn check<'a>(&self, ctx: &SubmissionContext<'a>) -> Result<&'a PaymentConfig, SubmissionError> {
        if self.state.is_submitting {
            return Err(SubmissionError::InProgress);
        }
        if ctx.account.is_none() {
            return Err(SubmissionError::WalletNotConnected);
        }
        if ctx.registered_on_chain || self.state.is_submitted {
            return Err(SubmissionError::AlreadyRegistered);
        }
        if let Some(error) = ctx.referral_error {
            return Err(SubmissionError::InvalidReferral(error.clone()));
        }
        ctx.payment.ok_or(SubmissionError::PaymentUnavailable)
    }

    /// The payment widget reported success with `reference`.
    ///
    /// Closes the dialog, marks the registration submitted, shows the welcome
    /// surface and schedules the user snapshot and total count for refresh
    /// without waiting for them.
    pub fn on_payment_completed(&mut self, reference: &str) {
        tracing::info!(reference, "membership payment completed");
        self.ui.close_payment_dialog();
        self.state.is_submitting = false;
        self.state.is_submitted = true;
        self.state.errors.general = None;
        if !self.reduced_motion {
            self.ui.celebrate();
        }
        self.ui.open_welcome();
        self.refresh.schedule(CacheSlot::UserSnapshot);
        self.refresh.schedule(CacheSlot::TotalRegistered);
    }

    /// The payment widget reported failure; stay retryable.
    pub fn on_payment_failed(&mut self, message: &str) {
        if self.state.is_submitted {
            tracing::debug!(message, "ignoring payment failure after registration");
            return;
        }
        tracing::warn!(message, "membership payment failed");
        self.state.is_submitting = false;
        self.state.errors.general = Some(message.to_string());
    }

    /// The user dismissed the payment dialog.
    pub fn on_payment_dialog_closed(&mut self) {
        if self.state.is_submitting {
            tracing::debug!("payment dialog dismissed");
            self.state.is_submitting = false;
        }
    }

    /// The chain reports the wallet as registered, however that was learned.
    pub fn on_chain_registered(&mut self) {
        if !self.state.is_submitted {
            tracing::info!("registration confirmed on chain");
        }
        self.state.is_submitted = true;
        self.state.is_submitting = false;
        self.state.errors.general = None;
    }

    /// Forget all local state (wallet changed).
    pub fn reset(&mut self) {
        self.state = RegistrationState::default();
    }
}
