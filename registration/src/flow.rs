//! The registration flow for one page session.
//!
//! Derived values (validation errors, effective referral, payment
//! configuration) are recomputed explicitly whenever a named input changes:
//! the page mounts, the wallet changes, the referral input changes, or a
//! lookup or refresh completes.

use std::sync::Arc;

use alloy_primitives::U256;
use asty_chain::{with_timeout, ChainError, ReferralContract, WalletProvider};
use asty_types::{
    address::parse_address, Address, RegistrationFormData, RegistrationState, UserSnapshot, WithdrawalState,
};
use tokio::sync::mpsc;

use crate::cache::{drain_pending, CacheSlot, ReadCaches, RefreshQueue};
use crate::extractor::{Extraction, ReferralExtractor};
use crate::persistence::{load_draft, save_draft, KeyValueStore};
use crate::resolver::{LookupTicket, RegistrationResolver, Resolution, ResolverState};
use crate::submission::{SubmissionContext, SubmissionController, SubmissionPhase};
use crate::validator::validate_referral;
use crate::{
    build_payment_config, AppConfig, PaymentConfig, ReferralError, RegistrationUi, SubmissionError,
    WithdrawalController,
};

pub struct RegistrationFlow {
    config: Arc<AppConfig>,
    contract: Arc<dyn ReferralContract>,
    store: Arc<dyn KeyValueStore>,
    account: Option<Address>,
    form: RegistrationFormData,
    referral_from_url: bool,
    extraction_error: Option<String>,
    extractor: ReferralExtractor,
    resolver: RegistrationResolver,
    submission: SubmissionController,
    withdrawal: WithdrawalController,
    caches: ReadCaches,
    refresh: RefreshQueue,
    refresh_rx: mpsc::UnboundedReceiver<CacheSlot>,
}

impl RegistrationFlow {
    pub fn new(
        config: Arc<AppConfig>,
        contract: Arc<dyn ReferralContract>,
        wallet: Arc<dyn WalletProvider>,
        store: Arc<dyn KeyValueStore>,
        ui: Arc<dyn RegistrationUi>,
    ) -> Self {
        let (refresh, refresh_rx) = RefreshQueue::channel();
        Self {
            submission: SubmissionController::new(ui, refresh.clone()),
            withdrawal: WithdrawalController::new(config.clone(), wallet, refresh.clone()),
            config,
            contract,
            store,
            account: None,
            form: RegistrationFormData::default(),
            referral_from_url: false,
            extraction_error: None,
            extractor: ReferralExtractor::new(),
            resolver: RegistrationResolver::new(),
            caches: ReadCaches::default(),
            refresh,
            refresh_rx,
        }
    }

    // ── Accessors ──────────────────────────────────────────────────────

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn account(&self) -> Option<Address> {
        self.account
    }

    pub fn form(&self) -> &RegistrationFormData {
        &self.form
    }

    pub fn registration(&self) -> &RegistrationState {
        self.submission.state()
    }

    pub fn submission_phase(&self) -> SubmissionPhase {
        self.submission.phase()
    }

    pub fn withdrawal(&self) -> &WithdrawalState {
        self.withdrawal.state()
    }

    pub fn resolver_state(&self) -> ResolverState {
        self.resolver.state()
    }

    pub fn caches(&self) -> &ReadCaches {
        &self.caches
    }

    /// Whether the current referral input came from the page URL.
    pub fn referral_from_url(&self) -> bool {
        self.referral_from_url
    }

    pub fn extraction_error(&self) -> Option<&str> {
        self.extraction_error.as_deref()
    }

    pub fn set_reduced_motion(&mut self, reduced_motion: bool) {
        self.submission.set_reduced_motion(reduced_motion);
    }

    // ── Inputs ─────────────────────────────────────────────────────────

    /// Page load: restore the draft, read the URL referral once, and start
    /// the lookup for whatever candidate results.
    pub fn mount(&mut self, page_url: Option<&str>) -> Option<LookupTicket> {
        if self.extractor.has_run() {
            return None;
        }

        match load_draft(self.store.as_ref()) {
            Ok(Some(draft)) => self.form = draft,
            Ok(None) => {}
            Err(error) => tracing::warn!(%error, "could not restore registration draft"),
        }

        match self.extractor.extract(page_url.unwrap_or_default(), self.account.as_ref()) {
            Extraction::Extracted(value) => {
                self.form.referral_address = value;
                self.referral_from_url = true;
                self.persist_draft();
            }
            Extraction::Invalid { error, .. } => {
                self.extraction_error = Some(format!("Invalid referral link: {error}"));
            }
            Extraction::NoReferral | Extraction::AlreadyRan => {}
        }

        self.refresh.schedule(CacheSlot::TotalRegistered);
        self.revalidate()
    }

    /// The wallet connected, disconnected or switched account.
    pub fn connect_wallet(&mut self, account: Option<Address>) -> Option<LookupTicket> {
        if account == self.account {
            return None;
        }
        tracing::info!(from = ?self.account, to = ?account, "wallet account changed");
        self.account = account;
        self.withdrawal.reset();
        self.submission.reset();
        self.caches.clear_wallet_scoped();
        if account.is_some() {
            self.refresh.schedule(CacheSlot::UserSnapshot);
            self.refresh.schedule(CacheSlot::ReferralLevels);
        }
        self.revalidate()
    }

    /// The user edited the referral field.
    pub fn set_referral_input(&mut self, raw: &str) -> Option<LookupTicket> {
        if raw == self.form.referral_address {
            return None;
        }
        self.form.referral_address = raw.to_string();
        self.referral_from_url = false;
        self.persist_draft();
        self.revalidate()
    }

    /// Run a lookup issued by one of the input methods.
    pub async fn resolve_referral(&mut self, ticket: LookupTicket) -> Resolution {
        let result = with_timeout(
            "referral lookup",
            self.config.read_timeout(),
            self.contract.get_user(ticket.address),
        )
        .await;
        self.apply_referral_lookup(ticket, result)
    }

    /// Feed a lookup result in. Results for superseded tickets or changed
    /// input are discarded.
    pub fn apply_referral_lookup(
        &mut self,
        ticket: LookupTicket,
        result: Result<UserSnapshot, ChainError>,
    ) -> Resolution {
        let registered = match &result {
            Ok(snapshot) => Some(snapshot.registered),
            Err(error) => {
                tracing::warn!(%error, address = %ticket.address, "referral lookup failed");
                None
            }
        };
        let resolution = self.resolver.complete(ticket, registered, &self.form.referral_address);
        let not_registered = ReferralError::NotRegistered.to_string();

        match resolution {
            Resolution::Registered => {
                let errors = self.submission.errors_mut();
                if errors.referral_address.as_deref() == Some(not_registered.as_str()) {
                    errors.referral_address = None;
                }
            }
            Resolution::NotRegistered => {
                self.submission.errors_mut().referral_address = Some(not_registered);
                self.referral_from_url = false;
            }
            Resolution::Inconclusive | Resolution::Stale => {}
        }
        if resolution != Resolution::Stale {
            if let Ok(snapshot) = result {
                self.caches.referral = Some((ticket.address, snapshot));
            }
        }
        resolution
    }

    // ── Derived values ─────────────────────────────────────────────────

    /// The referral address a registration submits right now.
    pub fn effective_referral(&self) -> Address {
        self.resolver.effective_referral(&self.form.referral_address)
    }

    pub fn payment_config(&self) -> Option<PaymentConfig> {
        build_payment_config(&self.config, self.account, self.effective_referral())
    }

    // ── Registration ───────────────────────────────────────────────────

    /// The user pressed "register".
    pub fn start_registration(&mut self) -> Result<(), SubmissionError> {
        let referral_error = validate_referral(&self.form.referral_address, self.account.as_ref());
        let payment = self.payment_config();
        self.submission.begin(SubmissionContext {
            account: self.account,
            registered_on_chain: self.caches.user_registered(),
            referral_error: referral_error.as_ref(),
            payment: payment.as_ref(),
        })
    }

    pub fn on_payment_completed(&mut self, reference: &str) {
        self.submission.on_payment_completed(reference);
        if let Err(error) = self.store.clear(crate::DRAFT_KEY) {
            tracing::warn!(%error, "could not clear registration draft");
        }
    }

    pub fn on_payment_failed(&mut self, message: &str) {
        self.submission.on_payment_failed(message);
    }

    pub fn on_payment_dialog_closed(&mut self) {
        self.submission.on_payment_dialog_closed();
    }

    /// Apply a fresh `getUser` snapshot for the connected wallet.
    pub fn apply_user_snapshot(&mut self, snapshot: UserSnapshot) {
        if snapshot.registered {
            self.submission.on_chain_registered();
        }
        self.caches.user = Some(snapshot);
    }

    // ── Withdrawal ─────────────────────────────────────────────────────

    /// Withdraw the rewards shown in the cached user snapshot.
    ///
    /// A confirmed withdrawal empties the cached balance until the scheduled
    /// refresh brings the new one.
    pub async fn withdraw(&mut self) -> &WithdrawalState {
        let withdrawable = self
            .caches
            .user
            .as_ref()
            .map(|user| user.accrued_rewards)
            .unwrap_or(U256::ZERO);
        let state = self.withdrawal.withdraw(self.account, withdrawable).await;
        if state.was_successful {
            if let Some(user) = self.caches.user.as_mut() {
                user.accrued_rewards = U256::ZERO;
            }
        }
        self.withdrawal.state()
    }

    // ── Caches ─────────────────────────────────────────────────────────

    /// Schedule every slot for refresh.
    pub fn schedule_full_refresh(&self) {
        self.refresh.schedule(CacheSlot::UserSnapshot);
        self.refresh.schedule(CacheSlot::TotalRegistered);
        self.refresh.schedule(CacheSlot::ReferralLevels);
    }

    /// Slots currently waiting for refresh, without consuming them.
    pub fn pending_refreshes(&mut self) -> Vec<CacheSlot> {
        let pending = drain_pending(&mut self.refresh_rx);
        for slot in &pending {
            self.refresh.schedule(*slot);
        }
        pending
    }

    /// Fetch every scheduled slot. Returns how many slots were refreshed
    /// successfully.
    pub async fn process_refreshes(&mut self) -> usize {
        let pending = drain_pending(&mut self.refresh_rx);
        let mut refreshed = 0;
        for slot in pending {
            match self.refresh_slot(slot).await {
                Ok(true) => refreshed += 1,
                Ok(false) => {}
                Err(error) => tracing::warn!(?slot, %error, "cache refresh failed; keeping previous value"),
            }
        }
        refreshed
    }

    async fn refresh_slot(&mut self, slot: CacheSlot) -> Result<bool, ChainError> {
        let timeout = self.config.read_timeout();
        match slot {
            CacheSlot::UserSnapshot => {
                let Some(account) = self.account else {
                    return Ok(false);
                };
                let snapshot = with_timeout("user snapshot", timeout, self.contract.get_user(account)).await?;
                self.apply_user_snapshot(snapshot);
            }
            CacheSlot::TotalRegistered => {
                let total = with_timeout("total registered", timeout, self.contract.total_registered_users()).await?;
                self.caches.total_registered = Some(total);
            }
            CacheSlot::ReferralLevels => {
                let Some(account) = self.account else {
                    return Ok(false);
                };
                let levels =
                    with_timeout("referral levels", timeout, self.contract.referral_counts_by_level(account)).await?;
                self.caches.levels = Some(levels);
            }
        }
        tracing::debug!(?slot, "cache slot refreshed");
        Ok(true)
    }

    // ── Internals ──────────────────────────────────────────────────────

    /// Re-run validation for the current input and account, starting a
    /// lookup when a new valid candidate needs one.
    fn revalidate(&mut self) -> Option<LookupTicket> {
        let input = self.form.referral_address.clone();
        let error = validate_referral(&input, self.account.as_ref());

        if let Some(error) = error {
            self.resolver.reset();
            self.submission.errors_mut().referral_address = Some(error.to_string());
            return None;
        }
        if input.trim().is_empty() {
            self.resolver.reset();
            self.submission.errors_mut().referral_address = None;
            return None;
        }

        let address = match parse_address(&input) {
            Ok(address) => address,
            Err(error) => {
                tracing::warn!(%error, "validated referral failed to parse");
                self.resolver.reset();
                return None;
            }
        };

        if self.resolver.candidate() == Some(address) && self.resolver.state() != ResolverState::NotChecked {
            self.submission.errors_mut().referral_address = match self.resolver.state() {
                ResolverState::NotRegistered => Some(ReferralError::NotRegistered.to_string()),
                _ => None,
            };
            return None;
        }

        self.submission.errors_mut().referral_address = None;
        Some(self.resolver.begin(address))
    }

    fn persist_draft(&self) {
        if let Err(error) = save_draft(self.store.as_ref(), &self.form) {
            tracing::warn!(%error, "could not save registration draft");
        }
    }
}
