//! Membership registration core for Asty.
//!
//! The flow runs one way:
//! URL / user input → [`validator`] → on-chain check ([`resolver`]) →
//! effective referral → [`payment`] configuration → [`submission`] →
//! state update. [`withdrawal`] is a parallel flow for claiming rewards.
//!
//! [`RegistrationFlow`] owns the state and wires the pieces together; every
//! collaborator (contract, wallet, storage, UI) is injected as a trait object.

pub mod cache;
pub mod config;
pub mod error;
pub mod extractor;
pub mod flow;
pub mod payment;
pub mod persistence;
pub mod resolver;
pub mod submission;
pub mod ui;
pub mod validator;
pub mod withdrawal;

pub use cache::{CacheSlot, ReadCaches, RefreshQueue};
pub use config::{AppConfig, PlatformFeeConfig};
pub use error::{ConfigError, ReferralError, StoreError, SubmissionError, WithdrawalError};
pub use extractor::{referral_link, Extraction, ReferralExtractor, REFERRAL_QUERY_PARAM};
pub use flow::RegistrationFlow;
pub use payment::{build_payment_config, membership_fee, ContractCall, PaymentConfig, PlatformFee};
pub use persistence::{load_draft, save_draft, FileStore, KeyValueStore, DRAFT_KEY};
pub use resolver::{LookupTicket, RegistrationResolver, Resolution, ResolverState};
pub use submission::{SubmissionContext, SubmissionController, SubmissionPhase};
pub use ui::RegistrationUi;
pub use validator::validate_referral;
pub use withdrawal::WithdrawalController;
