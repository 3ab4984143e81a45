//! Nullable collaborators for deterministic testing.
//!
//! Every external dependency of the registration flow (referral contract,
//! wallet, key-value storage, UI surfaces) sits behind a trait. This crate
//! provides test-friendly implementations that:
//! - Return configured, deterministic values
//! - Record what was asked of them for assertions
//! - Never touch the filesystem or network
//!
//! Usage: swap real implementations for nullables in tests.

pub mod contract;
pub mod store;
pub mod ui;
pub mod wallet;

pub use contract::NullReferralContract;
pub use store::NullStore;
pub use ui::{NullUi, UiEvent};
pub use wallet::NullWallet;
