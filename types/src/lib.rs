//! Fundamental types for the Asty registration flow.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! addresses, token amounts, chain ids, on-chain snapshots, and the state records
//! owned by the registration and withdrawal controllers.

pub mod address;
pub mod amount;
pub mod error;
pub mod hash;
pub mod network;
pub mod snapshot;
pub mod state;

pub use address::{addresses_match, is_address_format, parse_address, Address, NEUTRAL_ADDRESS};
pub use alloy_primitives::U256;
pub use amount::{format_token_amount, scale_to_units, MAX_DECIMALS};
pub use error::TypesError;
pub use hash::TxHash;
pub use network::{chain_name, ChainId};
pub use snapshot::{ReferralLevels, UserSnapshot, REFERRAL_DEPTH};
pub use state::{FormErrors, RegistrationFormData, RegistrationState, WithdrawalState};
