//! On-chain collaborators of the Asty registration flow.
//!
//! The flow never talks to a chain directly. It goes through two ports:
//! - [`ReferralContract`] for the read-only referral-contract views
//! - [`WalletProvider`] for the connected wallet (chain id, network switch,
//!   transaction signing, receipts)
//!
//! [`rpc`] implements both over Ethereum JSON-RPC. [`abi`] holds the contract
//! call encodings shared by the payment configuration and the withdrawal.

pub mod abi;
pub mod contract;
pub mod error;
pub mod rpc;
pub mod timeout;
pub mod wallet;

pub use contract::ReferralContract;
pub use error::ChainError;
pub use rpc::{JsonRpcClient, RpcReferralContract, RpcWallet};
pub use timeout::with_timeout;
pub use wallet::{TransactionReceipt, TransactionRequest, WalletProvider};
