//! Shared utilities for the Asty registration workspace.

pub mod display;
pub mod logging;

pub use display::{short_address, short_hash};
pub use logging::{init_logging, LogFormat};
