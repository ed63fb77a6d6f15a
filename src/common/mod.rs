//! Common Module
//!
//! Shared error types used across the swap bridge.

pub mod error;

pub use error::{BridgeError, Result};
