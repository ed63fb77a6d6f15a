//! Shared Types Module
//!
//! Data types shared across the swap bridge.

pub mod account;
pub mod network;
pub mod swap;
pub mod units;

// Re-exports for convenience
pub use account::ClientAccount;
pub use network::Network;
pub use swap::{Amount, PendingPayout, Swap, SwapDirection, SwapStatus};
pub use units::{base_to_coins, coins_to_base, format_base, BASE_UNITS_PER_COIN};
