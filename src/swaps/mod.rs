//! Swap Lifecycle Module
//!
//! Account allocation and deposit reconciliation: the synchronous half of
//! the swap pipeline, driven by client requests. Settlement is decoupled
//! into the `settlement` module.

pub mod allocator;
pub mod reconciler;

pub use allocator::AccountAllocator;
pub use reconciler::DepositReconciler;
