//! API Layer Module
//!
//! HTTP server and routes for the swap lifecycle.

pub mod routes;
pub mod server;

// Re-exports for convenience
pub use routes::create_router;
pub use server::{start_server, AppState, SharedAppState};
