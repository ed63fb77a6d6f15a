//! API Server Module
//!
//! Application state and server startup logic.

use std::sync::Arc;
use tracing::info;

use crate::chains::ChainRegistry;
use crate::common::error::BridgeError;
use crate::storage::LedgerStore;
use crate::swaps::{AccountAllocator, DepositReconciler};

/// Combined application state for all API endpoints
pub struct AppState {
    pub allocator: AccountAllocator,
    pub reconciler: DepositReconciler,
    pub store: Arc<dyn LedgerStore>,
}

/// Shared application state type
pub type SharedAppState = Arc<AppState>;

impl AppState {
    /// Create new application state over a ledger store and chain registry
    pub fn new(store: Arc<dyn LedgerStore>, chains: Arc<ChainRegistry>) -> SharedAppState {
        Arc::new(Self {
            allocator: AccountAllocator::new(store.clone(), chains.clone()),
            reconciler: DepositReconciler::new(store.clone(), chains),
            store,
        })
    }
}

/// Start the REST API server on the given port
pub async fn start_server(state: SharedAppState, port: u16) -> Result<(), BridgeError> {
    let router = super::routes::create_router(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!(port, "API server listening");

    axum::serve(listener, router).await?;

    Ok(())
}
