//! Swap Bridge API Endpoints
//!
//! REST endpoints for the swap lifecycle:
//! - POST /api/swap - request a swap, returns the deposit account
//! - POST /api/swap/:uuid/finalize - detect and record new deposits
//! - GET /api/swaps/:uuid - list an account's swaps
//! - GET /api/health - health check
//! - GET /api/stats - account and swap counts
//!
//! Every response uses the `{status, success, result}` envelope, where
//! `status` is "ok" or the error message.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::error;
use uuid::Uuid;

use super::server::SharedAppState;
use crate::common::error::BridgeError;
use crate::types::account::ClientAccount;
use crate::types::swap::{Amount, Swap, SwapDirection};

/// Create the swap bridge API router
pub fn create_router(state: SharedAppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/swap", post(handle_swap))
        .route("/api/swap/:uuid/finalize", post(handle_finalize_swap))
        .route("/api/swaps/:uuid", get(handle_get_swaps))
        .route("/api/health", get(handle_health))
        .route("/api/stats", get(handle_stats))
        .layer(cors)
        .with_state(state)
}

// =============================================================================
// Request / response payloads
// =============================================================================

#[derive(Debug, Deserialize)]
struct SwapRequest {
    /// Swap direction, e.g. "home_to_foreign"
    #[serde(rename = "type")]
    swap_type: String,
    /// Address the user receives the payout on
    address: String,
}

/// Account info returned to callers. The deposit secret never leaves the
/// bridge, so this is an explicit projection rather than the domain type.
#[derive(Debug, Serialize)]
struct AccountResponse {
    uuid: Uuid,
    user_address: String,
    user_network: String,
    deposit_address: String,
    deposit_network: String,
    created: i64,
}

impl From<&ClientAccount> for AccountResponse {
    fn from(account: &ClientAccount) -> Self {
        Self {
            uuid: account.uuid,
            user_address: account.user_address.clone(),
            user_network: account.user_address_network.to_string(),
            deposit_address: account.deposit_address.clone(),
            deposit_network: account.deposit_address_network.to_string(),
            created: account.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
struct SwapView {
    uuid: Uuid,
    #[serde(rename = "type")]
    swap_type: String,
    source_address: String,
    dest_address: String,
    amount: Amount,
    deposit_tx_hash: String,
    transfer_tx_hashes: Vec<String>,
    created: i64,
}

impl SwapView {
    fn new(swap: &Swap, account: &ClientAccount) -> Self {
        Self {
            uuid: swap.uuid,
            swap_type: swap.direction.to_string(),
            source_address: account.deposit_address.clone(),
            dest_address: account.user_address.clone(),
            amount: swap.amount.clone(),
            deposit_tx_hash: swap.deposit_tx_hash.clone(),
            transfer_tx_hashes: swap.transfer_tx_hashes.clone(),
            created: swap.created_at,
        }
    }
}

// =============================================================================
// Response envelope
// =============================================================================

#[derive(Debug, Serialize)]
struct Envelope<T: Serialize> {
    status: String,
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<T>,
}

fn respond_ok<T: Serialize>(result: T) -> (StatusCode, Json<serde_json::Value>) {
    let envelope = Envelope {
        status: "ok".to_string(),
        success: true,
        result: Some(result),
    };
    (StatusCode::OK, Json(serde_json::json!(envelope)))
}

fn respond_err(err: BridgeError) -> (StatusCode, Json<serde_json::Value>) {
    let status = match &err {
        BridgeError::Validation(_)
        | BridgeError::InvalidSwapType(_)
        | BridgeError::NoDeposit
        | BridgeError::NoNewDeposit => StatusCode::BAD_REQUEST,
        BridgeError::NotFound(_) => StatusCode::NOT_FOUND,
        BridgeError::ChainUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        BridgeError::Chain(_) | BridgeError::Dispatch(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    // Internal details are logged, not leaked.
    let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
        error!(code = err.error_code(), "request failed: {}", err);
        "internal error".to_string()
    } else {
        err.to_string()
    };

    let envelope = Envelope::<()> {
        status: message,
        success: false,
        result: None,
    };
    (status, Json(serde_json::json!(envelope)))
}

fn parse_account_uuid(raw: &str) -> Result<Uuid, BridgeError> {
    Uuid::parse_str(raw).map_err(|_| BridgeError::validation(format!("invalid account uuid: {}", raw)))
}

// =============================================================================
// Handlers
// =============================================================================

/// POST /api/swap
///
/// Request a swap: allocates (or returns) the deposit account for the
/// supplied destination address. The address is the one the user receives
/// on, so the user network is the direction's destination network.
async fn handle_swap(
    State(state): State<SharedAppState>,
    Json(req): Json<SwapRequest>,
) -> impl IntoResponse {
    let result = async {
        let direction: SwapDirection = req.swap_type.parse()?;

        let address = req.address.trim();
        if address.is_empty() {
            return Err(BridgeError::validation("address must not be empty"));
        }

        let account = state
            .allocator
            .get_or_create_deposit_account(address, direction.destination_network())
            .await?;

        Ok(AccountResponse::from(&account))
    }
    .await;

    match result {
        Ok(account) => respond_ok(account),
        Err(e) => respond_err(e),
    }
}

/// POST /api/swap/:uuid/finalize
///
/// Detect and record new deposits for the account. Returns only the newly
/// created swaps. Payout is not triggered here; the settlement loop picks
/// pending swaps up out of band.
async fn handle_finalize_swap(
    State(state): State<SharedAppState>,
    Path(uuid): Path<String>,
) -> impl IntoResponse {
    let result = async {
        let account_uuid = parse_account_uuid(&uuid)?;
        let created = state.reconciler.reconcile(account_uuid).await?;

        let account = state
            .store
            .get_account(account_uuid)
            .await?
            .ok_or_else(|| BridgeError::not_found(format!("account {}", account_uuid)))?;

        Ok(created
            .iter()
            .map(|swap| SwapView::new(swap, &account))
            .collect::<Vec<_>>())
    }
    .await;

    match result {
        Ok(swaps) => respond_ok(swaps),
        Err(e) => respond_err(e),
    }
}

/// GET /api/swaps/:uuid
///
/// List all swaps recorded for the account, oldest first.
async fn handle_get_swaps(
    State(state): State<SharedAppState>,
    Path(uuid): Path<String>,
) -> impl IntoResponse {
    let result = async {
        let account_uuid = parse_account_uuid(&uuid)?;
        let account = state
            .store
            .get_account(account_uuid)
            .await?
            .ok_or_else(|| BridgeError::not_found(format!("account {}", account_uuid)))?;

        let swaps = state.store.get_swaps_for_account(account_uuid).await?;

        Ok(swaps
            .iter()
            .map(|swap| SwapView::new(swap, &account))
            .collect::<Vec<_>>())
    }
    .await;

    match result {
        Ok(swaps) => respond_ok(swaps),
        Err(e) => respond_err(e),
    }
}

/// GET /api/health
async fn handle_health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "swapbridge",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// GET /api/stats
///
/// Account count and swap counts by status.
async fn handle_stats(State(state): State<SharedAppState>) -> impl IntoResponse {
    let result = async {
        let accounts = state.store.count_accounts().await?;
        let swaps = state.store.count_swaps_by_status().await?;
        Ok(serde_json::json!({
            "accounts": accounts,
            "swaps": swaps,
        }))
    }
    .await;

    match result {
        Ok(stats) => respond_ok(stats),
        Err(e) => respond_err(e),
    }
}
