//! Home Ledger Client
//!
//! JSON-RPC style client for the home asset ledger. All calls go through a
//! single `POST {base}/rpc` endpoint with `{method, params}` bodies and
//! `{result}` / `{error: {code, message}}` responses.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{ChainClient, ChainError, ChainResult, IncomingTransaction, MintedAddress, PaymentOutput};

#[derive(Serialize)]
struct RpcRequest<'a, P: Serialize> {
    method: &'a str,
    params: P,
}

#[derive(Deserialize)]
struct RpcResponse<R> {
    result: Option<R>,
    error: Option<RpcErrorBody>,
}

#[derive(Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

/// Home ledger HTTP client
#[derive(Debug, Clone)]
pub struct HomeLedgerClient {
    client: Client,
    base_url: String,
}

impl HomeLedgerClient {
    /// Create a new client with a bounded request timeout
    pub fn new(base_url: &str, timeout: Duration) -> ChainResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn call<P: Serialize, R: DeserializeOwned>(
        &self,
        method: &str,
        params: P,
    ) -> ChainResult<R> {
        let url = format!("{}/rpc", self.base_url);
        let resp = self
            .client
            .post(&url)
            .json(&RpcRequest { method, params })
            .send()
            .await?;

        if !resp.status().is_success() {
            let code = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(ChainError::Status { code, body });
        }

        let body: RpcResponse<R> = resp.json().await?;
        if let Some(err) = body.error {
            return Err(ChainError::Rpc {
                code: err.code,
                message: err.message,
            });
        }

        body.result
            .ok_or_else(|| ChainError::Protocol(format!("{}: response carried no result", method)))
    }
}

#[async_trait]
impl ChainClient for HomeLedgerClient {
    async fn mint_address(&self) -> ChainResult<MintedAddress> {
        self.call("issue_address", serde_json::json!({})).await
    }

    async fn incoming_transactions(&self, address: &str) -> ChainResult<Vec<IncomingTransaction>> {
        self.call(
            "received_payments",
            serde_json::json!({ "address": address, "confirmed": true }),
        )
        .await
    }

    async fn multi_send(&self, outputs: &[PaymentOutput]) -> ChainResult<Vec<String>> {
        self.call("send_many", serde_json::json!({ "outputs": outputs }))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trimmed() {
        let client =
            HomeLedgerClient::new("http://ledger.local/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url(), "http://ledger.local");
    }

    #[test]
    fn test_rpc_error_decoding() {
        let body: RpcResponse<MintedAddress> =
            serde_json::from_str(r#"{"error": {"code": -3, "message": "cold wallet"}}"#).unwrap();
        let err = body.error.unwrap();
        assert_eq!(err.code, -3);
        assert_eq!(err.message, "cold wallet");
        assert!(body.result.is_none());
    }
}
