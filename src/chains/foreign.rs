//! Foreign Chain Client
//!
//! REST style client for the foreign coin chain node:
//! - `POST {base}/v1/addresses` mints a deposit address
//! - `GET {base}/v1/addresses/{addr}/transfers?confirmed=1` lists confirmed
//!   incoming transfers
//! - `POST {base}/v1/payments` submits a multi-output payment

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{ChainClient, ChainError, ChainResult, IncomingTransaction, MintedAddress, PaymentOutput};

#[derive(Serialize)]
struct PaymentRequest<'a> {
    outputs: &'a [PaymentOutput],
}

#[derive(Deserialize)]
struct PaymentResponse {
    tx_hashes: Vec<String>,
}

/// Foreign chain HTTP client
#[derive(Debug, Clone)]
pub struct ForeignChainClient {
    client: Client,
    base_url: String,
}

impl ForeignChainClient {
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

    async fn check(resp: reqwest::Response) -> ChainResult<reqwest::Response> {
        if !resp.status().is_success() {
            let code = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(ChainError::Status { code, body });
        }
        Ok(resp)
    }
}

#[async_trait]
impl ChainClient for ForeignChainClient {
    async fn mint_address(&self) -> ChainResult<MintedAddress> {
        let url = format!("{}/v1/addresses", self.base_url);
        let resp = self.client.post(&url).json(&serde_json::json!({})).send().await?;
        let resp = Self::check(resp).await?;
        Ok(resp.json().await?)
    }

    async fn incoming_transactions(&self, address: &str) -> ChainResult<Vec<IncomingTransaction>> {
        let url = format!(
            "{}/v1/addresses/{}/transfers?confirmed=1",
            self.base_url, address
        );
        let resp = self.client.get(&url).send().await?;
        let resp = Self::check(resp).await?;
        Ok(resp.json().await?)
    }

    async fn multi_send(&self, outputs: &[PaymentOutput]) -> ChainResult<Vec<String>> {
        let url = format!("{}/v1/payments", self.base_url);
        let resp = self
            .client
            .post(&url)
            .json(&PaymentRequest { outputs })
            .send()
            .await?;
        let resp = Self::check(resp).await?;
        let body: PaymentResponse = resp.json().await?;
        Ok(body.tx_hashes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trimmed() {
        let client =
            ForeignChainClient::new("http://node.local/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url(), "http://node.local");
    }

    #[test]
    fn test_payment_response_decoding() {
        let body: PaymentResponse =
            serde_json::from_str(r#"{"tx_hashes": ["hash1", "hash2"]}"#).unwrap();
        assert_eq!(body.tx_hashes, vec!["hash1", "hash2"]);
    }
}
