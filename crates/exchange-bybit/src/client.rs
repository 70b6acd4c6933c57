use anyhow::{Context, Result};
use governor::{clock::DefaultClock, state::InMemoryState, Quota, RateLimiter};
use hmac::{Hmac, Mac};
use reqwest::Client;
use sha2::Sha256;
use std::num::NonZeroU32;
use std::sync::Arc;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Non-zero retCode in a Bybit v5 response envelope.
#[derive(Debug, Error)]
#[error("bybit api error {ret_code}: {ret_msg}")]
pub struct BybitApiError {
    pub ret_code: i64,
    pub ret_msg: String,
}

pub struct BybitClient {
    http_client: Client,
    base_url: String,
    api_key: String,
    api_secret: String,
    recv_window_ms: u64,
    rate_limiter: Arc<RateLimiter<governor::state::direct::NotKeyed, InMemoryState, DefaultClock>>,
}

impl BybitClient {
    #[must_use]
    pub fn new(base_url: String, api_key: String, api_secret: String, recv_window_ms: u64) -> Self {
        // 600 requests per 5s shared across v5 endpoints; 10/s keeps us
        // comfortably under the per-endpoint limits.
        let quota = Quota::per_second(NonZeroU32::new(10).unwrap());
        let rate_limiter = Arc::new(RateLimiter::direct(quota));

        Self {
            http_client: Client::new(),
            base_url,
            api_key,
            api_secret,
            recv_window_ms,
            rate_limiter,
        }
    }

    /// Unauthenticated GET for public market-data endpoints.
    pub async fn get(&self, endpoint: &str, query: &str) -> Result<serde_json::Value> {
        self.rate_limiter.until_ready().await;
        let url = format!("{}{}?{}", self.base_url, endpoint, query);
        let response = self.http_client.get(&url).send().await?;
        let envelope = response.json().await?;
        Self::unwrap_envelope(envelope)
    }

    /// Signed GET for private endpoints. The v5 signature covers
    /// `timestamp + api_key + recv_window + query_string`.
    pub async fn get_signed(&self, endpoint: &str, query: &str) -> Result<serde_json::Value> {
        self.rate_limiter.until_ready().await;
        let timestamp = chrono::Utc::now().timestamp_millis().to_string();
        let signature = self.sign(&timestamp, query)?;
        let url = format!("{}{}?{}", self.base_url, endpoint, query);

        let response = self
            .http_client
            .get(&url)
            .header("X-BAPI-API-KEY", &self.api_key)
            .header("X-BAPI-TIMESTAMP", &timestamp)
            .header("X-BAPI-RECV-WINDOW", self.recv_window_ms.to_string())
            .header("X-BAPI-SIGN", signature)
            .send()
            .await?;
        let envelope = response.json().await?;
        Self::unwrap_envelope(envelope)
    }

    /// Signed POST for order and account endpoints; the signature covers
    /// the serialized JSON body.
    pub async fn post_signed(
        &self,
        endpoint: &str,
        body: serde_json::Value,
    ) -> Result<serde_json::Value> {
        self.rate_limiter.until_ready().await;
        let timestamp = chrono::Utc::now().timestamp_millis().to_string();
        let payload = body.to_string();
        let signature = self.sign(&timestamp, &payload)?;
        let url = format!("{}{}", self.base_url, endpoint);

        let response = self
            .http_client
            .post(&url)
            .header("X-BAPI-API-KEY", &self.api_key)
            .header("X-BAPI-TIMESTAMP", &timestamp)
            .header("X-BAPI-RECV-WINDOW", self.recv_window_ms.to_string())
            .header("X-BAPI-SIGN", signature)
            .header("Content-Type", "application/json")
            .body(payload)
            .send()
            .await?;
        let envelope = response.json().await?;
        Self::unwrap_envelope(envelope)
    }

    fn sign(&self, timestamp: &str, payload: &str) -> Result<String> {
        let message = format!(
            "{}{}{}{}",
            timestamp, self.api_key, self.recv_window_ms, payload
        );
        let mut mac = HmacSha256::new_from_slice(self.api_secret.as_bytes())
            .context("api secret rejected by hmac")?;
        mac.update(message.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    /// Checks the retCode envelope and returns the `result` payload.
    fn unwrap_envelope(envelope: serde_json::Value) -> Result<serde_json::Value> {
        let ret_code = envelope
            .get("retCode")
            .and_then(serde_json::Value::as_i64)
            .ok_or_else(|| anyhow::anyhow!("missing retCode in response: {envelope}"))?;

        if ret_code != 0 {
            let ret_msg = envelope
                .get("retMsg")
                .and_then(serde_json::Value::as_str)
                .unwrap_or("unknown")
                .to_string();
            return Err(BybitApiError { ret_code, ret_msg }.into());
        }

        Ok(envelope
            .get("result")
            .cloned()
            .unwrap_or(serde_json::Value::Null))
    }
}
