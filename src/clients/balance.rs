//! Client for the balance API consumed by the bet service
//!
//! The gateway trait exists so settlement logic can be exercised against an
//! in-process ledger in tests; production wires in the HTTP client.

use crate::models::{BalanceOperationRequest, BalanceResponse};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use std::env;
use std::time::Duration;

const DEFAULT_BALANCE_API_URL: &str = "http://localhost:5000";
const DEFAULT_LEDGER_TIMEOUT_SECS: u64 = 5;

/// The slice of the Ledger Service the bet service depends on.
#[async_trait]
pub trait LedgerGateway: Send + Sync {
    async fn balance(&self, user_id: &str) -> Result<i64>;
    async fn credit(&self, user_id: &str, amount: i64, description: &str) -> Result<()>;
    async fn debit(&self, user_id: &str, amount: i64, description: &str) -> Result<()>;
}

pub struct HttpBalanceClient {
    base_url: String,
    http: reqwest::Client,
}

impl HttpBalanceClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Build from `BALANCE_API_URL` / `LEDGER_TIMEOUT_SECS`. The timeout
    /// bounds every ledger call so a hung payout surfaces as one
    /// beneficiary's failure instead of stalling the whole settlement.
    pub fn from_env() -> Result<Self> {
        let base_url =
            env::var("BALANCE_API_URL").unwrap_or_else(|_| DEFAULT_BALANCE_API_URL.to_string());
        let timeout_secs = env::var("LEDGER_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|&v| v > 0)
            .unwrap_or(DEFAULT_LEDGER_TIMEOUT_SECS);

        Self::new(&base_url, Duration::from_secs(timeout_secs))
    }

    async fn post_operation(
        &self,
        path: &str,
        user_id: &str,
        amount: i64,
        description: &str,
    ) -> Result<()> {
        let url = format!("{}{path}", self.base_url);
        let payload = BalanceOperationRequest {
            client_id: user_id.to_string(),
            amount,
            description: description.to_string(),
        };

        let response = self
            .http
            .post(&url)
            .json(&payload)
            .send()
            .await
            .with_context(|| format!("POST {path} failed"))?;

        if !response.status().is_success() {
            bail!("POST {path} returned {}", response.status());
        }
        Ok(())
    }
}

#[async_trait]
impl LedgerGateway for HttpBalanceClient {
    async fn balance(&self, user_id: &str) -> Result<i64> {
        let url = format!("{}/balance/{user_id}", self.base_url);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .context("GET /balance failed")?;

        if !response.status().is_success() {
            bail!("GET /balance returned {}", response.status());
        }

        let body: BalanceResponse = response
            .json()
            .await
            .context("Invalid balance response body")?;
        Ok(body.balance)
    }

    async fn credit(&self, user_id: &str, amount: i64, description: &str) -> Result<()> {
        self.post_operation("/balance/add", user_id, amount, description)
            .await
    }

    async fn debit(&self, user_id: &str, amount: i64, description: &str) -> Result<()> {
        self.post_operation("/balance/subtract", user_id, amount, description)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client =
            HttpBalanceClient::new("http://localhost:5000/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url, "http://localhost:5000");
    }
}
