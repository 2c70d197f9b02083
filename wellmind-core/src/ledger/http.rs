//! HTTP client for a ledger anchoring gateway.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{AnchorError, ContentHash, LedgerClient};

/// Request body sent to the ledger gateway.
#[derive(Debug, Serialize)]
struct SubmitRequest<'a> {
    account_id: &'a str,
    content_hash: String,
}

/// Reply from the ledger gateway.
#[derive(Debug, Deserialize)]
struct SubmitReply {
    #[serde(alias = "file_id", alias = "tx_id")]
    transaction_id: String,
}

/// Submits content hashes to a ledger gateway as the configured account.
pub struct HttpLedgerClient {
    endpoint: String,
    account_id: String,
    private_key: String,
    client: reqwest::Client,
}

impl HttpLedgerClient {
    pub fn new(
        endpoint: impl Into<String>,
        account_id: impl Into<String>,
        private_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, AnchorError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AnchorError::Request(e.to_string()))?;

        Ok(Self {
            endpoint: endpoint.into(),
            account_id: account_id.into(),
            private_key: private_key.into(),
            client,
        })
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }
}

#[async_trait]
impl LedgerClient for HttpLedgerClient {
    async fn submit(&self, hash: &ContentHash) -> Result<String, AnchorError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.private_key)
            .json(&SubmitRequest {
                account_id: &self.account_id,
                content_hash: hash.to_hex(),
            })
            .send()
            .await
            .map_err(|e| AnchorError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AnchorError::Status(response.status().as_u16()));
        }

        let reply: SubmitReply = response
            .json()
            .await
            .map_err(|e| AnchorError::InvalidResponse(e.to_string()))?;

        if reply.transaction_id.trim().is_empty() {
            return Err(AnchorError::InvalidResponse(
                "empty transaction id".to_string(),
            ));
        }
        Ok(reply.transaction_id)
    }
}
