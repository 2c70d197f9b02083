//! Tamper-evidence anchoring of assessment records.
//!
//! [`LedgerAnchor`] hashes a canonical snapshot of an assessment and records
//! the hash on an external ledger through a [`LedgerClient`]. Anchoring never
//! fails from the caller's point of view: without a client, or when the
//! client errors or times out, it returns a deterministic simulated id of the
//! form `0.0.<record-id>-<first 8 hex chars of the hash>`.

mod http;

pub use http::HttpLedgerClient;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{info, warn};

use crate::assessment::AssessmentSnapshot;
use crate::types::AssessmentId;

/// Number of hex characters of the hash used in simulated ids.
const SIMULATED_HASH_CHARS: usize = 8;

/// Default bound on one ledger submission.
pub const DEFAULT_ANCHOR_TIMEOUT: Duration = Duration::from_secs(10);

/// SHA-256 content hash of a record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    /// Compute hash from content
    pub fn from_content(content: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        Self(hasher.finalize().into())
    }

    /// Hash of a snapshot's canonical JSON.
    pub fn of_snapshot(snapshot: &AssessmentSnapshot) -> Self {
        Self::from_content(&snapshot.canonical_json())
    }

    /// Convert to hex string
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Verify content matches this hash
    pub fn verify(&self, content: &str) -> bool {
        self == &Self::from_content(content)
    }
}

/// Deterministic stand-in transaction id for a record.
pub fn simulated_transaction_id(record_id: AssessmentId, hash: &ContentHash) -> String {
    let hex = hash.to_hex();
    format!("0.0.{}-{}", record_id, &hex[..SIMULATED_HASH_CHARS])
}

/// Errors from a ledger submission. Absorbed by [`LedgerAnchor`].
#[derive(Debug, Error)]
pub enum AnchorError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("ledger returned status {0}")]
    Status(u16),

    #[error("invalid ledger response: {0}")]
    InvalidResponse(String),

    #[error("ledger submission timed out after {0:?}")]
    Timeout(Duration),
}

/// Fallible call to the external ledger.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Record `hash` on the ledger and return its transaction id.
    async fn submit(&self, hash: &ContentHash) -> Result<String, AnchorError>;
}

/// Outcome of anchoring one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorReceipt {
    pub transaction_id: String,
    /// Hex SHA-256 of the canonical snapshot.
    pub content_hash: String,
    /// True when the id was derived locally rather than issued by the ledger.
    pub simulated: bool,
}

/// Infallible anchoring adapter.
///
/// Whether a real ledger is used is decided once, at construction.
#[derive(Clone)]
pub struct LedgerAnchor {
    client: Option<Arc<dyn LedgerClient>>,
    timeout: Duration,
}

impl LedgerAnchor {
    /// Anchor that always produces simulated ids.
    pub fn simulated() -> Self {
        Self {
            client: None,
            timeout: DEFAULT_ANCHOR_TIMEOUT,
        }
    }

    /// Anchor that submits through `client`, falling back to simulated ids.
    pub fn with_client(client: Arc<dyn LedgerClient>, timeout: Duration) -> Self {
        Self {
            client: Some(client),
            timeout,
        }
    }

    /// True when no ledger client is configured.
    pub fn is_simulated(&self) -> bool {
        self.client.is_none()
    }

    /// Anchor a snapshot. Never fails.
    pub async fn anchor(&self, snapshot: &AssessmentSnapshot) -> AnchorReceipt {
        let hash = ContentHash::of_snapshot(snapshot);

        let Some(client) = &self.client else {
            return Self::fallback(snapshot.id, &hash);
        };

        match tokio::time::timeout(self.timeout, client.submit(&hash)).await {
            Ok(Ok(transaction_id)) => {
                info!(record_id = %snapshot.id, %transaction_id, "anchored record on ledger");
                AnchorReceipt {
                    transaction_id,
                    content_hash: hash.to_hex(),
                    simulated: false,
                }
            }
            Ok(Err(e)) => {
                warn!(record_id = %snapshot.id, error = %e, "ledger submission failed, simulating");
                Self::fallback(snapshot.id, &hash)
            }
            Err(_) => {
                let e = AnchorError::Timeout(self.timeout);
                warn!(record_id = %snapshot.id, error = %e, "ledger submission failed, simulating");
                Self::fallback(snapshot.id, &hash)
            }
        }
    }

    fn fallback(record_id: AssessmentId, hash: &ContentHash) -> AnchorReceipt {
        AnchorReceipt {
            transaction_id: simulated_transaction_id(record_id, hash),
            content_hash: hash.to_hex(),
            simulated: true,
        }
    }
}

impl Default for LedgerAnchor {
    fn default() -> Self {
        Self::simulated()
    }
}
