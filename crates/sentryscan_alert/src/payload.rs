//! The webhook wire document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sentryscan_core::Finding;

/// The only signature algorithm this wire format supports.
pub const SIGNATURE_ALG: &str = "HMAC-SHA256";

/// Detached signature carried in the payload body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    /// Algorithm identifier; always [`SIGNATURE_ALG`].
    pub alg: String,
    /// Base64-encoded MAC over the canonical payload serialisation.
    pub sig: String,
}

/// A webhook notification of new findings.
///
/// Field declaration order is the canonical wire order; both signer and
/// verifier serialise the payload with `signature` absent and must produce
/// byte-identical JSON. Do not reorder fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payload {
    /// Caller-chosen identifier for the scan run.
    pub run_id: String,
    /// Human-readable summary of the notification.
    pub summary: String,
    /// The findings being reported.
    pub findings: Vec<Finding>,
    /// The repository or scan root the findings came from.
    pub repo: String,
    /// Git ref the scan targeted, if any.
    pub git_ref: String,
    /// When the payload was generated; also the replay-cache timestamp.
    pub generated_at: DateTime<Utc>,
    /// 64 hex characters of dispatcher-assigned randomness.
    pub nonce: String,
    /// Assigned by the dispatcher after signing; absent during
    /// canonicalisation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<Signature>,
}

impl Payload {
    /// Creates an unsigned payload stamped with the current time.
    ///
    /// The nonce and signature are assigned by the dispatcher during
    /// [`send`](crate::WebhookDispatcher::send).
    #[must_use]
    pub fn new(
        run_id: impl Into<String>,
        summary: impl Into<String>,
        findings: Vec<Finding>,
        repo: impl Into<String>,
        git_ref: impl Into<String>,
    ) -> Self {
        Self {
            run_id: run_id.into(),
            summary: summary.into(),
            findings,
            repo: repo.into(),
            git_ref: git_ref.into(),
            generated_at: Utc::now(),
            nonce: String::new(),
            signature: None,
        }
    }
}
