//! Signed webhook alerting for sentryscan.
//!
//! The dispatcher delivers JSON payloads of findings to an HTTP endpoint,
//! signed with HMAC-SHA256 over a canonical serialisation, protected
//! against replay by a process-local nonce cache, and retried with bounded
//! backoff on transient failures.
//!
//! # Main Types
//!
//! - [`WebhookDispatcher`] - Signs, deduplicates, and delivers payloads
//! - [`Payload`] - The wire document, with fields in canonical order
//! - [`NonceSource`] - Injected randomness so tests can pin nonces
//!
//! Delivery failures surface as typed [`AlertError`]s; they are reported
//! by the caller but never abort a scan that already produced findings.

mod dispatcher;
mod error;
mod nonce;
mod payload;

pub use dispatcher::WebhookDispatcher;
pub use error::AlertError;
pub use nonce::{FixedNonce, NONCE_SIZE, NonceSource, OsRngNonce};
pub use payload::{Payload, SIGNATURE_ALG, Signature};
