//! Dispatcher error types.

use thiserror::Error;

/// Errors raised by the webhook dispatcher.
///
/// These never carry payload contents; findings appear only in the signed
/// request body itself.
#[derive(Debug, Error)]
pub enum AlertError {
    /// The HTTP client could not be constructed.
    #[error("failed to initialise HTTP client: {message}")]
    Client {
        /// Description of the construction failure.
        message: String,
    },

    /// The payload's `generated_at` is older than the permitted age.
    #[error("payload timestamp expired")]
    PayloadExpired,

    /// The payload's nonce was already used within the permitted age.
    #[error("replay detected: nonce already used")]
    Replay,

    /// Every delivery attempt failed.
    #[error("delivery failed after {attempts} attempts: {last_error}")]
    DeliveryFailed {
        /// Number of attempts made.
        attempts: u32,
        /// The last HTTP status or transport error observed.
        last_error: String,
    },

    /// The payload could not be serialised for signing or sending.
    #[error("failed to serialise payload: {source}")]
    Serialize {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },

    /// The signature did not verify against the canonical serialisation.
    #[error("signature verification failed")]
    InvalidSignature,

    /// The payload carries no signature to verify.
    #[error("no signature provided")]
    MissingSignature,

    /// The payload's signature declares an algorithm this dispatcher does
    /// not support.
    #[error("unsupported signature algorithm: {alg}")]
    UnsupportedAlgorithm {
        /// The declared algorithm.
        alg: String,
    },

    /// Nonce material could not be generated.
    #[error("failed to generate nonce: {message}")]
    Nonce {
        /// Description of the randomness failure.
        message: String,
    },

    /// Delivery was cancelled between retries.
    #[error("delivery cancelled")]
    Cancelled,
}
