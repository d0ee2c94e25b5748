//! Nonce generation and the replay cache.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, TimeDelta, Utc};
use rand::TryRngCore;
use rand::rngs::OsRng;

use crate::error::AlertError;

/// Number of random bytes in a nonce (64 hex characters on the wire).
pub const NONCE_SIZE: usize = 32;

/// Source of nonce material, injected into the dispatcher at construction.
///
/// Production uses [`OsRngNonce`]; tests inject [`FixedNonce`] to make
/// replay behaviour deterministic. There is no process-global override.
pub trait NonceSource: Send + Sync {
    /// Returns the next 32 bytes of nonce material.
    fn next_nonce(&self) -> Result<[u8; NONCE_SIZE], AlertError>;
}

/// Production nonce source backed by the operating-system RNG.
#[derive(Debug, Default)]
pub struct OsRngNonce;

impl NonceSource for OsRngNonce {
    fn next_nonce(&self) -> Result<[u8; NONCE_SIZE], AlertError> {
        let mut bytes = [0u8; NONCE_SIZE];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|err| AlertError::Nonce {
                message: err.to_string(),
            })?;
        Ok(bytes)
    }
}

/// Deterministic nonce source for tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedNonce(pub [u8; NONCE_SIZE]);

impl NonceSource for FixedNonce {
    fn next_nonce(&self) -> Result<[u8; NONCE_SIZE], AlertError> {
        Ok(self.0)
    }
}

/// Process-local map from nonce to the `generated_at` of the payload that
/// used it.
///
/// Reads take the read lock; insertion and sweeping take the write lock.
/// A poisoned lock is recovered rather than propagated: the cache only
/// rejects replays, and a panicking writer cannot have corrupted the map
/// beyond a missing entry.
#[derive(Debug, Default)]
pub(crate) struct NonceCache {
    entries: RwLock<HashMap<String, DateTime<Utc>>>,
}

impl NonceCache {
    /// Returns `true` if `nonce` was already used and has not aged out.
    pub fn is_replay(&self, nonce: &str, max_age: TimeDelta, now: DateTime<Utc>) -> bool {
        let entries = match self.entries.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        entries
            .get(nonce)
            .is_some_and(|&generated_at| now - generated_at <= max_age)
    }

    /// Records a nonce against its payload's generation time.
    pub fn insert(&self, nonce: String, generated_at: DateTime<Utc>) {
        let mut entries = match self.entries.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        entries.insert(nonce, generated_at);
    }

    /// Evicts every entry older than `max_age`.
    pub fn sweep(&self, max_age: TimeDelta, now: DateTime<Utc>) {
        let mut entries = match self.entries.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        entries.retain(|_, &mut generated_at| now - generated_at <= max_age);
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        match self.entries.read() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn max_age() -> TimeDelta {
        TimeDelta::minutes(10)
    }

    #[test]
    fn os_rng_produces_distinct_nonces() {
        let source = OsRngNonce;
        let a = source.next_nonce().unwrap();
        let b = source.next_nonce().unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn fixed_nonce_always_returns_its_bytes() {
        let source = FixedNonce([7u8; NONCE_SIZE]);
        assert_eq!(source.next_nonce().unwrap(), [7u8; NONCE_SIZE]);
        assert_eq!(source.next_nonce().unwrap(), [7u8; NONCE_SIZE]);
    }

    #[test]
    fn unknown_nonce_is_not_a_replay() {
        let cache = NonceCache::default();
        assert!(!cache.is_replay("fresh", max_age(), Utc::now()));
    }

    #[test]
    fn recorded_nonce_within_max_age_is_a_replay() {
        let cache = NonceCache::default();
        let now = Utc::now();
        cache.insert("used".to_string(), now);

        assert!(cache.is_replay("used", max_age(), now + TimeDelta::minutes(5)));
    }

    #[test]
    fn recorded_nonce_past_max_age_is_not_a_replay() {
        let cache = NonceCache::default();
        let now = Utc::now();
        cache.insert("old".to_string(), now);

        assert!(!cache.is_replay("old", max_age(), now + TimeDelta::minutes(11)));
    }

    #[test]
    fn sweep_evicts_only_expired_entries() {
        let cache = NonceCache::default();
        let now = Utc::now();
        cache.insert("old".to_string(), now - TimeDelta::minutes(11));
        cache.insert("fresh".to_string(), now - TimeDelta::minutes(1));

        cache.sweep(max_age(), now);

        assert_eq!(cache.len(), 1);
        assert!(cache.is_replay("fresh", max_age(), now));
        assert!(!cache.is_replay("old", max_age(), now));
    }
}
