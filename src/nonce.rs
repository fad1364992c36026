//! Nonce helpers for the consumer side of the exchange.
//!
//! The codec only carries the nonce. Replay and expiry checks belong to
//! whoever issued it, through [`NonceStore`].

use rand::Rng;
use time::{Duration, OffsetDateTime};

/// How long an issued nonce stays acceptable.
pub const NONCE_EXPIRY: Duration = Duration::minutes(10);

/// Generates a cryptographically random nonce.
///
/// Returns a 32-character lowercase hex string (16 random bytes).
#[must_use]
pub fn generate_nonce() -> String {
    let random_bytes: [u8; 16] = rand::rng().random();
    hex::encode(random_bytes)
}

/// Whether a nonce issued at `issued_at` is still inside [`NONCE_EXPIRY`] at `now`.
///
/// Nonces stamped in the future are not fresh.
#[must_use]
pub fn is_fresh(issued_at: OffsetDateTime, now: OffsetDateTime) -> bool {
    let age = now - issued_at;
    !age.is_negative() && age <= NONCE_EXPIRY
}

/// Consumer-provided nonce bookkeeping.
///
/// # Example
///
/// ```rust,ignore
/// impl NonceStore for MyAppState {
///     fn consume(&self, nonce: &str) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
///         // Atomically delete the nonce; true only if it existed and was fresh.
///         let issued_at = self.cache.take(nonce)?;
///         Ok(issued_at.is_some_and(|t| is_fresh(t, OffsetDateTime::now_utc())))
///     }
/// }
/// ```
pub trait NonceStore: Send + Sync {
    /// Mark `nonce` as used.
    ///
    /// Returns `true` exactly once for a nonce this party issued within
    /// [`NONCE_EXPIRY`]; `false` for unknown, replayed or expired nonces.
    fn consume(&self, nonce: &str) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;
}
