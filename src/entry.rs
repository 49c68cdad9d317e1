//! Verification entry entity for SMS-based authentication.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A single issued verification code and its lifecycle state.
///
/// Entries are keyed by normalized subject in the cache; the subject itself
/// is not stored redundantly here. An entry is created on issuance, mutated
/// on each verification attempt, and destroyed by explicit removal, attempt
/// exhaustion, expiry eviction, or the post-success grace-window purge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationEntry {
    /// The expected code, exactly as supplied by the issuer
    pub code: String,

    /// Number of verification attempts made against this entry
    pub attempts: u32,

    /// Timestamp when the entry was created
    pub created_at: DateTime<Utc>,

    /// Timestamp after which the entry is invalid regardless of other state
    pub expires_at: DateTime<Utc>,

    /// Whether the code has been successfully matched (single-use)
    pub verified: bool,
}

impl VerificationEntry {
    /// Creates a fresh entry expiring `ttl` from now.
    pub fn new(code: String, ttl: std::time::Duration) -> Self {
        let now = Utc::now();
        let ttl = Duration::from_std(ttl).unwrap_or(Duration::MAX);
        Self {
            code,
            attempts: 0,
            created_at: now,
            expires_at: now.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC),
            verified: false,
        }
    }

    /// Checks if the entry has expired
    ///
    /// An expired entry is semantically nonexistent even while it is still
    /// physically present waiting for the sweeper.
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }

    /// Gets the number of remaining verification attempts under `ceiling`
    pub fn remaining_attempts(&self, ceiling: u32) -> u32 {
        ceiling.saturating_sub(self.attempts)
    }

    /// Gets the time remaining until expiration, or zero if expired
    pub fn time_until_expiration(&self) -> Duration {
        let now = Utc::now();
        if self.expires_at > now {
            self.expires_at - now
        } else {
            Duration::zero()
        }
    }
}
