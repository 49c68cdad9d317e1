//! Trait seam for collaborators that consume the verification cache

use std::time::Duration;

use async_trait::async_trait;

use crate::cache::VerificationCache;
use crate::entry::VerificationEntry;

/// Trait for verification-code cache integration
///
/// Collaborators (code delivery, authentication flows, diagnostics) should
/// depend on this trait rather than on the concrete cache so they can be
/// tested against mocks and the store can be swapped for a shared external
/// one with the same atomicity guarantees.
#[async_trait]
pub trait CodeCache: Send + Sync {
    /// Store a verification code for a subject, overwriting any prior one
    async fn issue(&self, subject: &str, code: &str, ttl: Duration);
    /// Verify a supplied code; true exactly once per issued code
    async fn verify(&self, subject: &str, supplied_code: &str) -> bool;
    /// Inspect the unexpired entry for a subject without mutating it
    async fn peek(&self, subject: &str) -> Option<VerificationEntry>;
    /// Check whether an unexpired code exists for a subject
    async fn exists(&self, subject: &str) -> bool;
    /// Remove the entry for a subject (idempotent)
    async fn remove(&self, subject: &str);
    /// Remaining verification attempts, if an unexpired entry exists
    async fn remaining_attempts(&self, subject: &str) -> Option<u32>;
    /// Seconds until the code expires, if an unexpired entry exists
    async fn code_ttl(&self, subject: &str) -> Option<i64>;
}

#[async_trait]
impl CodeCache for VerificationCache {
    async fn issue(&self, subject: &str, code: &str, ttl: Duration) {
        VerificationCache::issue(self, subject, code, ttl).await
    }

    async fn verify(&self, subject: &str, supplied_code: &str) -> bool {
        VerificationCache::verify(self, subject, supplied_code).await
    }

    async fn peek(&self, subject: &str) -> Option<VerificationEntry> {
        VerificationCache::peek(self, subject).await
    }

    async fn exists(&self, subject: &str) -> bool {
        VerificationCache::exists(self, subject).await
    }

    async fn remove(&self, subject: &str) {
        VerificationCache::remove(self, subject).await
    }

    async fn remaining_attempts(&self, subject: &str) -> Option<u32> {
        VerificationCache::remaining_attempts(self, subject).await
    }

    async fn code_ttl(&self, subject: &str) -> Option<i64> {
        VerificationCache::code_ttl(self, subject).await
    }
}
