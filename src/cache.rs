//! Verification code cache
//!
//! Owns the mapping from normalized phone subject to [`VerificationEntry`]
//! and enforces the verification protocol on top of it:
//! - codes expire at an absolute timestamp and are lazily evicted on read
//! - at most `max_attempts` verification tries per issued code
//! - a successfully verified code is single-use; the consumed entry is
//!   retained for a grace window so replays are provably rejected, then
//!   purged by a deferred task
//! - a background sweeper bounds memory growth from abandoned codes
//!
//! All outcomes a caller can observe collapse to a bare boolean: unknown
//! subject, expired code, exhausted attempts, replay, and plain mismatch
//! are indistinguishable from the return value alone.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::OtpCacheConfig;
use crate::entry::VerificationEntry;
use crate::phone::{mask_subject, normalize_subject};
use crate::sweeper::{self, SweepReport};

pub(crate) type EntryMap = Arc<RwLock<HashMap<String, VerificationEntry>>>;

/// In-memory verification-code cache with attempt limiting, replay
/// suppression, and background reclamation.
///
/// One instance owns its background tasks; construct it on process start,
/// pass it (or [`crate::traits::CodeCache`]) to collaborators explicitly,
/// and call [`VerificationCache::shutdown`] on teardown.
pub struct VerificationCache {
    /// Shared entry map; also mutated by the sweeper and purge tasks
    entries: EntryMap,
    /// Cache configuration
    config: OtpCacheConfig,
    /// Handle of the background sweeper, if started
    sweeper: Mutex<Option<JoinHandle<()>>>,
    /// Handles of outstanding grace-window purge tasks
    purge_tasks: Mutex<Vec<JoinHandle<()>>>,
    /// Set once `shutdown` has run; no purge task may be registered after
    /// the drain. Written and read under the `purge_tasks` lock.
    shut_down: AtomicBool,
}

impl VerificationCache {
    /// Create a new verification cache
    ///
    /// The sweeper is not running yet; call
    /// [`VerificationCache::start_sweeper`] from within a tokio runtime.
    pub fn new(config: OtpCacheConfig) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            config,
            sweeper: Mutex::new(None),
            purge_tasks: Mutex::new(Vec::new()),
            shut_down: AtomicBool::new(false),
        }
    }

    /// Create a new verification cache with default configuration
    pub fn with_defaults() -> Self {
        Self::new(OtpCacheConfig::default())
    }

    /// The configuration this cache was built with
    pub fn config(&self) -> &OtpCacheConfig {
        &self.config
    }

    /// Issue a verification code for a subject
    ///
    /// Unconditionally creates or overwrites the entry for the normalized
    /// subject with a zeroed attempt counter. Overwriting invalidates any
    /// prior un-consumed code for the same subject with no grace period.
    /// Never fails.
    pub async fn issue(&self, subject: &str, code: &str, ttl: Duration) {
        let key = normalize_subject(subject);
        let masked = mask_subject(&key);
        let entry = VerificationEntry::new(code.to_string(), ttl);

        let replaced = self.entries.write().await.insert(key, entry).is_some();
        if replaced {
            debug!("prior code invalidated by reissue for subject: {}", masked);
        }
        info!("verification code issued for subject: {} (ttl {:?})", masked, ttl);
    }

    /// Verify a supplied code against the entry for a subject
    ///
    /// Returns `true` exactly once per issued code: on the first exact
    /// match within the entry's lifetime and attempt budget. Every other
    /// case returns `false` with no further detail.
    ///
    /// The whole decision runs under one write-lock acquisition, so two
    /// racing calls for the same subject serialize and at most one can
    /// observe a match.
    pub async fn verify(&self, subject: &str, supplied_code: &str) -> bool {
        let key = normalize_subject(subject);
        let masked = mask_subject(&key);

        {
            let mut entries = self.entries.write().await;

            let entry = match entries.get_mut(&key) {
                Some(entry) => entry,
                None => {
                    debug!("no verification code for subject: {}", masked);
                    return false;
                }
            };

            if entry.is_expired() {
                entries.remove(&key);
                debug!("expired code evicted on verify for subject: {}", masked);
                return false;
            }

            if entry.verified {
                warn!("replay of consumed code rejected for subject: {}", masked);
                return false;
            }

            if entry.attempts >= self.config.max_attempts {
                entries.remove(&key);
                warn!(
                    "exhausted entry evicted for subject: {} ({} attempts)",
                    masked, self.config.max_attempts
                );
                return false;
            }

            // The attempt is counted regardless of the match outcome, so a
            // successful verification also costs one attempt.
            entry.attempts += 1;

            if entry.code != supplied_code {
                if entry.attempts >= self.config.max_attempts {
                    // The last permitted attempt was itself wrong.
                    entries.remove(&key);
                    warn!(
                        "attempt ceiling reached, entry evicted for subject: {}",
                        masked
                    );
                } else {
                    debug!(
                        "code mismatch for subject: {} (attempt {} of {})",
                        masked, entry.attempts, self.config.max_attempts
                    );
                }
                return false;
            }

            entry.verified = true;
        }

        info!("verification code accepted for subject: {}", masked);
        self.schedule_purge(key);
        true
    }

    /// Return the unexpired entry for a subject, if any
    ///
    /// Read-only diagnostic: never counts an attempt and never evicts.
    /// Must not be exposed to unauthenticated callers.
    pub async fn peek(&self, subject: &str) -> Option<VerificationEntry> {
        let key = normalize_subject(subject);
        let entries = self.entries.read().await;
        entries.get(&key).filter(|entry| !entry.is_expired()).cloned()
    }

    /// Check whether an unexpired entry exists for a subject
    ///
    /// Lazily evicts an expired entry as a side effect, so the result is
    /// correct independent of sweeper timing.
    pub async fn exists(&self, subject: &str) -> bool {
        let key = normalize_subject(subject);
        let mut entries = self.entries.write().await;
        match entries.get(&key) {
            Some(entry) if entry.is_expired() => {
                entries.remove(&key);
                debug!(
                    "expired code evicted on existence check for subject: {}",
                    mask_subject(&key)
                );
                false
            }
            Some(_) => true,
            None => false,
        }
    }

    /// Remove the entry for a subject
    ///
    /// Idempotent; removing an absent subject is not an error.
    pub async fn remove(&self, subject: &str) {
        let key = normalize_subject(subject);
        if self.entries.write().await.remove(&key).is_some() {
            debug!("entry removed for subject: {}", mask_subject(&key));
        }
    }

    /// Remaining verification attempts for a subject, `None` if no
    /// unexpired entry exists
    pub async fn remaining_attempts(&self, subject: &str) -> Option<u32> {
        self.peek(subject)
            .await
            .map(|entry| entry.remaining_attempts(self.config.max_attempts))
    }

    /// Seconds until the subject's code expires, `None` if no unexpired
    /// entry exists
    pub async fn code_ttl(&self, subject: &str) -> Option<i64> {
        self.peek(subject)
            .await
            .map(|entry| entry.time_until_expiration().num_seconds())
    }

    /// Number of entries currently held, expired or not
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the cache currently holds no entries
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Run one reclamation pass immediately
    pub async fn sweep_now(&self) -> SweepReport {
        sweeper::sweep_once(&self.entries).await
    }

    /// Start the background reclamation sweeper
    ///
    /// Spawns a tokio task that evicts expired entries every
    /// `sweep_interval`; must be called from within a runtime. Calling it
    /// again while a sweeper is running has no effect.
    pub fn start_sweeper(&self) {
        if !self.config.sweep_enabled {
            warn!("reclamation sweeper is disabled by configuration");
            return;
        }

        if let Ok(mut slot) = self.sweeper.lock() {
            if slot.as_ref().is_some_and(|handle| !handle.is_finished()) {
                return;
            }
            *slot = Some(sweeper::spawn(
                Arc::clone(&self.entries),
                self.config.sweep_interval,
            ));
        }
    }

    /// Cancel the sweeper and all pending grace-window purge tasks
    ///
    /// Safe to call at any point: eviction is idempotent and re-derivable
    /// from `expires_at`, so an aborted purge loses nothing. No purge task
    /// can be registered once shutdown has run; a verification completing
    /// afterwards leaves its consumed entry to age out via `expires_at`.
    pub fn shutdown(&self) {
        if let Ok(mut slot) = self.sweeper.lock() {
            if let Some(handle) = slot.take() {
                handle.abort();
                debug!("reclamation sweeper stopped");
            }
        }
        if let Ok(mut tasks) = self.purge_tasks.lock() {
            // Flag is raised under the same lock that registers purge
            // tasks, so no handle can slip in behind the drain.
            self.shut_down.store(true, Ordering::SeqCst);
            for handle in tasks.drain(..) {
                handle.abort();
            }
        }
    }

    /// Schedule the deferred purge of a consumed entry after the grace
    /// window
    fn schedule_purge(&self, key: String) {
        let entries = Arc::clone(&self.entries);
        let grace = self.config.grace_window;

        let handle = tokio::spawn(async move {
            tokio::time::sleep(grace).await;
            let mut map = entries.write().await;
            // A reissue may have overwritten the consumed entry in the
            // meantime; only purge if the slot still holds a verified one.
            if map.get(&key).is_some_and(|entry| entry.verified) {
                map.remove(&key);
                debug!(
                    "consumed entry purged after grace window for subject: {}",
                    mask_subject(&key)
                );
            }
        });

        if let Ok(mut tasks) = self.purge_tasks.lock() {
            if self.shut_down.load(Ordering::SeqCst) {
                handle.abort();
                return;
            }
            tasks.retain(|task| !task.is_finished());
            tasks.push(handle);
        }
    }
}

impl Drop for VerificationCache {
    fn drop(&mut self) {
        self.shutdown();
    }
}
