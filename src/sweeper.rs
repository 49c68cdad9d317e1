//! Background reclamation of expired verification entries
//!
//! The sweeper bounds memory growth from codes that were issued but never
//! verified, and from consumed entries awaiting their grace-window purge.
//! It is a hygiene mechanism only: every read path checks expiry itself,
//! so correctness never depends on sweep timing. The contract is that no
//! entry outlives its expiry by more than one sweep interval.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::entry::VerificationEntry;

/// Result of a single reclamation pass
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    /// Number of entries examined
    pub scanned: usize,
    /// Number of expired entries evicted
    pub evicted: usize,
}

impl SweepReport {
    /// Number of entries still held after the pass
    pub fn retained(&self) -> usize {
        self.scanned - self.evicted
    }
}

/// Evict every expired entry from the map in one pass
pub(crate) async fn sweep_once(
    entries: &RwLock<HashMap<String, VerificationEntry>>,
) -> SweepReport {
    let mut map = entries.write().await;
    let scanned = map.len();
    map.retain(|_, entry| !entry.is_expired());
    SweepReport {
        scanned,
        evicted: scanned - map.len(),
    }
}

/// Spawn the periodic sweeper task
///
/// Runs one pass per interval tick until aborted. The task only holds the
/// map's write lock for the duration of a single pass.
pub(crate) fn spawn(
    entries: Arc<RwLock<HashMap<String, VerificationEntry>>>,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            "reclamation sweeper started - will run every {:?}",
            interval
        );

        let mut ticker = tokio::time::interval(interval);

        loop {
            ticker.tick().await;

            let report = sweep_once(&entries).await;
            if report.evicted > 0 {
                info!(
                    "sweep evicted {} expired entries ({} retained)",
                    report.evicted,
                    report.retained()
                );
            } else {
                debug!("sweep found no expired entries ({} scanned)", report.scanned);
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sweep_evicts_only_expired() {
        let entries = RwLock::new(HashMap::new());
        {
            let mut map = entries.write().await;
            map.insert(
                "233555000111".to_string(),
                VerificationEntry::new("111111".to_string(), Duration::ZERO),
            );
            map.insert(
                "233555000222".to_string(),
                VerificationEntry::new("222222".to_string(), Duration::from_secs(300)),
            );
        }

        tokio::time::sleep(Duration::from_millis(10)).await;

        let report = sweep_once(&entries).await;
        assert_eq!(report.scanned, 2);
        assert_eq!(report.evicted, 1);
        assert_eq!(report.retained(), 1);

        let map = entries.read().await;
        assert!(map.contains_key("233555000222"));
        assert!(!map.contains_key("233555000111"));
    }

    #[tokio::test]
    async fn test_sweep_on_empty_map() {
        let entries = RwLock::new(HashMap::new());

        let report = sweep_once(&entries).await;
        assert_eq!(report, SweepReport::default());
    }

    #[tokio::test]
    async fn test_background_sweeper_evicts_abandoned_entries() {
        let entries = Arc::new(RwLock::new(HashMap::new()));
        entries.write().await.insert(
            "233555000111".to_string(),
            VerificationEntry::new("482913".to_string(), Duration::from_millis(10)),
        );

        let handle = spawn(Arc::clone(&entries), Duration::from_millis(20));
        tokio::time::sleep(Duration::from_millis(100)).await;
        handle.abort();

        assert!(entries.read().await.is_empty());
    }
}
