//! Configuration for the verification-code cache

use std::time::Duration;

/// Maximum verification attempts allowed per issued code
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Grace window after a successful verification before the consumed entry
/// is purged (1 minute)
pub const DEFAULT_GRACE_WINDOW: Duration = Duration::from_secs(60);

/// Interval between background reclamation passes (1 minute)
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Configuration for the verification-code cache
#[derive(Debug, Clone)]
pub struct OtpCacheConfig {
    /// Maximum number of verification attempts per entry before forced eviction
    pub max_attempts: u32,
    /// How long a successfully verified entry is retained to reject replays
    pub grace_window: Duration,
    /// How often the background sweeper evicts expired entries
    pub sweep_interval: Duration,
    /// Whether to run the background sweeper
    pub sweep_enabled: bool,
}

impl Default for OtpCacheConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            grace_window: DEFAULT_GRACE_WINDOW,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            sweep_enabled: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = OtpCacheConfig::default();
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.grace_window, Duration::from_secs(60));
        assert_eq!(config.sweep_interval, Duration::from_secs(60));
        assert!(config.sweep_enabled);
    }
}
