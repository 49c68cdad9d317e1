//! # otp-cache
//!
//! In-process cache for short-lived one-time verification codes bound to
//! phone numbers. A code-delivery collaborator stores a code with
//! [`VerificationCache::issue`]; an authentication flow later asks
//! [`VerificationCache::verify`] whether a presented code matches, has not
//! expired, has not been replayed, and has not been guessed too many times.
//!
//! The cache never generates codes, never sends them, and never persists
//! anything beyond the process lifetime. All rejection causes collapse to
//! a bare `false` so callers cannot leak why a code failed.

pub mod cache;
pub mod config;
pub mod entry;
pub mod phone;
pub mod sweeper;
pub mod traits;

// Re-export commonly used types for convenience
pub use cache::VerificationCache;
pub use config::OtpCacheConfig;
pub use entry::VerificationEntry;
pub use phone::{mask_subject, normalize_subject};
pub use sweeper::SweepReport;
pub use traits::CodeCache;
