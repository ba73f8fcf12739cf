//! Client-credentials token cache.
//!
//! One `{token, expiry}` slot shared by every concurrent search request.
//! Concurrent misses may each fetch their own token; whichever write lands
//! last wins. That race is benign: each writer stores a self-consistent
//! pair, and the upstream token call is idempotent and cheap, so there is
//! deliberately no single-flight deduplication.

use std::sync::RwLock;
use std::time::{SystemTime, UNIX_EPOCH};

/// Seconds shaved off an issued ttl so a token is never used mid-expiry.
pub const SAFETY_MARGIN_SECS: u64 = 60;

/// Time source, injectable so tests can drive the cache deterministically.
pub trait Clock: Send + Sync {
    /// Current unix time in milliseconds.
    fn now_millis(&self) -> u64;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    /// Absolute unix millis after which the token is no longer usable.
    expiry: u64,
}

/// Single-slot token cache.
#[derive(Debug, Default)]
pub struct TokenCache {
    slot: RwLock<Option<CachedToken>>,
}

impl TokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached token if `now` is strictly before its expiry.
    pub fn get(&self, now: u64) -> Option<String> {
        let slot = self.slot.read().unwrap();
        slot.as_ref()
            .filter(|cached| now < cached.expiry)
            .map(|cached| cached.token.clone())
    }

    /// Replace the slot with a freshly issued token.
    ///
    /// `expires_in_secs` is the ttl reported by the token endpoint; the
    /// stored expiry is `now + ttl - SAFETY_MARGIN_SECS`.
    pub fn store<S: Into<String>>(&self, token: S, expires_in_secs: u64, now: u64) {
        let usable_secs = expires_in_secs.saturating_sub(SAFETY_MARGIN_SECS);
        let cached = CachedToken {
            token: token.into(),
            expiry: now + usable_secs * 1000,
        };
        *self.slot.write().unwrap() = Some(cached);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_cache_misses() {
        let cache = TokenCache::new();
        assert_eq!(cache.get(0), None);
    }

    #[test]
    fn test_expiry_accounts_for_safety_margin() {
        let cache = TokenCache::new();
        cache.store("tok", 3600, 1_000_000);
        let expiry = 1_000_000 + (3600 - SAFETY_MARGIN_SECS) * 1000;

        assert_eq!(cache.get(expiry - 1), Some("tok".to_string()));
        assert_eq!(cache.get(expiry), None);
        assert_eq!(cache.get(expiry + 1), None);
    }

    #[test]
    fn test_sequential_lookups_within_ttl_share_token() {
        // ttl=3600s, margin=60s, requests at t=0 and t=10s
        let cache = TokenCache::new();
        cache.store("tok", 3600, 0);
        assert_eq!(cache.get(0), Some("tok".to_string()));
        assert_eq!(cache.get(10_000), Some("tok".to_string()));
    }

    #[test]
    fn test_store_replaces_previous_token() {
        let cache = TokenCache::new();
        cache.store("old", 3600, 0);
        cache.store("new", 3600, 5_000);
        assert_eq!(cache.get(6_000), Some("new".to_string()));
    }

    #[test]
    fn test_tiny_ttl_is_unusable() {
        let cache = TokenCache::new();
        cache.store("tok", 30, 0);
        assert_eq!(cache.get(0), None);
    }
}
