//! In-process TTL cache for per-user permission rules.
//!
//! Every authorization check needs the principal's override rules; this
//! cache remembers them for a bounded window so the storage layer is not
//! hit on every request. Entries are keyed by user id, replaced wholesale
//! on refresh, reported as misses once their TTL elapses, and removed by
//! a periodic background sweep or by explicit invalidation.

use chrono::{DateTime, Duration, Utc};
use permissions::PermissionRule;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Default time-to-live for a cached rule list: 5 minutes.
pub const DEFAULT_TTL_SECONDS: i64 = 300;

/// Default interval between background sweeps: 10 minutes.
pub const DEFAULT_SWEEP_INTERVAL_SECONDS: u64 = 600;

/// Configuration for the permission cache
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// How long a cached rule list stays valid, in seconds
    pub ttl_seconds: i64,
    /// How often the background sweep removes expired entries, in seconds
    pub sweep_interval_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: DEFAULT_TTL_SECONDS,
            sweep_interval_seconds: DEFAULT_SWEEP_INTERVAL_SECONDS,
        }
    }
}

impl CacheConfig {
    /// Build a configuration from the environment, falling back to the
    /// defaults for anything unset or unparsable.
    ///
    /// Recognized variables: `PERMISSION_CACHE_TTL_SECONDS` and
    /// `PERMISSION_CACHE_SWEEP_SECONDS`.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let ttl_seconds = match std::env::var("PERMISSION_CACHE_TTL_SECONDS") {
            Ok(raw) => raw.parse().unwrap_or_else(|_| {
                warn!(
                    "Invalid PERMISSION_CACHE_TTL_SECONDS value '{}', using default {}",
                    raw, defaults.ttl_seconds
                );
                defaults.ttl_seconds
            }),
            Err(_) => defaults.ttl_seconds,
        };

        let sweep_interval_seconds = match std::env::var("PERMISSION_CACHE_SWEEP_SECONDS") {
            Ok(raw) => raw.parse().unwrap_or_else(|_| {
                warn!(
                    "Invalid PERMISSION_CACHE_SWEEP_SECONDS value '{}', using default {}",
                    raw, defaults.sweep_interval_seconds
                );
                defaults.sweep_interval_seconds
            }),
            Err(_) => defaults.sweep_interval_seconds,
        };

        Self {
            ttl_seconds,
            sweep_interval_seconds,
        }
    }
}

/// A cached rule list for one user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub rules: Vec<PermissionRule>,
    pub cached_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Statistics about the cache
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStats {
    pub entries: usize,
    pub expired_entries: usize,
    pub ttl_seconds: i64,
    pub sweep_interval_seconds: u64,
}

/// Thread-safe in-memory cache of per-user permission rules
pub struct PermissionCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    config: CacheConfig,
}

impl PermissionCache {
    /// Create a new cache with the given configuration
    pub fn new(config: CacheConfig) -> Self {
        info!(
            "Permission cache initialized (ttl={}s, sweep every {}s)",
            config.ttl_seconds, config.sweep_interval_seconds
        );
        Self {
            entries: RwLock::new(HashMap::new()),
            config,
        }
    }

    /// Create a new cache with the default configuration
    pub fn with_defaults() -> Self {
        Self::new(CacheConfig::default())
    }

    /// Get the cached rules for a user, or `None` on a miss.
    ///
    /// An entry whose TTL has elapsed is reported as a miss; removal is
    /// left to the background sweep.
    pub async fn get(&self, user_id: &str) -> Option<Vec<PermissionRule>> {
        let entries = self.entries.read().await;
        let entry = match entries.get(user_id) {
            Some(entry) => entry,
            None => {
                debug!("Cache miss: user_id={}", user_id);
                return None;
            }
        };

        let now = Utc::now();
        if now >= entry.expires_at {
            debug!(
                "Cache entry expired: user_id={}, cached_at={}",
                user_id, entry.cached_at
            );
            return None;
        }

        debug!(
            "Cache hit: user_id={}, {} rules",
            user_id,
            entry.rules.len()
        );
        Some(entry.rules.clone())
    }

    /// Store a user's rules, replacing any existing entry wholesale.
    pub async fn put(&self, user_id: &str, rules: Vec<PermissionRule>) {
        let now = Utc::now();
        let entry = CacheEntry {
            cached_at: now,
            expires_at: now + Duration::seconds(self.config.ttl_seconds),
            rules,
        };

        debug!(
            "Caching {} rules for user_id={} until {}",
            entry.rules.len(),
            user_id,
            entry.expires_at
        );

        let mut entries = self.entries.write().await;
        entries.insert(user_id.to_string(), entry);
    }

    /// Remove the entry for one user. Returns whether an entry existed.
    ///
    /// Call this after creating or changing a rule for the user so the
    /// next authorization check sees fresh data instead of waiting out
    /// the TTL.
    pub async fn invalidate(&self, user_id: &str) -> bool {
        let mut entries = self.entries.write().await;
        let removed = entries.remove(user_id).is_some();
        if removed {
            debug!("Invalidated cache entry: user_id={}", user_id);
        } else {
            debug!("No cache entry to invalidate: user_id={}", user_id);
        }
        removed
    }

    /// Clear the entire cache, returning the number of entries removed.
    pub async fn invalidate_all(&self) -> usize {
        let mut entries = self.entries.write().await;
        let count = entries.len();
        entries.clear();
        info!("Cleared {} cache entries", count);
        count
    }

    /// Remove every entry that expired at or before `now`.
    ///
    /// Returns the number of entries removed. Runs from the background
    /// sweeper but can also be called directly.
    pub async fn sweep_expired(&self, now: DateTime<Utc>) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at > now);
        let removed = before - entries.len();
        if removed > 0 {
            info!("Swept {} expired cache entries", removed);
        }
        removed
    }

    /// Get statistics about the cache
    pub async fn stats(&self) -> CacheStats {
        let entries = self.entries.read().await;
        let now = Utc::now();
        let expired_entries = entries
            .values()
            .filter(|entry| now >= entry.expires_at)
            .count();

        CacheStats {
            entries: entries.len(),
            expired_entries,
            ttl_seconds: self.config.ttl_seconds,
            sweep_interval_seconds: self.config.sweep_interval_seconds,
        }
    }

    /// The configuration this cache was created with
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }
}

/// Run the periodic expiry sweep in a background task.
///
/// The task ticks for the lifetime of the process and never blocks
/// request-handling paths; drop the handle or abort it on shutdown.
pub fn spawn_sweeper(cache: Arc<PermissionCache>) -> JoinHandle<()> {
    let period = std::time::Duration::from_secs(cache.config.sweep_interval_seconds.max(1));
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        // The first tick completes immediately; sweeping a fresh cache is harmless.
        loop {
            interval.tick().await;
            cache.sweep_expired(Utc::now()).await;
        }
    })
}
