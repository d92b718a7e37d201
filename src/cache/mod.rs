//! Recommendation cache with time-based and feedback-driven invalidation.
//!
//! [`TtlCache`] memoizes ranked recommendation lists per
//! (user, recommendation kind, parameter fingerprint). Entries expire after a
//! fixed time-to-live (default one hour) and are dropped early for a user
//! when that user submits feedback or requests an explicit invalidation.
//!
//! Time is read through the injected [`Clock`] trait so tests drive expiry
//! deterministically with [`ManualClock`]; TTL metadata lives on each entry,
//! not in process-wide state.
//!
//! # Concurrency contract
//!
//! Duplicate concurrent recomputation for the same key is **tolerated**:
//! scoring is a cheap read-only pass over the catalog, so
//! [`TtlCache::get_or_compute`] holds no lock while the compute closure runs.
//! Two racing requests may both compute; the last writer wins, and the
//! results are idempotent for unchanged underlying data within the same TTL
//! window. No request-coalescing lock is used.
//!
//! A cache problem must never fail a recommendation request: the in-memory
//! cache is infallible by construction, and when the compute closure fails
//! nothing is stored.
//!
//! # Examples
//!
//! ```
//! use recomendar::cache::{CacheKey, TtlCache};
//! use recomendar::catalog::UserId;
//! use recomendar::recommend::{RecommendationKind, RecommendationParams};
//!
//! let cache = TtlCache::new();
//! let params = RecommendationParams::new();
//! let key = CacheKey::new(UserId(1), RecommendationKind::PopularityBased, &params);
//!
//! let first = cache.get_or_compute(key.clone(), || Ok(Vec::new())).unwrap();
//! assert!(first.is_empty());
//! assert!(cache.get(&key).is_some()); // served from cache until TTL or invalidation
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Mutex, RwLock};

use crate::catalog::UserId;
use crate::error::Result;
use crate::recommend::{RecommendationKind, RecommendationParams, ScoredBook};

/// Default entry time-to-live: one hour.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);

/// Time source for cache expiry.
pub trait Clock: fmt::Debug + Send + Sync {
    /// Current instant.
    fn now(&self) -> Instant;
}

/// Wall-clock time source used in production.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Deterministic clock for tests: time moves only when advanced.
#[derive(Debug)]
pub struct ManualClock {
    base: Instant,
    offset: Mutex<Duration>,
}

impl ManualClock {
    /// Creates a clock frozen at the current instant.
    #[must_use]
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    /// Advances the clock by `delta`.
    pub fn advance(&self, delta: Duration) {
        *self.offset.lock() += delta;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base + *self.offset.lock()
    }
}

/// Cache key: user identity, recommendation kind, and a canonical parameter
/// fingerprint, so logically identical parameter sets share one entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Requesting user
    pub user_id: UserId,
    /// Recommendation kind the entry holds
    pub kind: RecommendationKind,
    /// Canonical rendering of the request parameters
    pub fingerprint: String,
}

impl CacheKey {
    /// Builds the key for a request.
    #[must_use]
    pub fn new(user_id: UserId, kind: RecommendationKind, params: &RecommendationParams) -> Self {
        Self {
            user_id,
            kind,
            fingerprint: params.fingerprint(),
        }
    }
}

#[derive(Debug, Clone)]
struct CachedRanking {
    ranking: Vec<ScoredBook>,
    cached_at: Instant,
    ttl: Duration,
}

impl CachedRanking {
    fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.cached_at) >= self.ttl
    }
}

/// Hit/miss counters, sampled with [`TtlCache::stats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    /// Lookups answered from a live entry
    pub hits: u64,
    /// Lookups that found nothing, or only an expired entry
    pub misses: u64,
}

impl CacheStats {
    /// Hit rate in 0.0..=1.0, 0 when the cache was never queried.
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Keyed TTL store for ranked recommendation lists.
#[derive(Debug)]
pub struct TtlCache {
    ttl: Duration,
    clock: Arc<dyn Clock>,
    entries: RwLock<HashMap<CacheKey, CachedRanking>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl Default for TtlCache {
    fn default() -> Self {
        Self::new()
    }
}

impl TtlCache {
    /// Creates a cache with the default one-hour TTL and the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            clock: Arc::new(SystemClock),
            entries: RwLock::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Sets the entry time-to-live.
    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Injects a clock (tests substitute [`ManualClock`]).
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// The configured time-to-live.
    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Looks up a live entry. An expired entry counts as a miss and is
    /// dropped on the spot; the hit path takes only the read lock.
    #[must_use]
    pub fn get(&self, key: &CacheKey) -> Option<Vec<ScoredBook>> {
        let now = self.clock.now();
        let expired = {
            let entries = self.entries.read();
            match entries.get(key) {
                Some(entry) if !entry.is_expired(now) => {
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    return Some(entry.ranking.clone());
                }
                Some(_) => true,
                None => false,
            }
        };
        self.misses.fetch_add(1, Ordering::Relaxed);
        if expired {
            let mut entries = self.entries.write();
            // Re-check under the write lock: a racing insert may have
            // refreshed the entry.
            if entries.get(key).is_some_and(|e| e.is_expired(now)) {
                entries.remove(key);
            }
        }
        None
    }

    /// Stores a ranking under the configured TTL, replacing any previous
    /// entry for the key. Entries whose TTL has lapsed are swept out on the
    /// way, so abandoned keys do not accumulate.
    pub fn insert(&self, key: CacheKey, ranking: Vec<ScoredBook>) {
        let now = self.clock.now();
        let entry = CachedRanking {
            ranking,
            cached_at: now,
            ttl: self.ttl,
        };
        let mut entries = self.entries.write();
        entries.retain(|_, e| !e.is_expired(now));
        entries.insert(key, entry);
    }

    /// Returns the cached ranking, or runs `compute`, stores its result, and
    /// returns it. When `compute` fails nothing is stored.
    ///
    /// No lock is held while `compute` runs; see the module docs for the
    /// duplicate-recomputation contract.
    ///
    /// # Errors
    ///
    /// Propagates the compute closure's error.
    pub fn get_or_compute<F>(&self, key: CacheKey, compute: F) -> Result<Vec<ScoredBook>>
    where
        F: FnOnce() -> Result<Vec<ScoredBook>>,
    {
        if let Some(ranking) = self.get(&key) {
            return Ok(ranking);
        }
        let ranking = compute()?;
        self.insert(key, ranking.clone());
        Ok(ranking)
    }

    /// Drops every entry belonging to `user`, regardless of remaining TTL.
    /// Returns the number of entries removed.
    pub fn invalidate_user(&self, user: UserId) -> usize {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|key, _| key.user_id != user);
        before - entries.len()
    }

    /// Drops all entries.
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Number of stored entries, expired ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Snapshot of the hit/miss counters.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests;
