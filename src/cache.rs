//! Revalidation cache for rendered pages.
//!
//! ## Staleness
//!
//! Every page records when it was generated. A page older than the
//! revalidation interval is still served, but flagged stale so the caller can
//! schedule a background regeneration. Stale reads are allowed; strict
//! read-after-write is not provided.
//!
//! ## Single flight
//!
//! At most one regeneration per key is in flight. [`RevalidationCache::begin_regeneration`]
//! claims the key and the returned guard releases it when dropped.

use std::collections::HashSet;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use lru::LruCache;
use parking_lot::{Mutex, RwLock};
use tokio::time::Instant;

use crate::types::RenderedPage;

/// Configuration for the page cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of pages kept.
    pub max_entries: usize,
    /// Age after which a page is stale.
    pub revalidate: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 1024,
            revalidate: Duration::from_secs(1),
        }
    }
}

/// Outcome of a cache lookup.
#[derive(Debug, Clone)]
pub enum CacheLookup {
    /// Page younger than the revalidation interval.
    Fresh(Arc<RenderedPage>),
    /// Page past the revalidation interval; serve it and regenerate.
    Stale(Arc<RenderedPage>),
    /// Nothing cached for this key.
    Miss,
}

impl CacheLookup {
    /// Cached page, fresh or stale.
    pub fn page(&self) -> Option<&Arc<RenderedPage>> {
        match self {
            Self::Fresh(page) | Self::Stale(page) => Some(page),
            Self::Miss => None,
        }
    }

    /// Short name for logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fresh(_) => "fresh",
            Self::Stale(_) => "stale",
            Self::Miss => "miss",
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    page: Arc<RenderedPage>,
    generated_at: Instant,
}

/// Cache statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Current number of pages in the cache.
    pub len: usize,
    /// Maximum capacity of the cache.
    pub cap: usize,
    /// Regenerations currently in flight.
    pub regenerating: usize,
}

/// Keyed page cache with a staleness predicate.
///
/// Thread-safe; locks are never held across an await point.
#[derive(Debug)]
pub struct RevalidationCache {
    entries: RwLock<LruCache<String, CacheEntry>>,
    in_flight: Mutex<HashSet<String>>,
    revalidate: Duration,
}

impl RevalidationCache {
    /// Create a cache with the given configuration.
    pub fn new(config: CacheConfig) -> Self {
        let size = NonZeroUsize::new(config.max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: RwLock::new(LruCache::new(size)),
            in_flight: Mutex::new(HashSet::new()),
            revalidate: config.revalidate,
        }
    }

    /// Revalidation interval.
    pub fn revalidate(&self) -> Duration {
        self.revalidate
    }

    /// Whether a page generated at `generated_at` is stale at `now`.
    pub fn is_stale(&self, generated_at: Instant, now: Instant) -> bool {
        now.saturating_duration_since(generated_at) >= self.revalidate
    }

    /// Look up `key`, evaluating staleness before anything is served.
    pub fn lookup(&self, key: &str) -> CacheLookup {
        let now = Instant::now();
        let mut entries = self.entries.write();
        match entries.get(key) {
            Some(entry) if self.is_stale(entry.generated_at, now) => {
                CacheLookup::Stale(Arc::clone(&entry.page))
            }
            Some(entry) => CacheLookup::Fresh(Arc::clone(&entry.page)),
            None => CacheLookup::Miss,
        }
    }

    /// Store a freshly generated page under `key`.
    pub fn insert(&self, key: impl Into<String>, page: Arc<RenderedPage>) {
        let entry = CacheEntry {
            page,
            generated_at: Instant::now(),
        };
        self.entries.write().put(key.into(), entry);
    }

    /// Drop the page cached under `key`.
    pub fn invalidate(&self, key: &str) -> bool {
        self.entries.write().pop(key).is_some()
    }

    /// Claim the regeneration slot for `key`.
    ///
    /// Returns `None` when a regeneration for `key` is already in flight.
    pub fn begin_regeneration(self: &Arc<Self>, key: &str) -> Option<RegenerationGuard> {
        if !self.in_flight.lock().insert(key.to_string()) {
            return None;
        }
        Some(RegenerationGuard {
            cache: Arc::clone(self),
            key: key.to_string(),
        })
    }

    /// Whether a regeneration for `key` is in flight.
    pub fn is_regenerating(&self, key: &str) -> bool {
        self.in_flight.lock().contains(key)
    }

    /// Get cache statistics.
    pub fn stats(&self) -> CacheStats {
        let entries = self.entries.read();
        CacheStats {
            len: entries.len(),
            cap: entries.cap().get(),
            regenerating: self.in_flight.lock().len(),
        }
    }

    /// Remove every page.
    pub fn clear(&self) {
        self.entries.write().clear();
    }
}

impl Default for RevalidationCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

/// Holds the regeneration slot of one key; releases it on drop.
#[derive(Debug)]
pub struct RegenerationGuard {
    cache: Arc<RevalidationCache>,
    key: String,
}

impl RegenerationGuard {
    /// Key being regenerated.
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Drop for RegenerationGuard {
    fn drop(&mut self) {
        self.cache.in_flight.lock().remove(&self.key);
    }
}
