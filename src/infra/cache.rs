//! In-memory caching with a time-to-live checked at read time.

use std::{
    collections::HashMap,
    hash::Hash,
    sync::Arc,
    time::{Duration, SystemTime},
};

#[cfg(test)]
use std::sync::Mutex;

use tokio::sync::Mutex as AsyncMutex;

/// Default TTL: one hour. Annual trade figures only change on revision.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);

/// Source of "now" for expiry checks.
pub trait Clock: Send + Sync {
    fn now(&self) -> SystemTime;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// Clock that only moves when told to.
#[cfg(test)]
#[derive(Clone, Debug)]
pub struct ManualClock {
    now: Arc<Mutex<SystemTime>>,
}

#[cfg(test)]
impl ManualClock {
    pub fn new(start: SystemTime) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    pub fn advance(&self, by: Duration) {
        if let Ok(mut now) = self.now.lock() {
            *now += by;
        }
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now(&self) -> SystemTime {
        self.now
            .lock()
            .map(|now| *now)
            .unwrap_or(SystemTime::UNIX_EPOCH)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CacheStatus {
    /// Loaded from the network on this call.
    Fresh,
    /// Served from memory within the TTL.
    Cached,
}

#[derive(Clone, Debug)]
pub struct CachedPayload<T> {
    pub data: T,
    pub fetched_at: SystemTime,
    pub status: CacheStatus,
}

impl<T> CachedPayload<T> {
    pub fn new(data: T, fetched_at: SystemTime, status: CacheStatus) -> Self {
        Self {
            data,
            fetched_at,
            status,
        }
    }
}

struct Cached<T> {
    value: T,
    fetched_at: SystemTime,
}

/// Keyed cache whose entries expire `ttl` after they were stored.
///
/// Expired entries are not evicted, just ignored, and replaced on the next
/// store. Concurrent refills for the same key are last-writer-wins.
pub struct TtlCache<K, V> {
    entries: AsyncMutex<HashMap<K, Cached<V>>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: AsyncMutex::new(HashMap::new()),
            ttl,
            clock,
        }
    }

    /// Return the entry for `key` if it is still within its TTL.
    pub async fn get(&self, key: &K) -> Option<CachedPayload<V>> {
        let now = self.clock.now();
        let entries = self.entries.lock().await;
        let entry = entries.get(key)?;
        // A clock that went backwards counts as expired.
        let fresh = now
            .duration_since(entry.fetched_at)
            .map(|age| age <= self.ttl)
            .unwrap_or(false);
        fresh.then(|| {
            CachedPayload::new(entry.value.clone(), entry.fetched_at, CacheStatus::Cached)
        })
    }

    /// Store `value` for `key`, stamped with the current clock time.
    pub async fn insert(&self, key: K, value: V) -> CachedPayload<V> {
        let fetched_at = self.clock.now();
        let payload = CachedPayload::new(value.clone(), fetched_at, CacheStatus::Fresh);
        self.entries.lock().await.insert(
            key,
            Cached {
                value,
                fetched_at,
            },
        );
        payload
    }
}
