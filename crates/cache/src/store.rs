//! Key-addressed query cache with single-flight fetches.
//!
//! Values are stored as JSON so one cache can hold every resource type.
//! A read returns the stored value while it is fresh, otherwise it joins the
//! fetch already in flight for that key or starts one. The fetch runs in its
//! own task, so a caller that goes away does not cancel it for the others.
//! Invalidation supersedes a fetch in flight: later reads start a new one
//! and the superseded fetch answers only its own waiters.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::{broadcast, watch};
use tracing::{debug, trace, warn};
use vendorboard_core::{Clock, SystemClock};

use crate::key::QueryKey;

/// Default freshness window.
pub const DEFAULT_STALE_TIME: Duration = Duration::from_secs(5 * 60);

/// Default age after which unused entries are dropped by [`QueryCache::gc`].
pub const DEFAULT_GC_TIME: Duration = Duration::from_secs(30 * 60);

/// Errors raised by the cache itself, independent of the fetcher.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CacheError {
    /// Fetched value could not be stored as JSON
    #[error("failed to encode {key}: {message}")]
    Encode {
        /// Key being fetched
        key: String,
        /// Serializer message
        message: String,
    },

    /// Stored value does not match the requested type
    #[error("failed to decode {key}: {message}")]
    Decode {
        /// Key being read
        key: String,
        /// Deserializer message
        message: String,
    },

    /// The fetch task ended without a result
    #[error("fetch for {0} was aborted")]
    Aborted(String),
}

/// Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;

/// Cache tunables.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// How long a fetched value is served without refetching
    pub stale_time: Duration,

    /// How long an unread entry survives garbage collection. Reads sweep
    /// the cache at most once per this interval.
    pub gc_time: Duration,

    /// Capacity of the event channel
    pub event_capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            stale_time: DEFAULT_STALE_TIME,
            gc_time: DEFAULT_GC_TIME,
            event_capacity: 64,
        }
    }
}

/// Change notifications for subscribers that render cached data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheEvent {
    /// A fetch stored a new value
    Fetched(QueryKey),

    /// A value was written directly
    Updated(QueryKey),

    /// An entry was marked stale
    Invalidated(QueryKey),

    /// An entry was removed
    Removed(QueryKey),
}

/// Counters since creation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Reads served from a fresh entry
    pub hits: u64,

    /// Fetches started
    pub fetches: u64,

    /// Reads that joined a fetch already in flight
    pub joined: u64,

    /// Fetches that ended in an error
    pub failures: u64,
}

type Shared<E> = Option<std::result::Result<Value, E>>;

struct InFlight<E> {
    generation: u64,
    rx: watch::Receiver<Shared<E>>,
}

struct Entry<E> {
    value: Option<Value>,
    updated_at: Option<Instant>,
    read_at: Instant,
    invalidated: bool,
    generation: u64,
    in_flight: Option<InFlight<E>>,
}

impl<E> Entry<E> {
    fn new(now: Instant) -> Self {
        Self {
            value: None,
            updated_at: None,
            read_at: now,
            invalidated: false,
            generation: 0,
            in_flight: None,
        }
    }

    fn fresh_value(&self, now: Instant, stale_time: Duration) -> Option<&Value> {
        if self.invalidated {
            return None;
        }
        let updated_at = self.updated_at?;
        if now.saturating_duration_since(updated_at) < stale_time {
            self.value.as_ref()
        } else {
            None
        }
    }

    /// The in-flight receiver, unless the fetch was superseded by an
    /// invalidation or its task died without sending.
    fn joinable(&self) -> Option<watch::Receiver<Shared<E>>> {
        self.in_flight
            .as_ref()
            .filter(|f| f.generation == self.generation && f.rx.has_changed().is_ok())
            .map(|f| f.rx.clone())
    }
}

#[derive(Default)]
struct Counters {
    hits: AtomicU64,
    fetches: AtomicU64,
    joined: AtomicU64,
    failures: AtomicU64,
}

struct Inner<E> {
    entries: Mutex<HashMap<QueryKey, Entry<E>>>,
    last_sweep: Mutex<Instant>,
    clock: Arc<dyn Clock>,
    config: CacheConfig,
    events: broadcast::Sender<CacheEvent>,
    counters: Counters,
}

impl<E> Inner<E> {
    fn lock(&self) -> MutexGuard<'_, HashMap<QueryKey, Entry<E>>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn emit(&self, event: CacheEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    fn complete(&self, key: &QueryKey, generation: u64, result: &std::result::Result<Value, E>) {
        let now = self.clock.now();
        let stored = {
            let mut entries = self.lock();
            let Some(entry) = entries.get_mut(key) else {
                // Removed while in flight.
                return;
            };
            if entry.in_flight.as_ref().is_some_and(|f| f.generation == generation) {
                entry.in_flight = None;
            }
            if entry.generation != generation {
                trace!(%key, "dropping superseded fetch result");
                if result.is_err() {
                    self.counters.failures.fetch_add(1, Ordering::Relaxed);
                }
                return;
            }
            match result {
                Ok(value) => {
                    entry.value = Some(value.clone());
                    entry.updated_at = Some(now);
                    entry.invalidated = false;
                    true
                }
                Err(_) => false,
            }
        };

        if stored {
            debug!(%key, "cache entry fetched");
            self.emit(CacheEvent::Fetched(key.clone()));
        } else {
            self.counters.failures.fetch_add(1, Ordering::Relaxed);
            warn!(%key, "cache fetch failed; keeping previous value");
        }
    }
}

/// Shared query cache. Cloning yields another handle to the same store.
pub struct QueryCache<E> {
    inner: Arc<Inner<E>>,
}

impl<E> Clone for QueryCache<E> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<E> QueryCache<E>
where
    E: From<CacheError> + Clone + Send + Sync + 'static,
{
    /// Create a cache on the system clock.
    pub fn new(config: CacheConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a cache on a custom clock.
    pub fn with_clock(config: CacheConfig, clock: Arc<dyn Clock>) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        Self {
            inner: Arc::new(Inner {
                entries: Mutex::new(HashMap::new()),
                last_sweep: Mutex::new(clock.now()),
                clock,
                config,
                events,
                counters: Counters::default(),
            }),
        }
    }

    /// Read `key`, fetching with `fetcher` when there is no fresh value.
    ///
    /// Concurrent reads of the same key share one call of `fetcher` and all
    /// resolve to its value or its error. A failed fetch leaves the previous
    /// value in place (still stale) so the next read tries again.
    ///
    /// Must be called from within a tokio runtime.
    pub async fn fetch<T, F, Fut>(&self, key: &QueryKey, fetcher: F) -> std::result::Result<T, E>
    where
        T: Serialize + DeserializeOwned + Send + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>> + Send + 'static,
    {
        let now = self.inner.clock.now();
        self.sweep_if_due(now);
        let mut rx = {
            let mut entries = self.inner.lock();
            let entry = entries.entry(key.clone()).or_insert_with(|| Entry::new(now));
            entry.read_at = now;

            if let Some(value) = entry.fresh_value(now, self.inner.config.stale_time) {
                self.inner.counters.hits.fetch_add(1, Ordering::Relaxed);
                trace!(%key, "cache hit");
                return decode(key, value.clone());
            }

            if let Some(rx) = entry.joinable() {
                self.inner.counters.joined.fetch_add(1, Ordering::Relaxed);
                trace!(%key, "joining in-flight fetch");
                rx
            } else {
                self.inner.counters.fetches.fetch_add(1, Ordering::Relaxed);
                debug!(%key, "cache miss; fetching");
                let (tx, rx) = watch::channel(None);
                entry.in_flight = Some(InFlight {
                    generation: entry.generation,
                    rx: rx.clone(),
                });
                self.spawn_fetch(key.clone(), entry.generation, fetcher(), tx);
                rx
            }
        };

        let shared = match rx.wait_for(Option::is_some).await {
            Ok(shared) => shared.clone(),
            Err(_) => None,
        };
        match shared {
            Some(Ok(value)) => decode(key, value),
            Some(Err(err)) => Err(err),
            None => Err(CacheError::Aborted(key.to_string()).into()),
        }
    }

    fn spawn_fetch<T, Fut>(
        &self,
        key: QueryKey,
        generation: u64,
        fut: Fut,
        tx: watch::Sender<Shared<E>>,
    ) where
        T: Serialize + Send + 'static,
        Fut: Future<Output = std::result::Result<T, E>> + Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            let result = fut.await.and_then(|value| {
                serde_json::to_value(value).map_err(|e| {
                    E::from(CacheError::Encode {
                        key: key.to_string(),
                        message: e.to_string(),
                    })
                })
            });
            inner.complete(&key, generation, &result);
            tx.send_replace(Some(result));
        });
    }

    /// Stored value for `key`, fresh or stale.
    pub fn peek<T: DeserializeOwned>(&self, key: &QueryKey) -> Option<T> {
        let value = self.inner.lock().get(key)?.value.clone()?;
        serde_json::from_value(value).ok()
    }

    /// Whether `key` would be served without fetching.
    pub fn is_fresh(&self, key: &QueryKey) -> bool {
        let now = self.inner.clock.now();
        self.inner
            .lock()
            .get(key)
            .is_some_and(|entry| entry.fresh_value(now, self.inner.config.stale_time).is_some())
    }

    /// Store `value` under `key` as freshly fetched.
    pub fn set<T: Serialize>(&self, key: &QueryKey, value: &T) -> Result<()> {
        let value = serde_json::to_value(value).map_err(|e| CacheError::Encode {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        let now = self.inner.clock.now();
        {
            let mut entries = self.inner.lock();
            let entry = entries.entry(key.clone()).or_insert_with(|| Entry::new(now));
            entry.value = Some(value);
            entry.updated_at = Some(now);
            entry.read_at = now;
            entry.invalidated = false;
            // A fetch already in flight must not count as current.
            entry.generation += 1;
        }
        self.inner.emit(CacheEvent::Updated(key.clone()));
        Ok(())
    }

    /// Mark every entry under `prefix` stale. Returns how many matched.
    ///
    /// A fetch in flight for a matched key still delivers its value to the
    /// callers already waiting on it, but stores nothing. The next read
    /// starts a new fetch.
    pub fn invalidate(&self, prefix: &QueryKey) -> usize {
        let matched: Vec<QueryKey> = {
            let mut entries = self.inner.lock();
            entries
                .iter_mut()
                .filter(|(key, _)| key.starts_with(prefix))
                .map(|(key, entry)| {
                    entry.invalidated = true;
                    entry.generation += 1;
                    key.clone()
                })
                .collect()
        };

        debug!(%prefix, count = matched.len(), "invalidated cache scope");
        let count = matched.len();
        for key in matched {
            self.inner.emit(CacheEvent::Invalidated(key));
        }
        count
    }

    /// Invalidate several scopes. Returns the total number of matches.
    pub fn invalidate_all<'a>(&self, prefixes: impl IntoIterator<Item = &'a QueryKey>) -> usize {
        prefixes.into_iter().map(|prefix| self.invalidate(prefix)).sum()
    }

    /// Drop every entry under `prefix`. Returns how many were removed.
    pub fn remove(&self, prefix: &QueryKey) -> usize {
        let removed: Vec<QueryKey> = {
            let mut entries = self.inner.lock();
            let keys: Vec<QueryKey> = entries
                .keys()
                .filter(|key| key.starts_with(prefix))
                .cloned()
                .collect();
            for key in &keys {
                entries.remove(key);
            }
            keys
        };

        let count = removed.len();
        for key in removed {
            self.inner.emit(CacheEvent::Removed(key));
        }
        count
    }

    fn sweep_if_due(&self, now: Instant) {
        {
            let mut last = self.inner.last_sweep.lock().unwrap_or_else(|e| e.into_inner());
            if now.saturating_duration_since(*last) < self.inner.config.gc_time {
                return;
            }
            *last = now;
        }
        self.gc();
    }

    /// Drop entries not read for longer than the configured gc time.
    ///
    /// Entries with a fetch in flight are kept.
    pub fn gc(&self) -> usize {
        let now = self.inner.clock.now();
        let max_age = self.inner.config.gc_time;
        let mut entries = self.inner.lock();
        let before = entries.len();
        entries.retain(|_, entry| {
            entry.in_flight.is_some() || now.saturating_duration_since(entry.read_at) <= max_age
        });
        let dropped = before - entries.len();
        if dropped > 0 {
            debug!(dropped, "cache gc");
        }
        dropped
    }

    /// Number of entries held.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Receive change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.inner.events.subscribe()
    }

    /// Counters since creation.
    pub fn stats(&self) -> CacheStats {
        let c = &self.inner.counters;
        CacheStats {
            hits: c.hits.load(Ordering::Relaxed),
            fetches: c.fetches.load(Ordering::Relaxed),
            joined: c.joined.load(Ordering::Relaxed),
            failures: c.failures.load(Ordering::Relaxed),
        }
    }
}

fn decode<T: DeserializeOwned, E: From<CacheError>>(
    key: &QueryKey,
    value: Value,
) -> std::result::Result<T, E> {
    serde_json::from_value(value).map_err(|e| {
        E::from(CacheError::Decode {
            key: key.to_string(),
            message: e.to_string(),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invalidation::Mutation;
    use crate::key::keys;
    use std::sync::atomic::AtomicUsize;
    use vendorboard_core::{AssessmentId, ManualClock, VendorId};

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum TestError {
        Remote(String),
        Cache(CacheError),
    }

    impl From<CacheError> for TestError {
        fn from(err: CacheError) -> Self {
            TestError::Cache(err)
        }
    }

    fn cache() -> (QueryCache<TestError>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let cache = QueryCache::with_clock(CacheConfig::default(), clock.clone());
        (cache, clock)
    }

    async fn counted(
        cache: &QueryCache<TestError>,
        key: &QueryKey,
        calls: &Arc<AtomicUsize>,
        value: u32,
    ) -> std::result::Result<u32, TestError> {
        let calls = Arc::clone(calls);
        cache
            .fetch(key, move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(value)
            })
            .await
    }

    #[tokio::test]
    async fn test_fresh_value_is_served_from_cache() {
        let (cache, clock) = cache();
        let calls = Arc::new(AtomicUsize::new(0));
        let key = keys::vendor_list();

        assert_eq!(counted(&cache, &key, &calls, 1).await, Ok(1));
        clock.advance(Duration::from_secs(4 * 60));
        assert_eq!(counted(&cache, &key, &calls, 2).await, Ok(1));

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.stats().hits, 1);
    }

    #[tokio::test]
    async fn test_stale_value_is_refetched() {
        let (cache, clock) = cache();
        let calls = Arc::new(AtomicUsize::new(0));
        let key = keys::vendor_list();

        counted(&cache, &key, &calls, 1).await.unwrap();
        clock.advance(DEFAULT_STALE_TIME);
        assert!(!cache.is_fresh(&key));
        assert_eq!(counted(&cache, &key, &calls, 2).await, Ok(2));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_concurrent_reads_share_one_fetch() {
        let (cache, _) = cache();
        let calls = Arc::new(AtomicUsize::new(0));
        let key = keys::product_list();

        let reads = (0..8).map(|i| {
            let cache = cache.clone();
            let key = key.clone();
            let calls = Arc::clone(&calls);
            async move {
                cache
                    .fetch(&key, move || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(20)).await;
                        Ok::<_, TestError>(vec![format!("product-{i}")])
                    })
                    .await
            }
        });
        let results = futures::future::join_all(reads).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let first = results[0].clone().unwrap();
        assert!(results.iter().all(|r| r.as_ref() == Ok(&first)));
        assert_eq!(cache.stats().fetches, 1);
        assert_eq!(cache.stats().joined, 7);
    }

    #[tokio::test]
    async fn test_concurrent_reads_share_one_error() {
        let (cache, _) = cache();
        let calls = Arc::new(AtomicUsize::new(0));
        let key = keys::results(&AssessmentId::new("a-1"));

        let reads = (0..4).map(|_| {
            let cache = cache.clone();
            let key = key.clone();
            let calls = Arc::clone(&calls);
            async move {
                cache
                    .fetch(&key, move || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(20)).await;
                        Err::<u32, _>(TestError::Remote("boom".into()))
                    })
                    .await
            }
        });
        let results = futures::future::join_all(reads).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(results
            .iter()
            .all(|r| r == &Err(TestError::Remote("boom".into()))));
        assert_eq!(cache.stats().failures, 1);

        // Errors are not cached.
        assert_eq!(counted(&cache, &key, &calls, 5).await, Ok(5));
    }

    #[tokio::test]
    async fn test_failed_refetch_keeps_previous_value() {
        let (cache, _) = cache();
        let key = keys::vendor_list();
        cache.set(&key, &vec!["Acme"]).unwrap();
        cache.invalidate(&key);

        let result: std::result::Result<Vec<String>, _> = cache
            .fetch(&key, || async { Err(TestError::Remote("down".into())) })
            .await;
        assert!(result.is_err());
        assert_eq!(cache.peek::<Vec<String>>(&key), Some(vec!["Acme".to_string()]));
        assert!(!cache.is_fresh(&key));
    }

    #[tokio::test]
    async fn test_invalidation_forces_refetch_inside_window() {
        let (cache, _) = cache();
        let calls = Arc::new(AtomicUsize::new(0));
        let key = keys::vendor_list();

        counted(&cache, &key, &calls, 1).await.unwrap();
        assert_eq!(cache.invalidate(&keys::vendors()), 1);
        assert_eq!(counted(&cache, &key, &calls, 2).await, Ok(2));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_product_mutation_leaves_unrelated_scopes() {
        let (cache, _) = cache();
        let vendor = VendorId::new("v-1");
        let assessment = AssessmentId::new("a-1");
        for key in [
            keys::product_list(),
            keys::products_by_vendor(&vendor),
            keys::vendor_list(),
            keys::results(&assessment),
        ] {
            cache.set(&key, &1u32).unwrap();
        }

        let scopes = Mutation::CreateProduct { vendor_id: vendor.clone() }.invalidated_keys();
        assert_eq!(cache.invalidate_all(&scopes), 3);

        assert!(!cache.is_fresh(&keys::product_list()));
        assert!(!cache.is_fresh(&keys::products_by_vendor(&vendor)));
        assert!(!cache.is_fresh(&keys::vendor_list()));
        assert!(cache.is_fresh(&keys::results(&assessment)));
    }

    #[tokio::test]
    async fn test_invalidation_during_fetch_discards_landed_value() {
        let (cache, _) = cache();
        let key = keys::vendor_list();
        let (release, gate) = tokio::sync::oneshot::channel::<()>();

        let reader = {
            let cache = cache.clone();
            let key = key.clone();
            tokio::spawn(async move {
                cache
                    .fetch(&key, move || async move {
                        let _ = gate.await;
                        Ok::<_, TestError>(7u32)
                    })
                    .await
            })
        };
        while cache.is_empty() {
            tokio::task::yield_now().await;
        }

        cache.invalidate(&key);
        release.send(()).unwrap();

        assert_eq!(reader.await.unwrap(), Ok(7));
        assert_eq!(cache.peek::<u32>(&key), None);
        assert!(!cache.is_fresh(&key));
    }

    #[tokio::test]
    async fn test_read_after_invalidation_does_not_join_older_fetch() {
        let (cache, _) = cache();
        let key = keys::vendor_list();
        let (release, gate) = tokio::sync::oneshot::channel::<()>();

        let before = {
            let cache = cache.clone();
            let key = key.clone();
            tokio::spawn(async move {
                cache
                    .fetch(&key, move || async move {
                        let _ = gate.await;
                        Ok::<_, TestError>("before-mutation".to_string())
                    })
                    .await
            })
        };
        while cache.is_empty() {
            tokio::task::yield_now().await;
        }

        cache.invalidate(&keys::vendors());
        let after = cache
            .fetch(&key, || async { Ok::<_, TestError>("after-mutation".to_string()) })
            .await;
        assert_eq!(after, Ok("after-mutation".to_string()));

        release.send(()).unwrap();
        assert_eq!(before.await.unwrap(), Ok("before-mutation".to_string()));

        // The older fetch landed last but must not overwrite the newer value.
        assert_eq!(cache.peek::<String>(&key), Some("after-mutation".to_string()));
        assert!(cache.is_fresh(&key));
        assert_eq!(cache.stats().fetches, 2);
        assert_eq!(cache.stats().joined, 0);
    }

    #[tokio::test]
    async fn test_events_are_broadcast() {
        let (cache, _) = cache();
        let mut events = cache.subscribe();
        let calls = Arc::new(AtomicUsize::new(0));
        let key = keys::vendor_list();

        counted(&cache, &key, &calls, 1).await.unwrap();
        cache.invalidate(&keys::vendors());

        assert_eq!(events.recv().await.unwrap(), CacheEvent::Fetched(key.clone()));
        assert_eq!(events.recv().await.unwrap(), CacheEvent::Invalidated(key));
    }

    #[tokio::test]
    async fn test_decode_mismatch_is_reported() {
        let (cache, _) = cache();
        let key = keys::vendor_list();
        cache.set(&key, &"not a number").unwrap();

        let result: std::result::Result<u32, TestError> =
            cache.fetch(&key, || async { Ok(1u32) }).await;
        assert!(matches!(result, Err(TestError::Cache(CacheError::Decode { .. }))));
    }

    #[tokio::test]
    async fn test_gc_and_remove() {
        let (cache, clock) = cache();
        cache.set(&keys::vendor_list(), &1u32).unwrap();
        cache.set(&keys::product_list(), &2u32).unwrap();

        clock.advance(DEFAULT_GC_TIME + Duration::from_secs(1));
        cache.set(&keys::product_list(), &3u32).unwrap();

        assert_eq!(cache.gc(), 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.remove(&keys::products()), 1);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_reads_sweep_unused_entries() {
        let (cache, clock) = cache();
        let calls = Arc::new(AtomicUsize::new(0));
        cache.set(&keys::vendor_list(), &1u32).unwrap();
        cache.set(&keys::product_list(), &2u32).unwrap();

        clock.advance(Duration::from_secs(60));
        counted(&cache, &keys::vendor_list(), &calls, 9).await.unwrap();
        assert_eq!(cache.len(), 2);

        clock.advance(DEFAULT_GC_TIME);
        let vendor = keys::vendor_detail(&VendorId::new("v-1"));
        counted(&cache, &vendor, &calls, 3).await.unwrap();

        // Only the entry read in this sweep interval and the new one remain.
        assert_eq!(cache.len(), 2);
        assert!(cache.peek::<u32>(&keys::product_list()).is_none());
        assert_eq!(cache.peek::<u32>(&vendor), Some(3));
    }
}
