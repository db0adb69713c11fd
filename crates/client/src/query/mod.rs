//! In-memory query cache for slow-changing reference data.
//!
//! One [`QueryCache`] per value type. Entries are keyed by [`QueryKey`] and
//! carry two instants derived from their [`QueryPolicy`]:
//!
//! - before `stale_at` the value is served as is;
//! - between `stale_at` and `evict_at` it is served immediately while a
//!   background refresh runs (when the policy allows it);
//! - after `evict_at` it is never served and the caller waits for a refetch.
//!
//! Concurrent requests for the same key share one in-flight fetch.

pub mod key;
pub mod policy;
pub mod state;

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use tokio::sync::RwLock;
use tokio::time::Instant;

pub use key::QueryKey;
pub use policy::{DEFAULT_EVICT_TIME, QueryPolicy, RETRY_DELAY, RefetchEvent, ResourceSpec};
pub use state::QueryState;

use crate::error::ResourceError;

type Fetcher<V> = Arc<dyn Fn() -> BoxFuture<'static, Result<V, ResourceError>> + Send + Sync>;
type InFlight<V> = Shared<BoxFuture<'static, Result<Arc<V>, ResourceError>>>;

/// Cached value with its freshness window.
struct CacheEntry<V> {
    value: Arc<V>,
    fetched_at: Instant,
    stale_at: Instant,
    evict_at: Option<Instant>,
    policy: QueryPolicy,
    fetcher: Fetcher<V>,
}

impl<V> CacheEntry<V> {
    fn new(value: Arc<V>, policy: QueryPolicy, fetcher: Fetcher<V>) -> Self {
        let fetched_at = Instant::now();
        let stale_at = fetched_at + policy.stale_time;
        // evict_at never precedes stale_at
        let evict_at = policy.evict_time.map(|evict| (fetched_at + evict).max(stale_at));
        Self { value, fetched_at, stale_at, evict_at, policy, fetcher }
    }

    fn is_stale(&self, now: Instant) -> bool {
        now >= self.stale_at
    }

    fn is_evicted(&self, now: Instant) -> bool {
        self.evict_at.is_some_and(|at| now >= at)
    }
}

struct Inner<V> {
    entries: RwLock<HashMap<QueryKey, CacheEntry<V>>>,
    in_flight: Mutex<HashMap<QueryKey, InFlight<V>>>,
}

/// Keyed cache with stale-while-revalidate reads and request coalescing.
pub struct QueryCache<V> {
    inner: Arc<Inner<V>>,
}

impl<V> Clone for QueryCache<V> {
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone() }
    }
}

impl<V> std::fmt::Debug for QueryCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let in_flight = self.inner.in_flight.lock().unwrap_or_else(PoisonError::into_inner).len();
        f.debug_struct("QueryCache").field("in_flight", &in_flight).finish_non_exhaustive()
    }
}

impl<V> Default for QueryCache<V> {
    fn default() -> Self {
        Self { inner: Arc::new(Inner { entries: RwLock::new(HashMap::new()), in_flight: Mutex::new(HashMap::new()) }) }
    }
}

impl<V: Send + Sync + 'static> QueryCache<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached value for `key`, fetching it with `fetcher` when
    /// absent or evicted.
    pub async fn fetch<F, Fut>(&self, key: QueryKey, policy: QueryPolicy, fetcher: F) -> Result<Arc<V>, ResourceError>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<V, ResourceError>> + Send + 'static,
    {
        self.fetch_with(key, policy, erase(fetcher)).await.map(|(value, _)| value)
    }

    /// Like [`fetch`](Self::fetch) but reports the outcome as a [`QueryState`].
    pub async fn query<F, Fut>(&self, key: QueryKey, policy: QueryPolicy, fetcher: F) -> QueryState<V>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<V, ResourceError>> + Send + 'static,
    {
        match self.fetch_with(key, policy, erase(fetcher)).await {
            Ok((value, is_stale)) => QueryState::success(value, is_stale),
            Err(error) => QueryState::failure(error),
        }
    }

    /// Run a query described by `spec`.
    ///
    /// A disabled query issues no request and reports [`QueryState::idle`].
    pub async fn use_resource<P, F, Fut>(&self, spec: &ResourceSpec<P>, params: P, fetch: F) -> QueryState<V>
    where
        P: Send + Sync + 'static,
        F: Fn(&P) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<V, ResourceError>> + Send + 'static,
    {
        if !spec.is_enabled(&params) {
            tracing::debug!(resource = spec.name, "query disabled");
            return QueryState::idle();
        }

        let key = spec.key(&params);
        self.query(key, spec.policy, move || fetch(&params)).await
    }

    /// Current state for `key` without fetching.
    pub async fn snapshot(&self, key: &QueryKey) -> QueryState<V> {
        let now = Instant::now();
        if let Some(entry) = self.inner.entries.read().await.get(key)
            && !entry.is_evicted(now)
        {
            return QueryState::success(entry.value.clone(), entry.is_stale(now));
        }

        if self.is_fetching(key) { QueryState::loading() } else { QueryState::idle() }
    }

    pub fn is_fetching(&self, key: &QueryKey) -> bool {
        self.inner
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(key)
    }

    /// Refresh stale entries whose policy reacts to `event`.
    ///
    /// Returns the number of refreshes started.
    pub async fn notify(&self, event: RefetchEvent) -> usize {
        let now = Instant::now();
        let due: Vec<(QueryKey, QueryPolicy, Fetcher<V>)> = self
            .inner
            .entries
            .read()
            .await
            .iter()
            .filter(|(_, entry)| entry.is_stale(now) && entry.policy.refetches_on(event))
            .map(|(key, entry)| (key.clone(), entry.policy, entry.fetcher.clone()))
            .collect();

        let count = due.len();
        for (key, policy, fetcher) in due {
            self.refresh_in_background(key, policy, fetcher);
        }

        tracing::debug!(?event, count, "refetch event handled");
        count
    }

    /// Drop the entry for `key`; the next read refetches.
    pub async fn invalidate(&self, key: &QueryKey) -> bool {
        self.inner.entries.write().await.remove(key).is_some()
    }

    /// Drop every entry of `resource`.
    pub async fn invalidate_resource(&self, resource: &str) -> usize {
        let mut entries = self.inner.entries.write().await;
        let before = entries.len();
        entries.retain(|key, _| key.resource() != resource);
        before - entries.len()
    }

    /// Delete entries past their eviction instant.
    ///
    /// Returns the number of deleted entries.
    pub async fn purge_evicted(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.inner.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_evicted(now));
        before - entries.len()
    }

    pub async fn clear(&self) {
        self.inner.entries.write().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.inner.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.entries.read().await.is_empty()
    }

    /// When the value for `key` was fetched, if cached.
    pub async fn fetched_at(&self, key: &QueryKey) -> Option<Instant> {
        self.inner.entries.read().await.get(key).map(|entry| entry.fetched_at)
    }

    async fn fetch_with(
        &self, key: QueryKey, policy: QueryPolicy, fetcher: Fetcher<V>,
    ) -> Result<(Arc<V>, bool), ResourceError> {
        let now = Instant::now();
        let cached = {
            let entries = self.inner.entries.read().await;
            entries
                .get(&key)
                .filter(|entry| !entry.is_evicted(now))
                .map(|entry| (entry.value.clone(), entry.is_stale(now)))
        };

        if let Some((value, is_stale)) = cached {
            tracing::debug!(key = %key, is_stale, "query cache hit");
            if is_stale && policy.refetch_on_mount {
                self.refresh_in_background(key, policy, fetcher);
            }
            return Ok((value, is_stale));
        }

        let value = self.join_or_start(key, policy, fetcher).await?;
        Ok((value, false))
    }

    fn join_or_start(&self, key: QueryKey, policy: QueryPolicy, fetcher: Fetcher<V>) -> InFlight<V> {
        let mut in_flight = self.inner.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(pending) = in_flight.get(&key) {
            tracing::debug!(key = %key, "joining in-flight query");
            return pending.clone();
        }

        tracing::debug!(key = %key, fingerprint = %key.fingerprint(), "starting query");
        let pending = self.clone().run(key.clone(), policy, fetcher).boxed().shared();
        in_flight.insert(key, pending.clone());
        pending
    }

    fn refresh_in_background(&self, key: QueryKey, policy: QueryPolicy, fetcher: Fetcher<V>) {
        let pending = self.join_or_start(key.clone(), policy, fetcher);
        tokio::spawn(async move {
            if let Err(e) = pending.await {
                tracing::warn!(key = %key, error = %e, "background refresh failed");
            }
        });
    }

    async fn run(self, key: QueryKey, policy: QueryPolicy, fetcher: Fetcher<V>) -> Result<Arc<V>, ResourceError> {
        let mut attempt = 0;
        let result = loop {
            match fetcher().await {
                Ok(value) => break Ok(Arc::new(value)),
                Err(e) if attempt < policy.retry => {
                    attempt += 1;
                    tracing::warn!(key = %key, attempt, error = %e, "query failed, retrying");
                    tokio::time::sleep(RETRY_DELAY).await;
                }
                Err(e) => break Err(e),
            }
        };

        if let Ok(value) = &result {
            let entry = CacheEntry::new(value.clone(), policy, fetcher);
            self.inner.entries.write().await.insert(key.clone(), entry);
        }

        // entry is in place before the in-flight marker goes away
        self.inner
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&key);

        result
    }
}

fn erase<V, F, Fut>(fetcher: F) -> Fetcher<V>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<V, ResourceError>> + Send + 'static,
{
    Arc::new(move || fetcher().boxed())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    const MINUTE: Duration = Duration::from_secs(60);

    fn counting(calls: &Arc<AtomicUsize>) -> impl Fn() -> BoxFuture<'static, Result<usize, ResourceError>> + Send + Sync + 'static {
        let calls = calls.clone();
        move || {
            let calls = calls.clone();
            async move {
                tokio::time::sleep(Duration::from_millis(10)).await;
                Ok(calls.fetch_add(1, Ordering::SeqCst) + 1)
            }
            .boxed()
        }
    }

    fn failing_first(calls: &Arc<AtomicUsize>, failures: usize) -> impl Fn() -> BoxFuture<'static, Result<usize, ResourceError>> + Send + Sync + 'static {
        let calls = calls.clone();
        move || {
            let calls = calls.clone();
            async move {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                if n <= failures { Err(ResourceError::new(ErrorKind::Status, "Falhou.")) } else { Ok(n) }
            }
            .boxed()
        }
    }

    async fn settle() {
        for _ in 0..20 {
            tokio::task::yield_now().await;
        }
    }

    fn swr_policy() -> QueryPolicy {
        QueryPolicy::new(15 * MINUTE).evict_after(20 * MINUTE)
    }

    #[tokio::test(start_paused = true)]
    async fn test_sequential_reads_fetch_once() {
        let cache = QueryCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let key = QueryKey::new("banks");

        let first = cache.fetch(key.clone(), swr_policy(), counting(&calls)).await.unwrap();
        let second = cache.fetch(key, swr_policy(), counting(&calls)).await.unwrap();

        assert_eq!((*first, *second), (1, 1));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_reads_coalesce() {
        let cache = QueryCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let key = QueryKey::new("banks");

        let (a, b) = tokio::join!(
            cache.fetch(key.clone(), swr_policy(), counting(&calls)),
            cache.fetch(key.clone(), swr_policy(), counting(&calls)),
        );

        assert_eq!((*a.unwrap(), *b.unwrap()), (1, 1));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!cache.is_fetching(&key));
    }

    #[tokio::test(start_paused = true)]
    async fn test_distinct_keys_fetch_separately() {
        let cache = QueryCache::new();
        let calls = Arc::new(AtomicUsize::new(0));

        cache.fetch(QueryKey::new("url").with("path", "a"), swr_policy(), counting(&calls)).await.unwrap();
        cache.fetch(QueryKey::new("url").with("path", "b"), swr_policy(), counting(&calls)).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.len().await, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_value_served_while_refreshing() {
        let cache = QueryCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let key = QueryKey::new("url");

        cache.fetch(key.clone(), swr_policy(), counting(&calls)).await.unwrap();
        tokio::time::advance(16 * MINUTE).await;

        let state = cache.query(key.clone(), swr_policy(), counting(&calls)).await;
        assert_eq!(state.data.as_deref(), Some(&1));
        assert!(state.is_stale);

        tokio::time::sleep(Duration::from_millis(50)).await;
        settle().await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        let refreshed = cache.fetch(key, swr_policy(), counting(&calls)).await.unwrap();
        assert_eq!(*refreshed, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_evicted_value_refetched_before_serving() {
        let cache = QueryCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let key = QueryKey::new("url");

        cache.fetch(key.clone(), swr_policy(), counting(&calls)).await.unwrap();
        tokio::time::advance(21 * MINUTE).await;

        let value = cache.fetch(key, swr_policy(), counting(&calls)).await.unwrap();
        assert_eq!(*value, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_evict_never_precedes_stale() {
        let cache = QueryCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let key = QueryKey::new("banks");
        let policy = QueryPolicy::new(24 * 60 * MINUTE);

        cache.fetch(key.clone(), policy, counting(&calls)).await.unwrap();
        tokio::time::advance(DEFAULT_EVICT_TIME + MINUTE).await;

        assert_eq!(cache.purge_evicted().await, 0);
        let value = cache.fetch(key, policy, counting(&calls)).await.unwrap();
        assert_eq!(*value, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_without_mount_refetch() {
        let cache = QueryCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let key = QueryKey::new("address-data");
        let policy = QueryPolicy::new(10 * MINUTE).evict_after(60 * MINUTE).no_automatic_refetch();

        cache.fetch(key.clone(), policy, counting(&calls)).await.unwrap();
        tokio::time::advance(20 * MINUTE).await;

        let value = cache.fetch(key, policy, counting(&calls)).await.unwrap();
        settle().await;
        assert_eq!(*value, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.notify(RefetchEvent::WindowFocus).await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_once_then_succeed() {
        let cache = QueryCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let policy = swr_policy().retry(1);

        let value = cache.fetch(QueryKey::new("url"), policy, failing_first(&calls, 1)).await.unwrap();

        assert_eq!(*value, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_without_retry_not_cached() {
        let cache = QueryCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let key = QueryKey::new("banks");

        let state = cache.query(key.clone(), swr_policy(), failing_first(&calls, 1)).await;
        assert!(state.is_error);
        assert_eq!(state.error.unwrap().message(), "Falhou.");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(cache.snapshot(&key).await.is_idle());

        let value = cache.fetch(key, swr_policy(), failing_first(&calls, 1)).await.unwrap();
        assert_eq!(*value, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_focus_refreshes_stale_entries() {
        let cache = QueryCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let key = QueryKey::new("url");

        cache.fetch(key.clone(), swr_policy(), counting(&calls)).await.unwrap();
        assert_eq!(cache.notify(RefetchEvent::WindowFocus).await, 0);

        tokio::time::advance(16 * MINUTE).await;
        assert_eq!(cache.notify(RefetchEvent::Reconnect).await, 1);
        tokio::time::sleep(Duration::from_millis(50)).await;
        settle().await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(!cache.snapshot(&key).await.is_stale);
    }

    #[tokio::test(start_paused = true)]
    async fn test_snapshot_reports_loading() {
        let cache: QueryCache<usize> = QueryCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let key = QueryKey::new("banks");

        let background = cache.clone();
        let fetcher = counting(&calls);
        let task_key = key.clone();
        let task = tokio::spawn(async move { background.fetch(task_key, swr_policy(), fetcher).await });
        settle().await;

        assert!(cache.snapshot(&key).await.is_loading);
        task.await.unwrap().unwrap();

        let state = cache.snapshot(&key).await;
        assert!(!state.is_loading);
        assert_eq!(state.data.as_deref(), Some(&1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_disabled_spec_issues_nothing() {
        fn has_path(path: &Option<String>) -> bool {
            path.is_some()
        }
        fn path_param(path: &Option<String>) -> Vec<(&'static str, String)> {
            path.iter().map(|p| ("path", p.clone())).collect()
        }
        let spec = ResourceSpec { name: "url", policy: swr_policy(), key_params: path_param, enabled: has_path };

        let cache = QueryCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let fetcher = counting(&calls);

        let state = cache.use_resource(&spec, None, move |_| fetcher()).await;
        assert!(state.is_idle());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(cache.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalidate_and_purge() {
        let cache = QueryCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let a = QueryKey::new("url").with("path", "a");
        let b = QueryKey::new("url").with("path", "b");

        cache.fetch(a.clone(), swr_policy(), counting(&calls)).await.unwrap();
        cache.fetch(b.clone(), swr_policy(), counting(&calls)).await.unwrap();

        assert!(cache.invalidate(&a).await);
        assert!(!cache.invalidate(&a).await);
        assert_eq!(cache.len().await, 1);

        tokio::time::advance(21 * MINUTE).await;
        assert_eq!(cache.purge_evicted().await, 1);
        assert!(cache.is_empty().await);

        cache.fetch(b, swr_policy(), counting(&calls)).await.unwrap();
        assert_eq!(cache.invalidate_resource("url").await, 1);
    }
}
