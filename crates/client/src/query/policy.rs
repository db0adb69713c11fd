//! Freshness and eviction rules for cached queries.

use std::time::Duration;

use super::QueryKey;

/// Eviction window used when a resource does not set its own.
pub const DEFAULT_EVICT_TIME: Duration = Duration::from_secs(5 * 60);

/// Wait between a failed attempt and its retry.
pub const RETRY_DELAY: Duration = Duration::from_secs(1);

/// Caching rules for one resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryPolicy {
    /// How long a fetched value is served without a refresh.
    pub stale_time: Duration,
    /// How long after fetching a value may still be served at all.
    /// `None` keeps it until invalidated.
    pub evict_time: Option<Duration>,
    /// Extra attempts after a failed fetch.
    pub retry: u32,
    /// Refresh a stale value when a new consumer reads it.
    pub refetch_on_mount: bool,
    /// Refresh stale values when the window regains focus.
    pub refetch_on_focus: bool,
    /// Refresh stale values when connectivity returns.
    pub refetch_on_reconnect: bool,
}

impl QueryPolicy {
    pub const fn new(stale_time: Duration) -> Self {
        Self {
            stale_time,
            evict_time: Some(DEFAULT_EVICT_TIME),
            retry: 0,
            refetch_on_mount: true,
            refetch_on_focus: true,
            refetch_on_reconnect: true,
        }
    }

    pub const fn evict_after(mut self, evict_time: Duration) -> Self {
        self.evict_time = Some(evict_time);
        self
    }

    pub const fn never_evict(mut self) -> Self {
        self.evict_time = None;
        self
    }

    pub const fn retry(mut self, retry: u32) -> Self {
        self.retry = retry;
        self
    }

    /// Disable refetching on mount, focus and reconnect.
    pub const fn no_automatic_refetch(mut self) -> Self {
        self.refetch_on_mount = false;
        self.refetch_on_focus = false;
        self.refetch_on_reconnect = false;
        self
    }

    /// Whether `event` should refresh a stale value under this policy.
    pub fn refetches_on(&self, event: RefetchEvent) -> bool {
        match event {
            RefetchEvent::WindowFocus => self.refetch_on_focus,
            RefetchEvent::Reconnect => self.refetch_on_reconnect,
        }
    }
}

impl Default for QueryPolicy {
    fn default() -> Self {
        Self::new(Duration::ZERO)
    }
}

/// Environment events that may refresh stale entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefetchEvent {
    WindowFocus,
    Reconnect,
}

/// Declarative description of a cached resource: its name, caching policy,
/// how its parameters form a key, and when it may run at all.
#[derive(Debug)]
pub struct ResourceSpec<P> {
    pub name: &'static str,
    pub policy: QueryPolicy,
    pub key_params: fn(&P) -> Vec<(&'static str, String)>,
    pub enabled: fn(&P) -> bool,
}

impl<P> ResourceSpec<P> {
    pub fn key(&self, params: &P) -> QueryKey {
        (self.key_params)(params)
            .into_iter()
            .fold(QueryKey::new(self.name), |key, (name, value)| key.with(name, value))
    }

    pub fn is_enabled(&self, params: &P) -> bool {
        (self.enabled)(params)
    }
}

/// Enabled predicate for resources that always run.
pub fn always<P>(_params: &P) -> bool {
    true
}

/// Key builder for resources without parameters.
pub fn no_params<P>(_params: &P) -> Vec<(&'static str, String)> {
    Vec::new()
}
