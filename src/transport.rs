//! The transport boundary.
//!
//! Everything this crate does — routing a request, running a query,
//! subscribing to events, locking a key — ultimately calls through a
//! `Transport`. The wire encoding, the portable-object serializer, and the
//! TCP/TLS plumbing are explicitly out of scope; this trait is
//! the seam at which a concrete implementation plugs those in. Tests in this
//! crate drive a fake in-memory transport (`tests/common`).

use async_trait::async_trait;
use std::time::Duration;

use crate::error::Result;
use crate::event::CacheEvent;
use crate::filter::Filter;

/// Two independent timeouts travel with every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestTimeouts {
    /// Server-side: the task is stopped after this elapses. `None` = no bound.
    pub execution: Option<Duration>,
    /// Client-side: the caller stops waiting after this elapses. `None` = no bound.
    pub request: Option<Duration>,
}

/// Identifies a named, remote cache reachable through a connected service.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RemoteCacheId {
    pub service_name: String,
    pub cache_name: String,
}

/// A subscription scope sent to the server: a specific key, a filter, or
/// global (both `None`).
#[derive(Debug, Clone)]
pub enum SubscriptionScope {
    Key(Vec<u8>),
    Filter(Filter),
    Global,
}

/// The request/response + async-event channel the core routes everything
/// through. A production implementation owns the wire codec and socket; it
/// reports connectivity loss through `Err(CacheClientError::Transport(..))`
/// from any in-flight call, and resumes delivering events to
/// `event_listener` once reconnected — the handle layer is responsible for
/// re-subscribing, the transport only needs to carry bytes.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Connect (or verify connectivity) to the named remote cache.
    async fn open_cache(&self, id: &RemoteCacheId) -> Result<()>;

    /// Fetch a single value.
    async fn get(&self, id: &RemoteCacheId, key: &[u8], timeouts: RequestTimeouts) -> Result<Option<Vec<u8>>>;

    /// Store a single value, returning the previous value if present.
    async fn put(
        &self,
        id: &RemoteCacheId,
        key: &[u8],
        value: Vec<u8>,
        timeouts: RequestTimeouts,
    ) -> Result<Option<Vec<u8>>>;

    /// Remove a single value, returning the previous value if present.
    async fn remove(&self, id: &RemoteCacheId, key: &[u8], timeouts: RequestTimeouts) -> Result<Option<Vec<u8>>>;

    /// Run a query, returning matching keys (or entries, by convention of
    /// the concrete implementation — out of scope to pin down further).
    async fn query_keys(&self, id: &RemoteCacheId, filter: &Filter, timeouts: RequestTimeouts) -> Result<Vec<Vec<u8>>>;

    /// Subscribe the given scope for event delivery; `lite` requests the
    /// server omit old/new values when possible.
    async fn subscribe(&self, id: &RemoteCacheId, scope: &SubscriptionScope, lite: bool) -> Result<()>;

    /// Remove a previously-installed subscription.
    async fn unsubscribe(&self, id: &RemoteCacheId, scope: &SubscriptionScope) -> Result<()>;

    /// Acquire a pessimistic lock on `key`. `wait` follows :
    /// `Some(Duration::ZERO)` = try-once, `None` = indefinite.
    async fn lock(&self, id: &RemoteCacheId, key: &[u8], wait: Option<Duration>) -> Result<bool>;

    /// Release a previously-acquired lock.
    async fn unlock(&self, id: &RemoteCacheId, key: &[u8]) -> Result<()>;

    /// Empty the cache without generating observable events.
    async fn truncate(&self, id: &RemoteCacheId) -> Result<()>;

    /// Instruct the server to destroy the distributed cache cluster-wide.
    async fn destroy(&self, id: &RemoteCacheId) -> Result<()>;

    /// True while the underlying connection is believed healthy.
    async fn is_running(&self) -> bool;

    /// Drain any events that arrived for `id` since the last drain and
    /// have not yet been delivered to a listener (used by the cache handle
    /// restart path, step 2 / §9 "Event delivery back-pressure").
    async fn drain_pending_events(&self, id: &RemoteCacheId) -> Vec<CacheEvent>;
}
