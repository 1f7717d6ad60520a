//! Top-level factory: `EnsureCache` /
//! `EnsureService` / `ReleaseCache` / `DestroyCache` / `Shutdown`.

use std::sync::Arc;

use dashmap::DashMap;
use futures_util::stream::{FuturesUnordered, StreamExt};
use parking_lot::Mutex;
use tracing::{info, warn};

use crate::config::CacheConfig;
use crate::context::OperationalContext;
use crate::error::{CacheClientError, ConfigError, Result};
use crate::handle::{CacheHandle, ServiceHandle};
use crate::transport::{RemoteCacheId, Transport};

/// Produces a transport for a named service. A real deployment plugs in
/// whatever concrete transport (TCP, in-process, test double) backs that
/// service name; this crate only needs the seam.
pub trait TransportFactory: Send + Sync {
    fn create(&self, service_name: &str) -> Arc<dyn Transport>;
}

/// Buffers log lines emitted before a `tracing` subscriber is installed so
/// startup diagnostics from `ensure_cache` calls made during process
/// bootstrap are not silently dropped, replayed once logging comes up.
#[derive(Default)]
struct PendingLogQueue {
    messages: Mutex<Vec<String>>,
    replayed: Mutex<bool>,
}

impl PendingLogQueue {
    fn push(&self, message: String) {
        if *self.replayed.lock() {
            info!("{message}");
        } else {
            self.messages.lock().push(message);
        }
    }

    fn replay(&self) {
        let mut replayed = self.replayed.lock();
        if *replayed {
            return;
        }
        for message in self.messages.lock().drain(..) {
            info!("{message}");
        }
        *replayed = true;
    }
}

/// Owns every service and cache handle this process has ensured. Cache and
/// service handles are singletons keyed by name: a second `ensure_cache`
/// for the same name returns the existing handle; a second `ensure_service`
/// for a name already backing a different scheme shuts the previous
/// service down before installing the replacement.
pub struct CacheClientFactory {
    config: CacheConfig,
    operational_context: OperationalContext,
    transport_factory: Arc<dyn TransportFactory>,
    services: DashMap<String, Arc<ServiceHandle>>,
    /// Keyed by `(cache-name, principal)`: two principals never share a
    /// handle when principal scoping is enabled.
    caches: DashMap<(String, Option<String>), Arc<CacheHandle>>,
    /// Serializes `ensure_cache`'s check-then-create section across an
    /// `.await` boundary, which `DashMap::entry` can't do on its own:
    /// without it, two concurrent calls for the same key could each open
    /// a cache and only one handle would end up reachable from this
    /// factory's registry.
    cache_creation: tokio::sync::Mutex<()>,
    pending_log: PendingLogQueue,
}

impl CacheClientFactory {
    #[must_use]
    pub fn new(config: CacheConfig, operational_context: OperationalContext, transport_factory: Arc<dyn TransportFactory>) -> Self {
        Self {
            config,
            operational_context,
            transport_factory,
            services: DashMap::new(),
            caches: DashMap::new(),
            cache_creation: tokio::sync::Mutex::new(()),
            pending_log: PendingLogQueue::default(),
        }
    }

    /// Marks log startup as complete, flushing anything buffered before
    /// this call.
    pub fn mark_logging_ready(&self) {
        self.pending_log.replay();
    }

    /// Get-or-create the named service's handle. `entry`'s closure runs
    /// under the shard lock, so two concurrent calls for the same name
    /// can't both win the create race the way a separate get-then-insert
    /// could.
    pub fn ensure_service(&self, service_name: &str) -> Arc<ServiceHandle> {
        if let Some(existing) = self.services.get(service_name) {
            return Arc::clone(existing.value());
        }
        Arc::clone(
            self.services
                .entry(service_name.to_string())
                .or_insert_with(|| {
                    self.pending_log.push(format!("ensuring service '{service_name}'"));
                    let transport = self.transport_factory.create(service_name);
                    Arc::new(ServiceHandle::new(service_name, transport))
                })
                .value(),
        )
    }

    /// Resolve `cache_name` through the configuration and return its (possibly
    /// freshly-created) handle, scoped to `principal` when principal
    /// scoping is enabled on this factory's operational context. Two
    /// different principals never share a handle in that case; with
    /// scoping disabled every caller shares the one handle for a name.
    ///
    /// # Errors
    /// Propagates [`ConfigError`] from mapping/scheme resolution.
    pub async fn ensure_cache(&self, cache_name: &str, principal: Option<&str>) -> Result<Arc<CacheHandle>> {
        let principal = self.scoped_principal(principal);
        let key = (cache_name.to_string(), principal.clone());
        if let Some(existing) = self.caches.get(&key) {
            return Ok(Arc::clone(existing.value()));
        }

        // `DashMap::entry` can't be held across the `open_cache` await
        // below, so the check-then-create section is serialized through
        // this mutex instead: only one caller actually creates a handle
        // for a given key, everyone else observes it in the re-check.
        let _guard = self.cache_creation.lock().await;
        if let Some(existing) = self.caches.get(&key) {
            return Ok(Arc::clone(existing.value()));
        }

        let (_matched, scheme) = self.config.resolve_cache(cache_name)?;
        let service_name = scheme
            .child("service-name")
            .map(|el| el.text().to_string())
            .ok_or_else(|| CacheClientError::Config(ConfigError::NoMapping(cache_name.to_string())))?;

        let service = self.ensure_service(&service_name);
        let id = RemoteCacheId { service_name, cache_name: cache_name.to_string() };
        service.transport().open_cache(&id).await?;

        let handle = Arc::new(CacheHandle::new(id, service, principal));
        self.caches.insert(key, Arc::clone(&handle));
        Ok(handle)
    }

    /// Normalizes a caller-supplied principal against
    /// `principal_scoping_enabled`: scoping disabled means every caller
    /// shares one handle per cache name, regardless of what it passes.
    fn scoped_principal(&self, principal: Option<&str>) -> Option<String> {
        if self.operational_context.principal_scoping_enabled {
            principal.map(str::to_string)
        } else {
            None
        }
    }

    /// Release a cache handle, leaving the underlying service running for
    /// other caches that share it.
    pub async fn release_cache(&self, cache_name: &str, principal: Option<&str>) -> Result<()> {
        let principal = self.scoped_principal(principal);
        if let Some((_, handle)) = self.caches.remove(&(cache_name.to_string(), principal)) {
            handle.release().await?;
        }
        Ok(())
    }

    /// Destroy a cache cluster-wide and drop this process's handle to it.
    pub async fn destroy_cache(&self, cache_name: &str, principal: Option<&str>) -> Result<()> {
        let principal = self.scoped_principal(principal);
        if let Some((_, handle)) = self.caches.remove(&(cache_name.to_string(), principal)) {
            handle.destroy().await?;
        }
        Ok(())
    }

    /// Drain and dispatch pending events for every ensured cache
    /// concurrently, the way a background poll tick would. Caches are
    /// independent of each other, so this fans out instead of awaiting
    /// each cache's drain one at a time.
    pub async fn drain_all_events(&self) {
        let mut pending: FuturesUnordered<_> = self.caches.iter().map(|entry| {
            let handle = Arc::clone(entry.value());
            async move { handle.drain_pending_events().await }
        }).collect();
        while pending.next().await.is_some() {}
    }

    /// Release every cache handle and stop every service this factory owns.
    pub async fn shutdown(&self) {
        for entry in self.caches.iter() {
            if let Err(err) = entry.value().release().await {
                warn!(cache = %entry.key().0, error = %err, "error releasing cache during shutdown");
            }
        }
        self.caches.clear();

        for entry in self.services.iter() {
            entry.value().stop().await;
        }
        self.services.clear();
    }
}
