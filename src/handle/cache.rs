//! Cache handle.
//!
//! A handle's own state and its backing service's state are locked in a
//! fixed order — service first, then cache — matching the usual
//! convention of acquiring the broader-scoped lock before the narrower one
//! to avoid lock-order inversion across concurrently restarting handles.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex as SyncMutex;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{CacheClientError, InvalidArgumentError, InvalidStateError, Result};
use crate::event::{CacheEvent, EventKind, Listener, ListenerId, ListenerRegistry, ListenerWeight};
use crate::filter::entry_processor::EntryProcessor;
use crate::filter::trigger::{MapTrigger, TriggerAction};
use crate::filter::value::Value;
use crate::filter::{Entry, Filter};
use crate::handle::service::ServiceHandle;
use crate::handle::state::CacheState;
use crate::transport::{RemoteCacheId, RequestTimeouts};

pub struct CacheHandle {
    pub id: RemoteCacheId,
    service: Arc<ServiceHandle>,
    state: Mutex<CacheState>,
    registry: ListenerRegistry,
    /// The principal this handle was created for — the per-service handle
    /// registry is keyed by `(cache-name, principal)`, so a handle is
    /// scoped to exactly one principal for its whole lifetime.
    configured_principal: Option<String>,
    /// Remembered the first time this handle is used: later calls run
    /// under the principal that created the handle, not whatever ambient
    /// principal happens to be active.
    principal: Mutex<Option<String>>,
    restart_epoch_seen: AtomicU64,
    triggers: SyncMutex<Vec<MapTrigger>>,
}

impl CacheHandle {
    #[must_use]
    pub fn new(id: RemoteCacheId, service: Arc<ServiceHandle>, configured_principal: Option<String>) -> Self {
        Self {
            id,
            service,
            state: Mutex::new(CacheState::Configured),
            registry: ListenerRegistry::new(),
            configured_principal,
            principal: Mutex::new(None),
            restart_epoch_seen: AtomicU64::new(0),
            triggers: SyncMutex::new(Vec::new()),
        }
    }

    /// Register a trigger that every `put`/`invoke` on this handle consults
    /// before committing. Triggers run in registration order; the first one
    /// to report anything other than `Proceed` decides the outcome.
    pub fn add_trigger(&self, trigger: MapTrigger) {
        self.triggers.lock().push(trigger);
    }

    fn evaluate_triggers(&self, key: &Value, old: Option<&Value>, new: Option<&Value>) -> TriggerAction {
        for trigger in self.triggers.lock().iter() {
            match trigger.evaluate(key, old, new) {
                TriggerAction::Proceed => continue,
                other => return other,
            }
        }
        TriggerAction::Proceed
    }

    async fn ensure_usable(&self, principal: Option<&str>) -> Result<()> {
        self.service.ensure_running().await?;

        let mut state = self.state.lock().await;
        if state.is_terminal() {
            return Err(terminal_error(&self.id.cache_name, *state));
        }
        if *state == CacheState::Configured {
            *state = CacheState::Running;
        }

        let mut remembered = self.principal.lock().await;
        match (&*remembered, principal) {
            (None, Some(p)) => *remembered = Some(p.to_string()),
            _ => {}
        }

        let current_epoch = self.service.restart_epoch();
        if self.restart_epoch_seen.swap(current_epoch, Ordering::Relaxed) != current_epoch {
            debug!(cache = %self.id.cache_name, "service restarted since last use, draining buffered events");
            crate::event::drain_and_dispatch(self.service.transport().as_ref(), &self.id, &self.registry).await;
        }

        Ok(())
    }

    pub async fn get(&self, key: &Value) -> Result<Option<Value>> {
        self.ensure_usable(self.configured_principal.as_deref()).await?;
        let raw = self.service.transport().get(&self.id, &encode(key)?, RequestTimeouts::default()).await?;
        raw.map(|bytes| decode(&bytes)).transpose()
    }

    /// Store `value` under `key`, consulting every registered trigger first.
    /// A trigger that reports `Rollback` turns this into a
    /// `TriggerRejected` error with the cache left unchanged; `Ignore`
    /// silently drops the mutation; `Remove` deletes the key instead and
    /// dispatches a synthetic `Deleted` event in place of the write.
    pub async fn put(&self, key: Value, value: Value) -> Result<Option<Value>> {
        self.ensure_usable(self.configured_principal.as_deref()).await?;

        let old = if self.triggers.lock().is_empty() { None } else { self.get(&key).await? };

        match self.evaluate_triggers(&key, old.as_ref(), Some(&value)) {
            TriggerAction::Rollback => {
                return Err(CacheClientError::TriggerRejected {
                    key: format!("{key:?}"),
                    reason: "rejected by a registered map trigger".to_string(),
                });
            }
            TriggerAction::Ignore => return Ok(old),
            TriggerAction::Remove => {
                self.service.transport().remove(&self.id, &encode(&key)?, RequestTimeouts::default()).await?;
                self.dispatch_local(&CacheEvent {
                    cache_name: self.id.cache_name.clone(),
                    key,
                    old_value: old.clone(),
                    new_value: None,
                    kind: EventKind::Deleted,
                    synthetic: true,
                });
                return Ok(old);
            }
            TriggerAction::Proceed => {}
        }

        let raw = self
            .service
            .transport()
            .put(&self.id, &encode(&key)?, encode(&value)?, RequestTimeouts::default())
            .await?;
        raw.map(|bytes| decode(&bytes)).transpose()
    }

    pub async fn remove(&self, key: &Value) -> Result<Option<Value>> {
        self.ensure_usable(self.configured_principal.as_deref()).await?;
        let raw = self.service.transport().remove(&self.id, &encode(key)?, RequestTimeouts::default()).await?;
        raw.map(|bytes| decode(&bytes)).transpose()
    }

    pub async fn query_keys(&self, filter: &Filter) -> Result<Vec<Value>> {
        self.ensure_usable(self.configured_principal.as_deref()).await?;
        let raw = self.service.transport().query_keys(&self.id, filter, RequestTimeouts::default()).await?;
        raw.iter().map(|bytes| decode(bytes)).collect()
    }

    pub async fn lock(&self, key: &Value, wait: Option<std::time::Duration>) -> Result<bool> {
        self.ensure_usable(self.configured_principal.as_deref()).await?;
        self.service.transport().lock(&self.id, &encode(key)?, wait).await
    }

    pub async fn unlock(&self, key: &Value) -> Result<()> {
        self.ensure_usable(self.configured_principal.as_deref()).await?;
        self.service.transport().unlock(&self.id, &encode(key)?).await
    }

    pub async fn truncate(&self) -> Result<()> {
        self.ensure_usable(self.configured_principal.as_deref()).await?;
        self.service.transport().truncate(&self.id).await
    }

    /// Run an entry processor against one key, read-modify-write: fetch the
    /// current value, apply the processor, store the result if it changed
    /// the entry, and return whatever the processor reports. Real
    /// server-side invocation (so the mutation is atomic from other
    /// clients' perspective) is out of scope — this crate only owns the
    /// processor's shape, not a distributed execution guarantee for it.
    /// Goes through `put`, so registered triggers apply here too.
    pub async fn invoke(&self, key: &Value, processor: &dyn EntryProcessor) -> Result<Value> {
        self.ensure_usable(self.configured_principal.as_deref()).await?;
        let current = self.get(key).await?.unwrap_or(Value::Null);
        let mut entry = Entry { key: key.clone(), value: current };
        let report = processor.process(&mut entry);
        self.put(key.clone(), entry.value).await?;
        Ok(report)
    }

    pub async fn add_key_listener(&self, key: Value, listener: Arc<dyn Listener>, weight: ListenerWeight) -> Result<ListenerId> {
        self.ensure_usable(self.configured_principal.as_deref()).await?;
        crate::event::subscribe_key(&self.registry, self.service.transport().as_ref(), &self.id, key, listener, weight).await
    }

    pub async fn add_filter_listener(&self, filter: Filter, listener: Arc<dyn Listener>, weight: ListenerWeight) -> Result<ListenerId> {
        self.ensure_usable(self.configured_principal.as_deref()).await?;
        crate::event::subscribe_filter(&self.registry, self.service.transport().as_ref(), &self.id, filter, listener, weight).await
    }

    pub async fn add_global_listener(&self, listener: Arc<dyn Listener>, weight: ListenerWeight) -> Result<ListenerId> {
        self.ensure_usable(self.configured_principal.as_deref()).await?;
        crate::event::subscribe_global(&self.registry, self.service.transport().as_ref(), &self.id, listener, weight).await
    }

    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.registry.unregister(id)
    }

    pub fn dispatch_local(&self, event: &CacheEvent) {
        self.registry.dispatch(event);
    }

    /// Pull and dispatch whatever the transport is holding for this cache
    /// right now, independent of the restart-triggered drain in
    /// `ensure_usable` (used by the factory's periodic event pump).
    pub async fn drain_pending_events(&self) {
        crate::event::drain_and_dispatch(self.service.transport().as_ref(), &self.id, &self.registry).await;
    }

    pub async fn release(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        if state.is_terminal() {
            return Err(terminal_error(&self.id.cache_name, *state));
        }
        *state = CacheState::Released;
        Ok(())
    }

    pub async fn destroy(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        if *state == CacheState::Destroyed {
            return Err(CacheClientError::InvalidState(InvalidStateError::CacheDestroyed(self.id.cache_name.clone())));
        }
        self.service.transport().destroy(&self.id).await?;
        *state = CacheState::Destroyed;
        Ok(())
    }

    pub async fn unlock_checked(&self, key: &Value, held_by_caller: bool) -> Result<()> {
        if !held_by_caller {
            return Err(CacheClientError::InvalidArgument(InvalidArgumentError::UnlockNonHolder));
        }
        self.unlock(key).await
    }
}

fn terminal_error(name: &str, state: CacheState) -> CacheClientError {
    match state {
        CacheState::Destroyed => CacheClientError::InvalidState(InvalidStateError::CacheDestroyed(name.to_string())),
        _ => CacheClientError::InvalidState(InvalidStateError::CacheReleased(name.to_string())),
    }
}

fn encode(value: &Value) -> Result<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| CacheClientError::Serialization(e.to_string()))
}

fn decode(bytes: &[u8]) -> Result<Value> {
    serde_json::from_slice(bytes).map_err(|e| CacheClientError::Serialization(e.to_string()))
}
