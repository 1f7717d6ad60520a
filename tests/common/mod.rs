//! Shared test infrastructure: an in-memory fake transport standing in for
//! a real wire connection, so handle/factory/event-engine behavior can be
//! exercised without a server.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use coherent_cache_client::event::{CacheEvent, EventKind};
use coherent_cache_client::filter::Filter;
use coherent_cache_client::transport::{RemoteCacheId, RequestTimeouts, SubscriptionScope, Transport};
use dashmap::DashMap;
use tokio::sync::Mutex;

#[derive(Default)]
pub struct FakeTransport {
    store: DashMap<(String, String), Vec<u8>>,
    running: AtomicBool,
    pending_events: Mutex<Vec<(RemoteCacheId, CacheEvent)>>,
    pub subscribe_calls: std::sync::atomic::AtomicUsize,
    pub fail_next_subscribe: AtomicBool,
}

impl FakeTransport {
    #[must_use]
    pub fn new() -> Arc<Self> {
        let transport = Self::default();
        transport.running.store(true, Ordering::SeqCst);
        Arc::new(transport)
    }

    pub fn set_running(&self, running: bool) {
        self.running.store(running, Ordering::SeqCst);
    }

    pub async fn push_event(&self, id: &RemoteCacheId, event: CacheEvent) {
        self.pending_events.lock().await.push((id.clone(), event));
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn open_cache(&self, _id: &RemoteCacheId) -> coherent_cache_client::error::Result<()> {
        Ok(())
    }

    async fn get(&self, id: &RemoteCacheId, key: &[u8], _timeouts: RequestTimeouts) -> coherent_cache_client::error::Result<Option<Vec<u8>>> {
        Ok(self.store.get(&(id.cache_name.clone(), String::from_utf8_lossy(key).to_string())).map(|v| v.clone()))
    }

    async fn put(
        &self,
        id: &RemoteCacheId,
        key: &[u8],
        value: Vec<u8>,
        _timeouts: RequestTimeouts,
    ) -> coherent_cache_client::error::Result<Option<Vec<u8>>> {
        let map_key = (id.cache_name.clone(), String::from_utf8_lossy(key).to_string());
        Ok(self.store.insert(map_key, value))
    }

    async fn remove(&self, id: &RemoteCacheId, key: &[u8], _timeouts: RequestTimeouts) -> coherent_cache_client::error::Result<Option<Vec<u8>>> {
        Ok(self.store.remove(&(id.cache_name.clone(), String::from_utf8_lossy(key).to_string())).map(|(_, v)| v))
    }

    async fn query_keys(&self, id: &RemoteCacheId, _filter: &Filter, _timeouts: RequestTimeouts) -> coherent_cache_client::error::Result<Vec<Vec<u8>>> {
        Ok(self
            .store
            .iter()
            .filter(|entry| entry.key().0 == id.cache_name)
            .map(|entry| entry.key().1.clone().into_bytes())
            .collect())
    }

    async fn subscribe(&self, _id: &RemoteCacheId, _scope: &SubscriptionScope, _lite: bool) -> coherent_cache_client::error::Result<()> {
        self.subscribe_calls.fetch_add(1, Ordering::Relaxed);
        if self.fail_next_subscribe.swap(false, Ordering::SeqCst) {
            return Err(coherent_cache_client::error::CacheClientError::Transport("injected failure".into()));
        }
        Ok(())
    }

    async fn unsubscribe(&self, _id: &RemoteCacheId, _scope: &SubscriptionScope) -> coherent_cache_client::error::Result<()> {
        Ok(())
    }

    async fn lock(&self, _id: &RemoteCacheId, _key: &[u8], _wait: Option<Duration>) -> coherent_cache_client::error::Result<bool> {
        Ok(true)
    }

    async fn unlock(&self, _id: &RemoteCacheId, _key: &[u8]) -> coherent_cache_client::error::Result<()> {
        Ok(())
    }

    async fn truncate(&self, id: &RemoteCacheId) -> coherent_cache_client::error::Result<()> {
        self.store.retain(|k, _| k.0 != id.cache_name);
        Ok(())
    }

    async fn destroy(&self, id: &RemoteCacheId) -> coherent_cache_client::error::Result<()> {
        self.store.retain(|k, _| k.0 != id.cache_name);
        Ok(())
    }

    async fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    async fn drain_pending_events(&self, id: &RemoteCacheId) -> Vec<CacheEvent> {
        let mut pending = self.pending_events.lock().await;
        let (matching, rest): (Vec<_>, Vec<_>) = pending.drain(..).partition(|(event_id, _)| event_id == id);
        *pending = rest;
        matching.into_iter().map(|(_, event)| event).collect()
    }
}

pub fn sample_event(key: coherent_cache_client::filter::Value, cache_name: &str) -> CacheEvent {
    CacheEvent {
        cache_name: cache_name.to_string(),
        key,
        old_value: None,
        new_value: Some(coherent_cache_client::filter::Value::Int(1)),
        kind: EventKind::Inserted,
        synthetic: false,
    }
}
