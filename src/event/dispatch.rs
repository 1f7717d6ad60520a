//! Subscription lifecycle helpers.

use std::sync::Arc;

use crate::error::Result;
use crate::event::listener::{Listener, ListenerId, ListenerWeight};
use crate::event::registry::ListenerRegistry;
use crate::filter::value::Value;
use crate::filter::Filter;
use crate::transport::{RemoteCacheId, SubscriptionScope, Transport};

/// Register a listener locally, then ask the transport to start the
/// subscription. If the transport call fails, the local registration is
/// rolled back so the registry never believes it has a subscription the
/// transport doesn't — the core "subscribe/unsubscribe arithmetic" must
/// stay balanced across failures, not just the happy path.
pub async fn subscribe_key(
    registry: &ListenerRegistry,
    transport: &dyn Transport,
    cache_id: &RemoteCacheId,
    key: Value,
    listener: Arc<dyn Listener>,
    weight: ListenerWeight,
) -> Result<ListenerId> {
    let id = registry.register_key(key.clone(), listener, weight, false);
    let lite = weight == ListenerWeight::Lite;
    if let Err(err) = transport.subscribe(cache_id, &SubscriptionScope::Key(encode_key(&key)), lite).await {
        registry.unregister(id);
        return Err(err);
    }
    Ok(id)
}

pub async fn subscribe_filter(
    registry: &ListenerRegistry,
    transport: &dyn Transport,
    cache_id: &RemoteCacheId,
    filter: Filter,
    listener: Arc<dyn Listener>,
    weight: ListenerWeight,
) -> Result<ListenerId> {
    let id = registry.register_filter(filter.clone(), listener, weight, false);
    let lite = weight == ListenerWeight::Lite;
    if let Err(err) = transport.subscribe(cache_id, &SubscriptionScope::Filter(filter), lite).await {
        registry.unregister(id);
        return Err(err);
    }
    Ok(id)
}

pub async fn subscribe_global(
    registry: &ListenerRegistry,
    transport: &dyn Transport,
    cache_id: &RemoteCacheId,
    listener: Arc<dyn Listener>,
    weight: ListenerWeight,
) -> Result<ListenerId> {
    let id = registry.register_global(listener, weight, false);
    let lite = weight == ListenerWeight::Lite;
    if let Err(err) = transport.subscribe(cache_id, &SubscriptionScope::Global, lite).await {
        registry.unregister(id);
        return Err(err);
    }
    Ok(id)
}

/// Serialize a key the way the transport boundary expects (out of scope to
/// implement for real; this stands in for the portable-object encoding).
fn encode_key(key: &Value) -> Vec<u8> {
    serde_json::to_vec(key).unwrap_or_default()
}

/// Drain and dispatch whatever events the transport is holding for one
/// cache. Called after a service restart to replay anything buffered while
/// the connection was down, and on a normal poll tick otherwise.
pub async fn drain_and_dispatch(transport: &dyn Transport, cache_id: &RemoteCacheId, registry: &ListenerRegistry) {
    for event in transport.drain_pending_events(cache_id).await {
        registry.dispatch(&event);
    }
}
