//! Listener registry.
//!
//! Three independent buckets — keyed, filtered, and global — each holding
//! registrations in the order they arrived, mirroring the usual
//! `DashMap`-backed registry shape used for in-flight request tracking.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;

use crate::event::listener::{Listener, ListenerId, ListenerWeight};
use crate::event::types::CacheEvent;
use crate::filter::value::Value;
use crate::filter::Filter;

struct Registration {
    id: ListenerId,
    weight: ListenerWeight,
    listener: Arc<dyn Listener>,
    /// Trigger/synchronous listeners bypass the normal dispatch ordering
    /// and run inline before async listeners.
    synchronous: bool,
}

/// Tracks every live subscription for one cache, split by how it was
/// addressed. `subscribe`/`unsubscribe` counts must stay balanced per
/// bucket — the caller (the cache handle) is responsible for rolling back
/// a registration if the paired transport call fails.
#[derive(Default)]
pub struct ListenerRegistry {
    by_key: DashMap<Value, Vec<Registration>>,
    by_filter: DashMap<Filter, Vec<Registration>>,
    global: Mutex<Vec<Registration>>,
    next_id: AtomicU64,
}

impl ListenerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&self) -> ListenerId {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    pub fn register_key(&self, key: Value, listener: Arc<dyn Listener>, weight: ListenerWeight, synchronous: bool) -> ListenerId {
        let id = self.allocate_id();
        self.by_key.entry(key).or_default().push(Registration { id, weight, listener, synchronous });
        id
    }

    pub fn register_filter(&self, filter: Filter, listener: Arc<dyn Listener>, weight: ListenerWeight, synchronous: bool) -> ListenerId {
        let id = self.allocate_id();
        self.by_filter.entry(filter).or_default().push(Registration { id, weight, listener, synchronous });
        id
    }

    pub fn register_global(&self, listener: Arc<dyn Listener>, weight: ListenerWeight, synchronous: bool) -> ListenerId {
        let id = self.allocate_id();
        self.global.lock().push(Registration { id, weight, listener, synchronous });
        id
    }

    pub fn unregister(&self, id: ListenerId) -> bool {
        let mut found = false;
        self.by_key.retain(|_, regs| {
            regs.retain(|r| {
                let keep = r.id != id;
                found |= !keep;
                keep
            });
            !regs.is_empty()
        });
        self.by_filter.retain(|_, regs| {
            regs.retain(|r| {
                let keep = r.id != id;
                found |= !keep;
                keep
            });
            !regs.is_empty()
        });
        self.global.lock().retain(|r| {
            let keep = r.id != id;
            found |= !keep;
            keep
        });
        found
    }

    pub fn key_subscription_count(&self) -> usize {
        self.by_key.len()
    }

    pub fn filter_subscription_count(&self) -> usize {
        self.by_filter.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty() && self.by_filter.is_empty() && self.global.lock().is_empty()
    }

    /// Dispatch an event to every matching registration, synchronous
    /// listeners first, then standard/lite listeners in registration
    /// order within each bucket. Each listener's panic-free error surface
    /// is isolated: a `Listener` that wants to report a failure logs it
    /// itself, dispatch never aborts partway through a bucket.
    pub fn dispatch(&self, event: &CacheEvent) {
        let mut recipients: Vec<(ListenerWeight, bool, Arc<dyn Listener>)> = Vec::new();

        if let Some(regs) = self.by_key.get(&event.key) {
            recipients.extend(regs.value().iter().map(|r| (r.weight, r.synchronous, r.listener.clone())));
        }
        for entry in &self.by_filter {
            if filter_matches(entry.key(), event) {
                recipients.extend(entry.value().iter().map(|r| (r.weight, r.synchronous, r.listener.clone())));
            }
        }
        {
            let global = self.global.lock();
            recipients.extend(global.iter().map(|r| (r.weight, r.synchronous, r.listener.clone())));
        }

        recipients.sort_by_key(|r| !r.1);

        for (weight, _synchronous, listener) in recipients {
            let payload = match weight {
                ListenerWeight::Standard => event.clone(),
                ListenerWeight::Lite => event.as_lite(),
            };
            listener.on_event(&payload);
        }
    }
}

fn filter_matches(filter: &Filter, event: &CacheEvent) -> bool {
    if let Filter::Event(event_filter) = filter {
        return event_filter.matches(&event.key, event.old_value.as_ref(), event.new_value.as_ref(), event.synthetic);
    }
    let probe_value = event.new_value.clone().or_else(|| event.old_value.clone()).unwrap_or(crate::filter::value::Value::Null);
    filter.evaluate(&crate::filter::Entry { key: event.key.clone(), value: probe_value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::types::EventKind;
    use std::sync::atomic::AtomicUsize;

    struct CountingListener(Arc<AtomicUsize>);
    impl Listener for CountingListener {
        fn on_event(&self, _event: &CacheEvent) {
            self.0.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[test]
    fn key_listener_only_fires_for_its_key() {
        let registry = ListenerRegistry::new();
        let count = Arc::new(AtomicUsize::new(0));
        registry.register_key(Value::Str("a".into()), Arc::new(CountingListener(count.clone())), ListenerWeight::Standard, false);

        let event = CacheEvent {
            cache_name: "c".into(),
            key: Value::Str("b".into()),
            old_value: None,
            new_value: Some(Value::Int(1)),
            kind: EventKind::Inserted,
            synthetic: false,
        };
        registry.dispatch(&event);
        assert_eq!(count.load(Ordering::Relaxed), 0);

        let event = CacheEvent { key: Value::Str("a".into()), ..event };
        registry.dispatch(&event);
        assert_eq!(count.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn unregister_balances_registration() {
        let registry = ListenerRegistry::new();
        let count = Arc::new(AtomicUsize::new(0));
        let id = registry.register_global(Arc::new(CountingListener(count.clone())), ListenerWeight::Standard, false);
        assert!(registry.unregister(id));
        assert!(registry.is_empty());
    }
}
