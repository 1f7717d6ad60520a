//! Benchmarks for event dispatch: how registry size and bucket kind affect
//! the cost of routing one event to its listeners.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use coherent_cache_client::event::types::EventKind;
use coherent_cache_client::event::{CacheEvent, Listener, ListenerRegistry, ListenerWeight};
use coherent_cache_client::filter::Value;

struct NoopListener(Arc<AtomicUsize>);
impl Listener for NoopListener {
    fn on_event(&self, _event: &CacheEvent) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }
}

fn populated_registry(key_listeners: usize, global_listeners: usize) -> (ListenerRegistry, Arc<AtomicUsize>) {
    let registry = ListenerRegistry::new();
    let counter = Arc::new(AtomicUsize::new(0));
    for i in 0..key_listeners {
        registry.register_key(Value::Int(i as i64), Arc::new(NoopListener(counter.clone())), ListenerWeight::Standard, false);
    }
    for _ in 0..global_listeners {
        registry.register_global(Arc::new(NoopListener(counter.clone())), ListenerWeight::Standard, false);
    }
    (registry, counter)
}

fn bench_dispatch_with_global_listeners(c: &mut Criterion) {
    let (registry, _counter) = populated_registry(0, 50);
    let event = CacheEvent {
        cache_name: "bench".into(),
        key: Value::Int(1),
        old_value: None,
        new_value: Some(Value::Int(1)),
        kind: EventKind::Inserted,
        synthetic: false,
    };
    c.bench_function("dispatch_50_global_listeners", |b| {
        b.iter(|| black_box(registry.dispatch(&event)));
    });
}

fn bench_dispatch_with_key_listeners(c: &mut Criterion) {
    let (registry, _counter) = populated_registry(1000, 0);
    let event = CacheEvent {
        cache_name: "bench".into(),
        key: Value::Int(500),
        old_value: None,
        new_value: Some(Value::Int(1)),
        kind: EventKind::Inserted,
        synthetic: false,
    };
    c.bench_function("dispatch_1000_key_buckets", |b| {
        b.iter(|| black_box(registry.dispatch(&event)));
    });
}

criterion_group!(benches, bench_dispatch_with_global_listeners, bench_dispatch_with_key_listeners);
criterion_main!(benches);
