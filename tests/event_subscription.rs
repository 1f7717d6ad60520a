mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use coherent_cache_client::config::{CacheConfig, CacheMapping, ConfigElement, ConfigResolver, MappingTable};
use coherent_cache_client::context::OperationalContext;
use coherent_cache_client::event::{Listener, ListenerWeight};
use coherent_cache_client::factory::{CacheClientFactory, TransportFactory};
use coherent_cache_client::filter::Value;
use coherent_cache_client::transport::Transport;
use common::{sample_event, FakeTransport};

struct SharedTransportFactory {
    transport: Arc<FakeTransport>,
}

impl TransportFactory for SharedTransportFactory {
    fn create(&self, _service_name: &str) -> Arc<dyn Transport> {
        self.transport.clone()
    }
}

struct CountingListener(Arc<AtomicUsize>);
impl Listener for CountingListener {
    fn on_event(&self, _event: &coherent_cache_client::event::CacheEvent) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }
}

fn build_config() -> CacheConfig {
    let scheme = ConfigElement::new("remote-cache-scheme")
        .with_child(ConfigElement::new("scheme-name").with_value("orders-scheme"))
        .with_child(ConfigElement::new("service-name").with_value("OrdersService"));
    let schemes_root = ConfigElement::new("caching-schemes").with_child(scheme);
    let resolver = ConfigResolver::from_schemes_element(&schemes_root).unwrap();
    let mapping = MappingTable::new(vec![CacheMapping {
        pattern: "orders-*".to_string(),
        scheme_name: "orders-scheme".to_string(),
        init_params: Default::default(),
    }])
    .unwrap();
    CacheConfig::new(mapping, resolver)
}

#[tokio::test]
async fn key_listener_receives_dispatched_events() {
    let transport = FakeTransport::new();
    let factory = CacheClientFactory::new(
        build_config(),
        OperationalContext::default(),
        Arc::new(SharedTransportFactory { transport: transport.clone() }),
    );
    let cache = factory.ensure_cache("orders-2024", None).await.unwrap();

    let count = Arc::new(AtomicUsize::new(0));
    cache
        .add_key_listener(Value::Str("order-1".into()), Arc::new(CountingListener(count.clone())), ListenerWeight::Standard)
        .await
        .unwrap();

    cache.dispatch_local(&sample_event(Value::Str("order-1".into()), "orders-2024"));
    assert_eq!(count.load(Ordering::Relaxed), 1);

    cache.dispatch_local(&sample_event(Value::Str("order-2".into()), "orders-2024"));
    assert_eq!(count.load(Ordering::Relaxed), 1);
}

#[tokio::test]
async fn drain_all_events_dispatches_buffered_transport_events() {
    let transport = FakeTransport::new();
    let factory = CacheClientFactory::new(
        build_config(),
        OperationalContext::default(),
        Arc::new(SharedTransportFactory { transport: transport.clone() }),
    );
    let cache = factory.ensure_cache("orders-2024", None).await.unwrap();

    let count = Arc::new(AtomicUsize::new(0));
    cache
        .add_global_listener(Arc::new(CountingListener(count.clone())), ListenerWeight::Standard)
        .await
        .unwrap();

    let id = coherent_cache_client::transport::RemoteCacheId {
        service_name: "OrdersService".to_string(),
        cache_name: "orders-2024".to_string(),
    };
    transport.push_event(&id, sample_event(Value::Str("order-9".into()), "orders-2024")).await;

    factory.drain_all_events().await;
    assert_eq!(count.load(Ordering::Relaxed), 1);
}

#[tokio::test]
async fn failed_subscribe_rolls_back_registration() {
    let transport = FakeTransport::new();
    transport.fail_next_subscribe.store(true, Ordering::SeqCst);
    let factory = CacheClientFactory::new(
        build_config(),
        OperationalContext::default(),
        Arc::new(SharedTransportFactory { transport: transport.clone() }),
    );
    let cache = factory.ensure_cache("orders-2024", None).await.unwrap();

    let count = Arc::new(AtomicUsize::new(0));
    let result = cache
        .add_key_listener(Value::Str("order-1".into()), Arc::new(CountingListener(count.clone())), ListenerWeight::Standard)
        .await;
    assert!(result.is_err());

    cache.dispatch_local(&sample_event(Value::Str("order-1".into()), "orders-2024"));
    assert_eq!(count.load(Ordering::Relaxed), 0);
}
