mod common;

use std::sync::Arc;

use coherent_cache_client::config::{CacheConfig, CacheMapping, ConfigElement, ConfigResolver, MappingTable};
use coherent_cache_client::context::OperationalContext;
use coherent_cache_client::event::{CacheEvent, EventKind};
use coherent_cache_client::factory::{CacheClientFactory, TransportFactory};
use coherent_cache_client::filter::{ComparisonFilter, Filter, Value, ValueExtractor};
use coherent_cache_client::transport::Transport;
use coherent_cache_client::ViewBuilder;
use common::FakeTransport;

struct SharedTransportFactory {
    transport: Arc<FakeTransport>,
}

impl TransportFactory for SharedTransportFactory {
    fn create(&self, _service_name: &str) -> Arc<dyn Transport> {
        self.transport.clone()
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
async fn view_removes_an_entry_that_updates_out_of_its_filter() {
    let transport = FakeTransport::new();
    let factory = CacheClientFactory::new(
        build_config(),
        OperationalContext::default(),
        Arc::new(SharedTransportFactory { transport }),
    );
    let cache = factory.ensure_cache("orders-2024", None).await.unwrap();

    let filter = Filter::Comparison(ComparisonFilter::GreaterThan(ValueExtractor::Identity, Value::Int(10)));
    let view = ViewBuilder::new().filter(filter).build(cache.clone()).await;

    let key = Value::Str("order-1".into());
    cache.dispatch_local(&CacheEvent {
        cache_name: "orders-2024".into(),
        key: key.clone(),
        old_value: None,
        new_value: Some(Value::Int(20)),
        kind: EventKind::Inserted,
        synthetic: false,
    });
    assert_eq!(view.get(&key), Some(Value::Int(20)));

    // The update moves the value below the view's filter threshold; the
    // entry must leave the snapshot, not be overwritten with a
    // filter-violating value.
    cache.dispatch_local(&CacheEvent {
        cache_name: "orders-2024".into(),
        key: key.clone(),
        old_value: Some(Value::Int(20)),
        new_value: Some(Value::Int(5)),
        kind: EventKind::Updated,
        synthetic: false,
    });
    assert_eq!(view.get(&key), None);
}

#[tokio::test]
async fn view_keeps_an_entry_that_updates_within_its_filter() {
    let transport = FakeTransport::new();
    let factory = CacheClientFactory::new(
        build_config(),
        OperationalContext::default(),
        Arc::new(SharedTransportFactory { transport }),
    );
    let cache = factory.ensure_cache("orders-2024", None).await.unwrap();

    let filter = Filter::Comparison(ComparisonFilter::GreaterThan(ValueExtractor::Identity, Value::Int(10)));
    let view = ViewBuilder::new().filter(filter).build(cache.clone()).await;

    let key = Value::Str("order-1".into());
    cache.dispatch_local(&CacheEvent {
        cache_name: "orders-2024".into(),
        key: key.clone(),
        old_value: None,
        new_value: Some(Value::Int(20)),
        kind: EventKind::Inserted,
        synthetic: false,
    });

    cache.dispatch_local(&CacheEvent {
        cache_name: "orders-2024".into(),
        key: key.clone(),
        old_value: Some(Value::Int(20)),
        new_value: Some(Value::Int(30)),
        kind: EventKind::Updated,
        synthetic: false,
    });
    assert_eq!(view.get(&key), Some(Value::Int(30)));
}
