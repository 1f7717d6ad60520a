//! Continuous-query view materialiser.
//!
//! Maintains a local snapshot of every entry matching a filter, kept live
//! by subscribing to a derived event filter and replaying updates. A
//! transformed view is read-only: once a transformer narrows what's
//! stored, there's no way to push a write back through it.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tracing::{error, warn};

use crate::error::Result;
use crate::event::{CacheEvent, EventKind, Listener, ListenerWeight};
use crate::filter::event_filter::{CacheEventFilter, DELETED, INSERTED, UPDATED_ENTERED, UPDATED_LEFT, UPDATED_WITHIN};
use crate::filter::value::Value;
use crate::filter::{Entry, Filter};
use crate::handle::CacheHandle;

/// Projects each stored value before insertion into the view; once set,
/// the view can no longer be written back through.
pub type Transformer = Arc<dyn Fn(&Value, &Value) -> Value + Send + Sync>;

pub struct ViewBuilder {
    filter: Filter,
    lite: bool,
    listener: Option<Arc<dyn Listener>>,
    transformer: Option<Transformer>,
    reconnect_interval: Duration,
}

impl Default for ViewBuilder {
    fn default() -> Self {
        Self { filter: Filter::always(), lite: false, listener: None, transformer: None, reconnect_interval: Duration::from_secs(30) }
    }
}

impl ViewBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }

    #[must_use]
    pub fn lite(mut self, lite: bool) -> Self {
        self.lite = lite;
        self
    }

    #[must_use]
    pub fn listener(mut self, listener: Arc<dyn Listener>) -> Self {
        self.listener = Some(listener);
        self
    }

    #[must_use]
    pub fn transformer(mut self, transformer: Transformer) -> Self {
        self.transformer = Some(transformer);
        self
    }

    #[must_use]
    pub fn reconnect_interval(mut self, interval: Duration) -> Self {
        self.reconnect_interval = interval;
        self
    }

    /// Build the view against `source`, running the initial population
    /// pass. A failed initial load is logged, not returned as an error —
    /// the view starts empty and catches up as events arrive.
    pub async fn build(self, source: Arc<CacheHandle>) -> Arc<ContinuousQueryView> {
        let view = Arc::new(ContinuousQueryView {
            source,
            filter: self.filter,
            lite: self.lite,
            transformer: self.transformer,
            reconnect_interval: self.reconnect_interval,
            snapshot: DashMap::new(),
        });

        if let Err(err) = view.populate().await {
            warn!(error = %err, "continuous query view initial population failed, starting empty");
        }

        if let Some(listener) = self.listener {
            ContinuousQueryView::install_listener(&view, listener).await;
        }

        view
    }
}

pub struct ContinuousQueryView {
    source: Arc<CacheHandle>,
    filter: Filter,
    lite: bool,
    transformer: Option<Transformer>,
    reconnect_interval: Duration,
    snapshot: DashMap<Value, Value>,
}

impl ContinuousQueryView {
    async fn populate(&self) -> Result<()> {
        let keys = self.source.query_keys(&self.filter).await?;
        for key in keys {
            if let Some(value) = self.source.get(&key).await? {
                self.store(key, value);
            }
        }
        Ok(())
    }

    fn store(&self, key: Value, value: Value) {
        let projected = match &self.transformer {
            Some(transform) => transform(&key, &value),
            None => value,
        };
        self.snapshot.insert(key, projected);
    }

    async fn install_listener(view: &Arc<Self>, listener: Arc<dyn Listener>) {
        let derived = derived_event_filter(view.filter.clone());
        let sink = Arc::new(ViewSink { view: Arc::clone(view), downstream: listener });
        let weight = if view.lite { ListenerWeight::Lite } else { ListenerWeight::Standard };
        if let Err(err) = view.source.add_filter_listener(derived, sink, weight).await {
            error!(error = %err, "failed to install continuous query view listener");
        }
    }

    #[must_use]
    pub fn get(&self, key: &Value) -> Option<Value> {
        self.snapshot.get(key).map(|entry| entry.value().clone())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshot.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshot.is_empty()
    }

    #[must_use]
    pub fn is_read_only(&self) -> bool {
        self.transformer.is_some()
    }

    #[must_use]
    pub fn reconnect_interval(&self) -> Duration {
        self.reconnect_interval
    }
}

/// Wrap the view's filter so membership transitions (not just raw
/// updates) drive snapshot maintenance — entries crossing into the filter
/// are inserted, entries crossing out are removed.
fn derived_event_filter(filter: Filter) -> Filter {
    Filter::Event(CacheEventFilter::new(UPDATED_ENTERED | UPDATED_WITHIN | UPDATED_LEFT | INSERTED | DELETED, Some(filter)))
}

struct ViewSink {
    view: Arc<ContinuousQueryView>,
    downstream: Arc<dyn Listener>,
}

impl Listener for ViewSink {
    fn on_event(&self, event: &CacheEvent) {
        match event.kind {
            EventKind::Deleted => {
                self.view.snapshot.remove(&event.key);
            }
            EventKind::Inserted => {
                if let Some(new_value) = &event.new_value {
                    self.view.store(event.key.clone(), new_value.clone());
                }
            }
            EventKind::Updated => {
                // The derived filter also lets `UPDATED_LEFT` through: the
                // new value may no longer satisfy the view's own filter,
                // in which case the entry leaves the snapshot instead of
                // being overwritten with a value that violates it.
                match &event.new_value {
                    Some(new_value) if self.view.filter.evaluate(&Entry { key: event.key.clone(), value: new_value.clone() }) => {
                        self.view.store(event.key.clone(), new_value.clone());
                    }
                    _ => {
                        self.view.snapshot.remove(&event.key);
                    }
                }
            }
        }
        self.downstream.on_event(event);
    }
}
