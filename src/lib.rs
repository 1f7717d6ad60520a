//! Coherent Cache Client
//!
//! Client-side core for a distributed in-memory cache, the part that stays
//! the same no matter which wire protocol or serializer backs it:
//! - **Configuration resolution**: scheme trees with `scheme-ref`
//!   inheritance, wildcard cache-name mapping, and macro substitution
//! - **Filters, extractors, triggers, aggregators**: a portable predicate
//!   data model for querying and subscribing without shipping code
//! - **Event engine**: key/filter/global listener registries with
//!   lite/standard delivery and restart-safe re-subscription
//! - **Service & cache handles**: lifecycle state machines with
//!   transparent reconnect and principal scoping
//! - **Continuous-query views**: locally materialized, live-updating
//!   projections of a filtered subset of a cache
//!
//! Wire encoding, TLS, and the portable-object serializer are out of scope
//! — see [`transport::Transport`] for the seam a concrete implementation
//! plugs into.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use coherent_cache_client::config::CacheConfig;
//! use coherent_cache_client::context::OperationalContext;
//! use coherent_cache_client::factory::{CacheClientFactory, TransportFactory};
//! use coherent_cache_client::filter::value::Value;
//!
//! # async fn run(config: CacheConfig, transport_factory: Arc<dyn TransportFactory>) -> coherent_cache_client::error::Result<()> {
//! let factory = CacheClientFactory::new(config, OperationalContext::default(), transport_factory);
//! let cache = factory.ensure_cache("orders-2024").await?;
//! cache.put(Value::Str("order-1".into()), Value::Int(42)).await?;
//! let value = cache.get(&Value::Str("order-1".into())).await?;
//! # let _ = value;
//! # Ok(())
//! # }
//! ```

pub mod address_provider;
pub mod config;
pub mod context;
pub mod error;
pub mod event;
pub mod factory;
pub mod filter;
pub mod handle;
pub mod transport;
pub mod view;

pub use address_provider::{AddressConfig, AddressProvider, NextAddress, ResolutionMode};
pub use context::OperationalContext;
pub use error::{CacheClientError, Result};
pub use factory::CacheClientFactory;
pub use filter::{Entry, Filter};
pub use handle::{CacheHandle, ServiceHandle};
pub use transport::Transport;
pub use view::{ContinuousQueryView, ViewBuilder};

pub use async_trait::async_trait;
