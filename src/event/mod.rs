//! Event engine: listener registration,
//! dispatch ordering, and subscription lifecycle.

pub mod dispatch;
pub mod listener;
pub mod registry;
pub mod types;

pub use dispatch::{drain_and_dispatch, subscribe_filter, subscribe_global, subscribe_key};
pub use listener::{Listener, ListenerId, ListenerWeight};
pub use registry::ListenerRegistry;
pub use types::{CacheEvent, EventKind};
