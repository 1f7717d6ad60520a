//! Service and cache handles.

pub mod cache;
pub mod service;
pub mod state;

pub use cache::CacheHandle;
pub use service::ServiceHandle;
pub use state::{CacheState, ServiceState};
