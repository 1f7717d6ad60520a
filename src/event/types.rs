//! Cache event envelope.

use serde::{Deserialize, Serialize};

use crate::filter::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    Inserted,
    Updated,
    Deleted,
}

/// A single change notification for one cache entry.
///
/// `old_value`/`new_value` are `None` under a lite subscription — the
/// registry strips them before dispatch rather than the sender never
/// sending them, so the same wire event serves both subscription kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEvent {
    pub cache_name: String,
    pub key: Value,
    pub old_value: Option<Value>,
    pub new_value: Option<Value>,
    pub kind: EventKind,
    /// Set when this event was produced by a trigger's `RemoveIf` action
    /// rather than directly by the caller.
    pub synthetic: bool,
}

impl CacheEvent {
    #[must_use]
    pub fn as_lite(&self) -> Self {
        Self { old_value: None, new_value: None, ..self.clone() }
    }
}
