//! Entry processor shape (supplemented from the original's invocable
//! in-place-mutation surface; the concrete processors are left to callers,
//! this crate only owns the trait and the dispatch envelope).

use crate::filter::value::Value;
use crate::filter::Entry;

/// An operation that runs against a single entry and may mutate it.
pub trait EntryProcessor: Send + Sync {
    /// Apply the processor, returning the value reported back to the caller
    /// (not necessarily the entry's new value — e.g. a `put` processor may
    /// return the replaced value).
    fn process(&self, entry: &mut Entry) -> Value;
}

/// A processor that replaces the entry's value unconditionally.
pub struct SetValueProcessor {
    pub value: Value,
}

impl EntryProcessor for SetValueProcessor {
    fn process(&self, entry: &mut Entry) -> Value {
        let previous = entry.value.clone();
        entry.value = self.value.clone();
        previous
    }
}
