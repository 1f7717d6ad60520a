//! Entry triggers.

use serde::{Deserialize, Serialize};

use crate::filter::value::Value;

/// The outcome a trigger chooses for a pending entry mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerAction {
    /// Let the mutation proceed unchanged.
    Proceed,
    /// Reject the mutation and surface `TriggerRejected` to the caller.
    Rollback,
    /// Silently drop the mutation; the caller observes no error.
    Ignore,
    /// Replace the mutation with a removal. Synthetic: the resulting
    /// cache event is marked as trigger-originated, not caller-originated.
    Remove,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MapTrigger {
    RejectIf(crate::filter::Filter),
    IgnoreIf(crate::filter::Filter),
    RemoveIf(crate::filter::Filter),
}

impl MapTrigger {
    /// Evaluates the wrapped filter against the pending entry and acts
    /// **on false** — a trigger guards against mutations that fail to
    /// satisfy its condition, so `NeverFilter` (always false) fires on
    /// every mutation and `AlwaysFilter` (always true) never does.
    #[must_use]
    pub fn evaluate(&self, key: &Value, old_value: Option<&Value>, new_value: Option<&Value>) -> TriggerAction {
        let probe = new_value.or(old_value).cloned().unwrap_or(Value::Null);
        let entry = crate::filter::Entry { key: key.clone(), value: probe };
        match self {
            MapTrigger::RejectIf(filter) => {
                if filter.evaluate(&entry) {
                    TriggerAction::Proceed
                } else {
                    TriggerAction::Rollback
                }
            }
            MapTrigger::IgnoreIf(filter) => {
                if filter.evaluate(&entry) {
                    TriggerAction::Proceed
                } else {
                    TriggerAction::Ignore
                }
            }
            MapTrigger::RemoveIf(filter) => {
                if filter.evaluate(&entry) {
                    TriggerAction::Proceed
                } else {
                    TriggerAction::Remove
                }
            }
        }
    }
}
