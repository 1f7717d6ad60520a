//! Value extractors.
//!
//! Associativity invariant: chaining extractors
//! `a -> b -> c` must produce the same result as a single chained extractor
//! built from the flattened list, which is why [`ValueExtractor::Chained`]
//! flattens nested chains at construction rather than at evaluation time.

use serde::{Deserialize, Serialize};

use crate::filter::value::Value;
use crate::filter::Entry;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueExtractor {
    /// Returns the entry's value unchanged.
    Identity,
    /// Returns the entry's key.
    Key,
    /// Dotted-path style field access on a structured value.
    Property(String),
    /// Apply each extractor to the output of the previous one, in order.
    Chained(Vec<ValueExtractor>),
    /// Apply every extractor to the same input, producing a `Value::List`.
    Multi(Vec<ValueExtractor>),
}

impl ValueExtractor {
    /// Build a chained extractor, flattening any nested `Chained` members
    /// so `chain(chain(a, b), c) == chain(a, b, c)`.
    #[must_use]
    pub fn chain(extractors: Vec<ValueExtractor>) -> Self {
        let mut flat = Vec::with_capacity(extractors.len());
        for e in extractors {
            match e {
                ValueExtractor::Chained(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        ValueExtractor::Chained(flat)
    }

    #[must_use]
    pub fn extract(&self, entry: &Entry) -> Value {
        match self {
            ValueExtractor::Identity => entry.value.clone(),
            ValueExtractor::Key => entry.key.clone(),
            ValueExtractor::Property(name) => extract_property(&entry.value, name),
            ValueExtractor::Chained(chain) => {
                let mut current = entry.clone();
                for step in chain {
                    let extracted = step.extract(&current);
                    current = Entry { key: current.key, value: extracted };
                }
                current.value
            }
            ValueExtractor::Multi(extractors) => {
                Value::List(extractors.iter().map(|e| e.extract(entry)).collect())
            }
        }
    }
}

fn extract_property(value: &Value, name: &str) -> Value {
    match value {
        Value::List(items) => {
            name.parse::<usize>().ok().and_then(|idx| items.get(idx)).cloned().unwrap_or(Value::Null)
        }
        _ => Value::Null,
    }
}
