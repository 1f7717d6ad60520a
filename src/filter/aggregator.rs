//! Built-in entry aggregators: the common count/sum/average/min/max
//! reductions a querying API over a set of entries is expected to support.

use serde::{Deserialize, Serialize};

use crate::filter::extractor::ValueExtractor;
use crate::filter::value::Value;
use crate::filter::Entry;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryAggregator {
    Count,
    Sum(ValueExtractor),
    Average(ValueExtractor),
    Min(ValueExtractor),
    Max(ValueExtractor),
}

impl EntryAggregator {
    #[must_use]
    pub fn aggregate(&self, entries: &[Entry]) -> Value {
        match self {
            EntryAggregator::Count => Value::Int(entries.len() as i64),
            EntryAggregator::Sum(ext) => Value::Float(entries.iter().filter_map(|e| as_f64(ext.extract(e))).sum()),
            EntryAggregator::Average(ext) => {
                let values: Vec<f64> = entries.iter().filter_map(|e| as_f64(ext.extract(e))).collect();
                if values.is_empty() {
                    Value::Null
                } else {
                    Value::Float(values.iter().sum::<f64>() / values.len() as f64)
                }
            }
            EntryAggregator::Min(ext) => entries
                .iter()
                .filter_map(|e| as_f64(ext.extract(e)))
                .fold(None, |acc, v| Some(acc.map_or(v, |a: f64| a.min(v))))
                .map_or(Value::Null, Value::Float),
            EntryAggregator::Max(ext) => entries
                .iter()
                .filter_map(|e| as_f64(ext.extract(e)))
                .fold(None, |acc, v| Some(acc.map_or(v, |a: f64| a.max(v))))
                .map_or(Value::Null, Value::Float),
        }
    }
}

fn as_f64(value: Value) -> Option<f64> {
    match value {
        Value::Int(i) => Some(i as f64),
        Value::Float(f) => Some(f),
        _ => None,
    }
}
