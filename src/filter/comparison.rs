//! Comparison filters.

use serde::{Deserialize, Serialize};

use crate::filter::extractor::ValueExtractor;
use crate::filter::value::Value;
use crate::filter::Entry;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComparisonFilter {
    Equals(ValueExtractor, Value),
    NotEquals(ValueExtractor, Value),
    LessThan(ValueExtractor, Value),
    LessEqual(ValueExtractor, Value),
    GreaterThan(ValueExtractor, Value),
    GreaterEqual(ValueExtractor, Value),
    Between(ValueExtractor, Value, Value),
    Contains(ValueExtractor, Value),
    ContainsAll(ValueExtractor, Vec<Value>),
    ContainsAny(ValueExtractor, Vec<Value>),
    Like(ValueExtractor, String),
    IsNull(ValueExtractor),
    IsNotNull(ValueExtractor),
    In(ValueExtractor, Vec<Value>),
}

impl ComparisonFilter {
    #[must_use]
    pub fn evaluate(&self, entry: &Entry) -> bool {
        match self {
            ComparisonFilter::Equals(ext, v) => ext.extract(entry) == *v,
            ComparisonFilter::NotEquals(ext, v) => ext.extract(entry) != *v,
            ComparisonFilter::LessThan(ext, v) => ext.extract(entry).partial_cmp(v) == Some(std::cmp::Ordering::Less),
            ComparisonFilter::LessEqual(ext, v) => {
                matches!(ext.extract(entry).partial_cmp(v), Some(std::cmp::Ordering::Less | std::cmp::Ordering::Equal))
            }
            ComparisonFilter::GreaterThan(ext, v) => {
                ext.extract(entry).partial_cmp(v) == Some(std::cmp::Ordering::Greater)
            }
            ComparisonFilter::GreaterEqual(ext, v) => {
                matches!(ext.extract(entry).partial_cmp(v), Some(std::cmp::Ordering::Greater | std::cmp::Ordering::Equal))
            }
            ComparisonFilter::Between(ext, lo, hi) => {
                let value = ext.extract(entry);
                value.partial_cmp(lo) != Some(std::cmp::Ordering::Less) && value.partial_cmp(hi) != Some(std::cmp::Ordering::Greater)
            }
            ComparisonFilter::Contains(ext, v) => {
                ext.extract(entry).as_list().is_some_and(|items| items.contains(v))
            }
            ComparisonFilter::ContainsAll(ext, values) => {
                ext.extract(entry).as_list().is_some_and(|items| values.iter().all(|v| items.contains(v)))
            }
            ComparisonFilter::ContainsAny(ext, values) => {
                ext.extract(entry).as_list().is_some_and(|items| values.iter().any(|v| items.contains(v)))
            }
            ComparisonFilter::Like(ext, pattern) => {
                ext.extract(entry).as_str().is_some_and(|s| like_matches(s, pattern))
            }
            ComparisonFilter::IsNull(ext) => ext.extract(entry) == Value::Null,
            ComparisonFilter::IsNotNull(ext) => ext.extract(entry) != Value::Null,
            ComparisonFilter::In(ext, values) => {
                let extracted = ext.extract(entry);
                values.contains(&extracted)
            }
        }
    }
}

/// SQL-style `LIKE` with `%` (any run) and `_` (single char) wildcards.
fn like_matches(text: &str, pattern: &str) -> bool {
    let text: Vec<char> = text.chars().collect();
    let pattern: Vec<char> = pattern.chars().collect();
    like_rec(&text, &pattern)
}

fn like_rec(text: &[char], pattern: &[char]) -> bool {
    match pattern.first() {
        None => text.is_empty(),
        Some('%') => like_rec(text, &pattern[1..]) || (!text.is_empty() && like_rec(&text[1..], pattern)),
        Some('_') => !text.is_empty() && like_rec(&text[1..], &pattern[1..]),
        Some(c) => !text.is_empty() && text[0] == *c && like_rec(&text[1..], &pattern[1..]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(value: Value) -> Entry {
        Entry { key: Value::Str("k".into()), value }
    }

    #[test]
    fn equals_and_between() {
        let e = entry(Value::Int(5));
        assert!(ComparisonFilter::Equals(ValueExtractor::Identity, Value::Int(5)).evaluate(&e));
        assert!(ComparisonFilter::Between(ValueExtractor::Identity, Value::Int(1), Value::Int(10)).evaluate(&e));
        assert!(!ComparisonFilter::Between(ValueExtractor::Identity, Value::Int(6), Value::Int(10)).evaluate(&e));
    }

    #[test]
    fn like_wildcards() {
        assert!(like_matches("hello", "h%o"));
        assert!(like_matches("hello", "h_llo"));
        assert!(!like_matches("hello", "world"));
    }

    #[test]
    fn contains_all_and_any() {
        let e = entry(Value::List(vec![Value::Int(1), Value::Int(2), Value::Int(3)]));
        assert!(ComparisonFilter::ContainsAll(ValueExtractor::Identity, vec![Value::Int(1), Value::Int(2)]).evaluate(&e));
        assert!(!ComparisonFilter::ContainsAll(ValueExtractor::Identity, vec![Value::Int(1), Value::Int(9)]).evaluate(&e));
        assert!(ComparisonFilter::ContainsAny(ValueExtractor::Identity, vec![Value::Int(9), Value::Int(2)]).evaluate(&e));
    }
}
