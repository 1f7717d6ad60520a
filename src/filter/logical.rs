//! Logical combinators over filters.

use serde::{Deserialize, Serialize};

use crate::filter::{Entry, Filter};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogicalFilter {
    And(Box<Filter>, Box<Filter>),
    Or(Box<Filter>, Box<Filter>),
    Xor(Box<Filter>, Box<Filter>),
    Not(Box<Filter>),
    All(Vec<Filter>),
    Any(Vec<Filter>),
}

impl LogicalFilter {
    #[must_use]
    pub fn evaluate(&self, entry: &Entry) -> bool {
        match self {
            LogicalFilter::And(a, b) => a.evaluate(entry) && b.evaluate(entry),
            LogicalFilter::Or(a, b) => a.evaluate(entry) || b.evaluate(entry),
            LogicalFilter::Xor(a, b) => a.evaluate(entry) ^ b.evaluate(entry),
            LogicalFilter::Not(a) => !a.evaluate(entry),
            LogicalFilter::All(filters) => filters.iter().all(|f| f.evaluate(entry)),
            LogicalFilter::Any(filters) => filters.iter().any(|f| f.evaluate(entry)),
        }
    }
}
