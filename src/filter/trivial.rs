//! Trivial filters.

use serde::{Deserialize, Serialize};

use crate::filter::extractor::ValueExtractor;
use crate::filter::value::Value;
use crate::filter::Entry;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrivialFilter {
    Always,
    Never,
    Present(ValueExtractor),
}

impl TrivialFilter {
    #[must_use]
    pub fn evaluate(&self, entry: &Entry) -> bool {
        match self {
            TrivialFilter::Always => true,
            TrivialFilter::Never => false,
            TrivialFilter::Present(ext) => ext.extract(entry) != Value::Null,
        }
    }
}
