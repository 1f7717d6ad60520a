//! Value-change filter: true only when
//! an extracted projection of the old and new values differ.

use serde::{Deserialize, Serialize};

use crate::filter::extractor::ValueExtractor;
use crate::filter::value::Value;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValueChangeFilter {
    pub extractor: ValueExtractor,
}

impl ValueChangeFilter {
    #[must_use]
    pub fn evaluate(&self, key: &Value, old_value: Option<&Value>, new_value: Option<&Value>) -> bool {
        use crate::filter::Entry;
        let project = |v: &Value| self.extractor.extract(&Entry { key: key.clone(), value: v.clone() });
        match (old_value, new_value) {
            (Some(old), Some(new)) => project(old) != project(new),
            (None, Some(_)) | (Some(_), None) => true,
            (None, None) => false,
        }
    }
}
