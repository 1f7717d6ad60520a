//! Key-set membership filter.

use serde::{Deserialize, Serialize};

use crate::filter::value::Value;
use crate::filter::Entry;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyFilter {
    pub keys: Vec<Value>,
}

impl KeyFilter {
    #[must_use]
    pub fn evaluate(&self, entry: &Entry) -> bool {
        self.keys.contains(&entry.key)
    }
}
