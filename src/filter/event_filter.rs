//! Cache-event filter.

use serde::{Deserialize, Serialize};

use crate::filter::{Entry, Filter};

pub const INSERTED: u8 = 0x01;
pub const UPDATED: u8 = 0x02;
pub const DELETED: u8 = 0x04;
pub const UPDATED_ENTERED: u8 = 0x08;
pub const UPDATED_WITHIN: u8 = 0x10;
pub const UPDATED_LEFT: u8 = 0x20;

/// Accepts application-originated (non-synthetic) events.
pub const NATURAL: u8 = 0x01;
/// Accepts server-internal events: expiry, eviction, read-through.
pub const SYNTHETIC: u8 = 0x02;
/// Default syntheticity mask: both natural and synthetic events pass.
pub const ANY_SYNTHETICITY: u8 = NATURAL | SYNTHETIC;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheEventFilter {
    pub mask: u8,
    /// Independent from `mask`: which of natural/synthetic events pass at
    /// all, evaluated before the insert/update/delete truth table.
    pub synthetic_mask: u8,
    pub inner: Option<Box<Filter>>,
}

impl CacheEventFilter {
    #[must_use]
    pub fn new(mask: u8, inner: Option<Filter>) -> Self {
        Self { mask, synthetic_mask: ANY_SYNTHETICITY, inner: inner.map(Box::new) }
    }

    #[must_use]
    pub fn with_synthetic_mask(mut self, synthetic_mask: u8) -> Self {
        self.synthetic_mask = synthetic_mask;
        self
    }

    fn inner_matches(&self, entry: &Entry) -> bool {
        self.inner.as_ref().map_or(true, |f| f.evaluate(entry))
    }

    /// Evaluate the truth table for an insert/update/delete transition.
    /// `old`/`new` are `None` for inserts (no old) and deletes (no new).
    /// Rejects up front if `synthetic` isn't allowed by `synthetic_mask`,
    /// independent of the insert/update/delete bits.
    #[must_use]
    pub fn matches(
        &self,
        key: &crate::filter::value::Value,
        old: Option<&crate::filter::value::Value>,
        new: Option<&crate::filter::value::Value>,
        synthetic: bool,
    ) -> bool {
        let allowed_syntheticity = if synthetic { SYNTHETIC } else { NATURAL };
        if self.synthetic_mask & allowed_syntheticity == 0 {
            return false;
        }

        match (old, new) {
            (None, Some(new_value)) => {
                self.mask & INSERTED != 0 && self.inner_matches(&Entry { key: key.clone(), value: new_value.clone() })
            }
            (Some(old_value), None) => {
                self.mask & DELETED != 0 && self.inner_matches(&Entry { key: key.clone(), value: old_value.clone() })
            }
            (Some(old_value), Some(new_value)) => {
                let old_matched = self.inner_matches(&Entry { key: key.clone(), value: old_value.clone() });
                let new_matched = self.inner_matches(&Entry { key: key.clone(), value: new_value.clone() });
                let generic = self.mask & UPDATED != 0 && (old_matched || new_matched);
                let entered = self.mask & UPDATED_ENTERED != 0 && !old_matched && new_matched;
                let left = self.mask & UPDATED_LEFT != 0 && old_matched && !new_matched;
                let within = self.mask & UPDATED_WITHIN != 0 && old_matched && new_matched;
                generic || entered || left || within
            }
            (None, None) => false,
        }
    }
}
