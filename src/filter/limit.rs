//! Pagination filter.
//!
//! A stateful wrapper around another filter that tracks page position as an
//! anchor pair instead of a raw offset, so a page survives small shifts in
//! the underlying source (an insert ahead of the anchor doesn't reshuffle
//! every page boundary the way a plain `skip`/`take` would).

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::filter::extractor::ValueExtractor;
use crate::filter::value::Value;
use crate::filter::{Entry, Filter};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LimitFilter {
    pub inner: Box<Filter>,
    pub page_size: usize,
    /// Sort-key extractor for the source `ExtractPage` is called against.
    /// Present means the source is ordered by this key and anchors are
    /// relocated by binary search; absent means pages are tracked by a
    /// plain index cookie instead.
    pub comparator: Option<ValueExtractor>,
    page: usize,
    /// Sort key (or index, with no comparator) of the current page's first
    /// entry.
    top_anchor: Option<Anchor>,
    /// Sort key (or index past the end, with no comparator) of the current
    /// page's last entry.
    bottom_anchor: Option<Anchor>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
enum Anchor {
    Key(Value),
    /// The opaque cookie used when there is no comparator to relocate a
    /// `Value` anchor by.
    Index(usize),
}

impl LimitFilter {
    #[must_use]
    pub fn new(inner: Filter, page_size: usize) -> Self {
        Self { inner: Box::new(inner), page_size, comparator: None, page: 0, top_anchor: None, bottom_anchor: None }
    }

    #[must_use]
    pub fn with_comparator(mut self, comparator: ValueExtractor) -> Self {
        self.comparator = Some(comparator);
        self
    }

    #[must_use]
    pub fn current_page(&self) -> usize {
        self.page
    }

    /// Move to the next page: the current bottom anchor becomes the new
    /// top, and the new bottom is left open until the next extraction.
    pub fn next_page(&mut self) {
        self.set_page(self.page + 1);
    }

    /// Move to the previous page, sliding the other way. No-op at page 0.
    pub fn previous_page(&mut self) -> bool {
        if self.page == 0 {
            return false;
        }
        self.set_page(self.page - 1);
        true
    }

    /// Jump to an arbitrary page, clearing both anchors (unless the jump
    /// happens to land on page 0 or one step from the current page, which
    /// fall through to the same slide/reset rules as `next_page`/
    /// `previous_page`).
    pub fn jump_to_page(&mut self, page: usize) {
        self.set_page(page);
    }

    fn set_page(&mut self, page: usize) {
        if page == 0 {
            self.top_anchor = None;
            self.bottom_anchor = None;
        } else if page == self.page + 1 {
            self.top_anchor = self.bottom_anchor.take();
        } else if self.page > 0 && page + 1 == self.page {
            self.bottom_anchor = self.top_anchor.take();
        } else {
            self.top_anchor = None;
            self.bottom_anchor = None;
        }
        self.page = page;
    }

    /// Extract this page's window from `entries`, which must already be in
    /// comparator order when a comparator is configured. Returns exactly
    /// `page_size` entries, or fewer on the last page. Calling this again
    /// without an intervening `next_page`/`previous_page`/`jump_to_page`
    /// re-extracts the same page (the inclusive rule: both anchors are
    /// already set, so the search lands back on the page's own first
    /// entry rather than the one after it).
    #[must_use]
    pub fn extract_page(&mut self, entries: &[Entry]) -> Vec<Entry> {
        let start = self.locate_start(entries).min(entries.len());
        let end = (start + self.page_size).min(entries.len());
        let page = entries[start..end].to_vec();

        match &self.comparator {
            Some(comparator) => {
                self.top_anchor = page.first().map(|e| Anchor::Key(comparator.extract(e)));
                self.bottom_anchor = page.last().map(|e| Anchor::Key(comparator.extract(e)));
            }
            None => {
                // Mirrors the comparator case exactly: the anchor is the
                // *entry's own* position, not a half-open bound, so the
                // forward/backward slide math in `locate_start` doesn't
                // need a separate branch per anchor kind.
                self.top_anchor = if page.is_empty() { None } else { Some(Anchor::Index(start)) };
                self.bottom_anchor = if page.is_empty() { None } else { Some(Anchor::Index(end - 1)) };
            }
        }
        page
    }

    fn locate_start(&self, entries: &[Entry]) -> usize {
        match (&self.top_anchor, &self.bottom_anchor) {
            (Some(top), Some(_)) => self.anchor_position(top, entries),
            (Some(top), None) => {
                let idx = self.anchor_position(top, entries);
                // Ring-buffer wrap: the heading anchor fell off the end of
                // a since-rotated source, so start over from the front
                // instead of returning an empty page.
                if idx + 1 >= entries.len() {
                    0
                } else {
                    idx + 1
                }
            }
            (None, Some(bottom)) => self.anchor_position(bottom, entries).saturating_sub(self.page_size),
            (None, None) => 0,
        }
    }

    fn anchor_position(&self, anchor: &Anchor, entries: &[Entry]) -> usize {
        match anchor {
            Anchor::Index(idx) => *idx,
            Anchor::Key(key) => match &self.comparator {
                Some(comparator) => lower_bound(entries, comparator, key),
                None => 0,
            },
        }
    }
}

/// First index in `entries` whose extracted key is not less than `target`.
fn lower_bound(entries: &[Entry], comparator: &ValueExtractor, target: &Value) -> usize {
    entries.partition_point(|e| matches!(comparator.extract(e).partial_cmp(target), Some(Ordering::Less)))
}
