//! Address provider.
//!
//! Produces an ordered, shuffled, resolvable sequence of endpoints from a
//! static configuration list, with accept/reject feedback so the caller can
//! anchor the address that worked and skip the one that didn't next cycle.
//!
//! The resolve-then-shuffle-then-cycle shape mirrors the usual
//! reconnect-on-failure handling in `RedisCache`/`InvalidationSubscriber`
//! (`tracing::warn!` once per bad entry, keep going), generalized from "one
//! Redis URL" to "a list of configured hosts, each resolving to one or more
//! addresses".

use rand::seq::SliceRandom;
use std::net::{SocketAddr, ToSocketAddrs};
use tracing::warn;

/// One configured `(host, port)` entry, not yet resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressConfig {
    pub host: String,
    pub port: u16,
}

impl AddressConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self { host: host.into(), port }
    }

    fn resolve(&self) -> std::io::Result<Vec<SocketAddr>> {
        (self.host.as_str(), self.port).to_socket_addrs().map(Iterator::collect)
    }
}

/// How an unresolvable host is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolutionMode {
    /// Skip unresolvable hosts, logging once per item (default).
    #[default]
    Safe,
    /// Raise immediately on an unresolvable host.
    Strict,
}

/// Outcome of `AddressProvider::next_address`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextAddress {
    Address(SocketAddr),
    /// A full cycle elapsed without an `accept()`; internal state has reset.
    Exhausted,
}

struct ResolvedItem {
    config: AddressConfig,
    addresses: Vec<SocketAddr>,
    /// Index within this item's own (already shuffled) address list —
    /// each item tracks its own position so jumping to the anchor on a
    /// later cycle doesn't inherit another item's progress.
    cursor: usize,
    warned: bool,
}

/// Cycles through configured hosts, resolving lazily and shuffling each
/// host's resolved address list once per resolution.
pub struct AddressProvider {
    items: Vec<ResolvedItem>,
    mode: ResolutionMode,
    /// Index of the item we'll serve addresses from next.
    item_cursor: usize,
    /// Index of the last address handed out via `next_address`, for `accept`.
    last_returned: Option<(usize, usize)>,
    /// Anchored-good item index from a prior `accept()`, tried first each cycle.
    anchor: Option<usize>,
    cycled_without_accept: bool,
}

impl AddressProvider {
    pub fn new(configs: Vec<AddressConfig>, mode: ResolutionMode) -> Self {
        let items = configs
            .into_iter()
            .map(|config| ResolvedItem { config, addresses: Vec::new(), cursor: 0, warned: false })
            .collect();
        Self { items, mode, item_cursor: 0, last_returned: None, anchor: None, cycled_without_accept: false }
    }

    /// Produce the next address in the cycle, resolving hosts lazily.
    ///
    /// # Errors
    /// In [`ResolutionMode::Strict`], propagates the first unresolvable host
    /// as an I/O error instead of skipping it.
    pub fn next_address(&mut self) -> std::io::Result<NextAddress> {
        if self.items.is_empty() {
            return Ok(NextAddress::Exhausted);
        }

        let start = self.anchor.unwrap_or(self.item_cursor);
        let mut visited = 0;
        let mut idx = start;

        while visited < self.items.len() {
            if self.items[idx].addresses.is_empty() {
                match self.items[idx].config.resolve() {
                    Ok(mut addrs) if !addrs.is_empty() => {
                        addrs.shuffle(&mut rand::thread_rng());
                        self.items[idx].addresses = addrs;
                    }
                    Ok(_) | Err(_) => {
                        if self.mode == ResolutionMode::Strict {
                            return Err(std::io::Error::new(
                                std::io::ErrorKind::NotFound,
                                format!("could not resolve {}:{}", self.items[idx].config.host, self.items[idx].config.port),
                            ));
                        }
                        if !self.items[idx].warned {
                            warn!(host = %self.items[idx].config.host, port = self.items[idx].config.port, "address provider: skipping unresolvable host");
                            self.items[idx].warned = true;
                        }
                        idx = (idx + 1) % self.items.len();
                        visited += 1;
                        continue;
                    }
                }
            }

            if self.items[idx].cursor >= self.items[idx].addresses.len() {
                // Do not reset this item's cursor here: it stays exhausted
                // for the rest of this lap. Resetting on every pass-over
                // would let an already-exhausted item serve addresses
                // again before every item has been visited once.
                idx = (idx + 1) % self.items.len();
                visited += 1;
                continue;
            }

            let addr = self.items[idx].addresses[self.items[idx].cursor];
            self.last_returned = Some((idx, self.items[idx].cursor));
            self.item_cursor = idx;
            self.items[idx].cursor += 1;
            self.cycled_without_accept = true;
            return Ok(NextAddress::Address(addr));
        }

        self.reset_cycle();
        Ok(NextAddress::Exhausted)
    }

    fn reset_cycle(&mut self) {
        self.item_cursor = 0;
        for item in &mut self.items {
            item.cursor = 0;
        }
        self.last_returned = None;
        self.cycled_without_accept = false;
    }

    /// Mark the last-returned address as good; it anchors future cycles.
    pub fn accept(&mut self) {
        if let Some((idx, _)) = self.last_returned {
            self.anchor = Some(idx);
        }
        self.cycled_without_accept = false;
    }

    /// Advisory rejection of the last-returned address; the next call simply advances.
    pub fn reject(&mut self, _cause: &str) {
        // Advancement already happened in `next_address`; nothing to undo.
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exhausts_after_full_cycle_without_accept() {
        let mut provider = AddressProvider::new(
            vec![AddressConfig::new("127.0.0.1", 9001), AddressConfig::new("127.0.0.1", 9002)],
            ResolutionMode::Safe,
        );
        let first = provider.next_address().unwrap();
        let second = provider.next_address().unwrap();
        assert!(matches!(first, NextAddress::Address(_)));
        assert!(matches!(second, NextAddress::Address(_)));
        let third = provider.next_address().unwrap();
        assert_eq!(third, NextAddress::Exhausted);
    }

    #[test]
    fn safe_mode_skips_unresolvable_host() {
        let mut provider = AddressProvider::new(
            vec![AddressConfig::new("not-a-real-host.invalid", 1), AddressConfig::new("127.0.0.1", 9003)],
            ResolutionMode::Safe,
        );
        let addr = provider.next_address().unwrap();
        assert!(matches!(addr, NextAddress::Address(_)));
    }

    #[test]
    fn strict_mode_raises_on_unresolvable_host() {
        let mut provider = AddressProvider::new(vec![AddressConfig::new("not-a-real-host.invalid", 1)], ResolutionMode::Strict);
        assert!(provider.next_address().is_err());
    }

    #[test]
    fn accept_anchors_item_for_next_cycle() {
        let mut provider = AddressProvider::new(
            vec![AddressConfig::new("127.0.0.1", 9001), AddressConfig::new("127.0.0.1", 9002)],
            ResolutionMode::Safe,
        );
        let first = provider.next_address().unwrap();
        provider.accept();

        // The anchored item was already consumed this lap, so the very
        // next call must move on to the other item, not repeat it.
        let second = provider.next_address().unwrap();
        assert!(matches!(second, NextAddress::Address(_)));
        assert_ne!(second, first);

        // Both items are now consumed for this lap.
        let exhausted = provider.next_address().unwrap();
        assert_eq!(exhausted, NextAddress::Exhausted);

        // A fresh lap starts at the anchored item again.
        let third = provider.next_address().unwrap();
        assert_eq!(third, first);
    }
}
