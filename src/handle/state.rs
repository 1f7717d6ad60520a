//! Handle state machines.

/// Lifecycle of a cache handle: `Configured` before first use,
/// `Running`/`Restarting` while backed by a live service, then a terminal
/// `Released` or `Destroyed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    Configured,
    Running,
    Restarting,
    Released,
    Destroyed,
}

impl CacheState {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, CacheState::Released | CacheState::Destroyed)
    }

    #[must_use]
    pub fn is_usable(self) -> bool {
        matches!(self, CacheState::Running | CacheState::Restarting)
    }
}

/// Lifecycle of a service handle. Adds `Stopped` relative to
/// [`CacheState`]: a service can be stopped and later restarted without
/// being released, whereas a stopped cache has no equivalent — it is
/// always backed by exactly one service for its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceState {
    Configured,
    Running,
    Restarting,
    Stopped,
    Released,
    Destroyed,
}

impl ServiceState {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, ServiceState::Released | ServiceState::Destroyed)
    }

    #[must_use]
    pub fn is_usable(self) -> bool {
        matches!(self, ServiceState::Running | ServiceState::Restarting)
    }
}
