//! Error kinds for the cache client core.
//!
//! The taxonomy mirrors the failure surfaces a caller needs to tell apart:
//! configuration mistakes are fatal to a single call, transport failures are
//! retried transparently on the next operation, timeouts split into
//! client-originated and server-originated, and trigger rejection carries
//! the veto back to the mutator.

use std::fmt;
use std::time::Duration;

/// Errors produced by configuration resolution (`config` module).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown scheme '{0}'")]
    UnknownScheme(String),

    #[error("cyclic scheme-ref: '{0}' refers to itself")]
    CyclicRef(String),

    #[error("scheme-ref '{child}' (kind {child_kind:?}) does not match base '{base}' (kind {base_kind:?})")]
    KindMismatch {
        child: String,
        child_kind: crate::config::SchemeKind,
        base: String,
        base_kind: crate::config::SchemeKind,
    },

    #[error("invalid wildcard pattern '{0}': '*' must appear exactly once, as the final character")]
    InvalidWildcard(String),

    #[error("duplicate service-name '{0}' among sibling schemes")]
    DuplicateServiceName(String),

    #[error("no cache mapping matches name '{0}'")]
    NoMapping(String),

    #[error("unresolved macro in '{0}'")]
    UnresolvedMacro(String),

    #[error("at most one {0} child scheme is permitted")]
    TooManyChildren(&'static str),
}

/// Errors raised when a caller passes an invalid argument.
#[derive(Debug, thiserror::Error)]
pub enum InvalidArgumentError {
    #[error("cache name must not be empty")]
    EmptyCacheName,

    #[error("page index must be >= 0, got {0}")]
    NegativePage(i64),

    #[error("port {0} is out of range")]
    PortOutOfRange(u32),

    #[error("key is not held by the requesting party, cannot unlock")]
    UnlockNonHolder,
}

/// Errors raised when an operation targets a handle that is no longer usable.
#[derive(Debug, thiserror::Error)]
pub enum InvalidStateError {
    #[error("cache '{0}' has been released")]
    CacheReleased(String),

    #[error("cache '{0}' has been destroyed")]
    CacheDestroyed(String),

    #[error("service '{0}' has been released")]
    ServiceReleased(String),

    #[error("service '{0}' has been destroyed")]
    ServiceDestroyed(String),

    #[error("handle for '{0}' cannot be reconfigured after first use")]
    ReconfiguredAfterUse(String),
}

/// A timeout error, distinguishing who gave up.
#[derive(Debug, thiserror::Error)]
pub enum TimeoutError {
    /// The server stopped the task after its execution timeout elapsed.
    #[error("execution timeout after {0:?}: task was stopped server-side")]
    Execution(Duration),

    /// The client stopped waiting after its request timeout elapsed; the
    /// server may still complete the task and discard the result.
    #[error("request timeout after {0:?}: client stopped waiting")]
    Request(Duration),
}

/// A request that did not complete, optionally carrying a partial result
/// (e.g. a partially-aggregated value when a streaming aggregation times out
/// midway). Both timeout kinds and trigger rollback can surface one of
/// these.
#[derive(Debug)]
pub struct RequestIncomplete<T> {
    pub timeout: TimeoutError,
    pub partial_result: Option<T>,
}

impl<T: fmt::Debug> fmt::Display for RequestIncomplete<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (partial result present: {})", self.timeout, self.partial_result.is_some())
    }
}

impl<T: fmt::Debug> std::error::Error for RequestIncomplete<T> {}

/// Top-level error type returned by the public API of this crate.
#[derive(Debug, thiserror::Error)]
pub enum CacheClientError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    InvalidArgument(#[from] InvalidArgumentError),

    #[error(transparent)]
    InvalidState(#[from] InvalidStateError),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("failed to (de)serialize a cache value: {0}")]
    Serialization(String),

    #[error(transparent)]
    Timeout(#[from] TimeoutError),

    #[error("trigger rejected the change for key '{key}': {reason}")]
    TriggerRejected { key: String, reason: String },
}

pub type Result<T> = std::result::Result<T, CacheClientError>;
