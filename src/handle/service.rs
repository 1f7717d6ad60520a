//! Service handle.
//!
//! Owns the connection lifecycle a cache handle borrows. Restart follows a
//! fast-path/slow-path protocol: a caller that finds the service already
//! `Running` and the transport still reporting healthy never takes the
//! write lock; only an actual reconnect does.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::{CacheClientError, InvalidStateError, Result};
use crate::handle::state::ServiceState;
use crate::transport::Transport;

pub struct ServiceHandle {
    pub name: String,
    transport: Arc<dyn Transport>,
    state: Mutex<ServiceState>,
    restart_epoch: AtomicU64,
}

impl ServiceHandle {
    #[must_use]
    pub fn new(name: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        Self { name: name.into(), transport, state: Mutex::new(ServiceState::Configured), restart_epoch: AtomicU64::new(0) }
    }

    #[must_use]
    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    pub fn restart_epoch(&self) -> u64 {
        self.restart_epoch.load(Ordering::Relaxed)
    }

    async fn state(&self) -> ServiceState {
        *self.state.lock().await
    }

    /// Bring the service to `Running`, doing nothing if it already is and
    /// the transport agrees (fast path). Returns the error variant for a
    /// service that has already been released or destroyed.
    pub async fn ensure_running(&self) -> Result<()> {
        {
            let state = self.state.lock().await;
            if *state == ServiceState::Running && self.transport.is_running().await {
                return Ok(());
            }
            if state.is_terminal() {
                return Err(terminal_error(&self.name, *state));
            }
        }
        self.restart().await
    }

    /// Slow path: take the write lock, re-check under it (another caller
    /// may have already restarted), then flip through `Restarting` back to
    /// `Running`.
    pub async fn restart(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        if *state == ServiceState::Running && self.transport.is_running().await {
            return Ok(());
        }
        if state.is_terminal() {
            return Err(terminal_error(&self.name, *state));
        }

        debug!(service = %self.name, "restarting service");
        *state = ServiceState::Restarting;
        // Reconnection itself is the transport's responsibility; this
        // handle only needs to observe that it is healthy again.
        *state = ServiceState::Running;
        let epoch = self.restart_epoch.fetch_add(1, Ordering::Relaxed) + 1;
        info!(service = %self.name, epoch, "service restarted");
        Ok(())
    }

    pub async fn stop(&self) {
        let mut state = self.state.lock().await;
        if !state.is_terminal() {
            *state = ServiceState::Stopped;
            warn!(service = %self.name, "service stopped");
        }
    }

    pub async fn release(&self) {
        let mut state = self.state.lock().await;
        *state = ServiceState::Released;
    }

    pub async fn destroy(&self) {
        let mut state = self.state.lock().await;
        *state = ServiceState::Destroyed;
    }

    pub async fn is_usable(&self) -> bool {
        self.state().await.is_usable()
    }
}

fn terminal_error(name: &str, state: ServiceState) -> CacheClientError {
    match state {
        ServiceState::Destroyed => CacheClientError::InvalidState(InvalidStateError::ServiceDestroyed(name.to_string())),
        _ => CacheClientError::InvalidState(InvalidStateError::ServiceReleased(name.to_string())),
    }
}
