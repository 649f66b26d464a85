//! # Deadlock guard
//!
//! Checked once after the bridge's `run` returns normally. A guest that got
//! there without exiting has nothing left that could wake it, so the guard
//! queues the reserved deadlock event and resumes the bridge, which is
//! expected to report the stall instead of letting the process exit quietly.

use tracing::warn;
use wasmtime::Instance;
use wasmtime::Store;

use crate::bridge::Bridge;
use crate::bridge::Result;
use crate::context::ExecCtx;
use crate::context::PendingEvent;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuardState {
    Pending,
    Resolved,
}

#[derive(Debug)]
pub struct DeadlockGuard {
    state: GuardState,
}

impl DeadlockGuard {
    pub fn new() -> Self {
        Self {
            state: GuardState::Pending,
        }
    }

    pub fn state(&self) -> GuardState {
        self.state
    }

    /// Resolves the guard. Returns `true` if it fired.
    ///
    /// Only the first call can fire; later calls are no-ops.
    pub async fn check(
        &mut self,
        bridge: &dyn Bridge,
        store: &mut Store<ExecCtx>,
        instance: &Instance,
    ) -> Result<bool> {
        if self.state == GuardState::Resolved {
            return Ok(false);
        }
        self.state = GuardState::Resolved;

        if store.data().exited() {
            return Ok(false);
        }

        warn!("guest returned without exiting, resuming with deadlock event");
        store.data_mut().set_pending_event(PendingEvent::DEADLOCK);
        bridge.resume(store, instance).await?;
        Ok(true)
    }
}

impl Default for DeadlockGuard {
    fn default() -> Self {
        Self::new()
    }
}
