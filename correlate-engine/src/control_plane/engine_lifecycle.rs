//! Engine lifecycle state machine: created -> started -> stopped.

use crate::engine::EngineError;
use tokio::sync::Mutex;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum LifecycleState {
    Created,
    Started,
    Stopped,
}

/// Two-phase lifecycle guard for the engine.
///
/// The state advances before the cascade to the cache directory and rules
/// runs; a cascade failure leaves the engine in an undefined state by
/// contract, so no rollback is attempted. `Stopped` is terminal.
pub(crate) struct EngineLifecycle {
    state: Mutex<LifecycleState>,
}

impl EngineLifecycle {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(LifecycleState::Created),
        }
    }

    /// Returns `true` when the caller should run the start cascade, `false`
    /// when the engine is already started.
    pub(crate) async fn begin_start(&self) -> Result<bool, EngineError> {
        let mut state = self.state.lock().await;
        match *state {
            LifecycleState::Stopped => Err(EngineError::Stopped),
            LifecycleState::Started => Ok(false),
            LifecycleState::Created => {
                *state = LifecycleState::Started;
                Ok(true)
            }
        }
    }

    /// Returns `true` when the caller should run the stop cascade, `false`
    /// when the engine is already stopped.
    pub(crate) async fn begin_stop(&self) -> bool {
        let mut state = self.state.lock().await;
        if *state == LifecycleState::Stopped {
            return false;
        }
        *state = LifecycleState::Stopped;
        true
    }

    #[cfg(test)]
    pub(crate) async fn current(&self) -> LifecycleState {
        *self.state.lock().await
    }
}
