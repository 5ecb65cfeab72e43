//! Single-flight refresh gate
//!
//! Explicit state machine replacing the front-end's nullable shared
//! promise: `Idle` means no refresh is running, `InFlight` holds a shared
//! future every concurrent caller awaits. The gate owns no I/O — callers
//! supply the refresh future, the gate only decides whether to start it or
//! join the one already running.
//!
//! Invariant: for any number of concurrent callers, the supplied operation
//! is started at most once per wave, and every caller of that wave observes
//! the same `Result`. Completion (success or failure) resets the gate to
//! `Idle`, so the next 401 wave starts a fresh operation. Each operation is
//! tagged with an epoch so a slow waiter finishing late cannot clobber a
//! newer in-flight operation when it resets the state.

use std::sync::atomic::{AtomicU64, Ordering};

use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use tokio::sync::Mutex;
use tracing::debug;

use crate::tokens::TokenPair;

/// Why a refresh failed. Cloneable so one failure can reject every waiter
/// of the wave that shared it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RefreshError {
    #[error("no refresh token in session")]
    MissingToken,

    #[error("refresh rejected: {0}")]
    Rejected(String),

    #[error("refresh transport failure: {0}")]
    Transport(String),

    #[error("invalid refresh response: {0}")]
    Invalid(String),

    #[error("session store failure: {0}")]
    Store(String),
}

/// The future a caller supplies to [`RefreshGate::run`].
pub type RefreshFuture = BoxFuture<'static, Result<TokenPair, RefreshError>>;

type SharedRefresh = Shared<RefreshFuture>;

enum GateState {
    Idle,
    InFlight { epoch: u64, operation: SharedRefresh },
}

/// Collapses concurrent refresh attempts into one backend call.
pub struct RefreshGate {
    state: Mutex<GateState>,
    next_epoch: AtomicU64,
}

impl Default for RefreshGate {
    fn default() -> Self {
        Self::new()
    }
}

impl RefreshGate {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(GateState::Idle),
            next_epoch: AtomicU64::new(0),
        }
    }

    /// Await the in-flight refresh, or start one with `start` if the gate
    /// is idle. `start` is only invoked when this call initiates the wave.
    pub async fn run<F>(&self, start: F) -> Result<TokenPair, RefreshError>
    where
        F: FnOnce() -> RefreshFuture,
    {
        let (epoch, operation) = {
            let mut state = self.state.lock().await;
            match &*state {
                GateState::InFlight { epoch, operation } => {
                    debug!(epoch, "joining in-flight refresh");
                    (*epoch, operation.clone())
                }
                GateState::Idle => {
                    let epoch = self.next_epoch.fetch_add(1, Ordering::Relaxed);
                    debug!(epoch, "starting refresh");
                    let operation = start().shared();
                    *state = GateState::InFlight {
                        epoch,
                        operation: operation.clone(),
                    };
                    (epoch, operation)
                }
            }
        };

        let result = operation.await;

        // First waiter back resets the gate; the epoch check keeps a slow
        // waiter from clearing a newer operation.
        let mut state = self.state.lock().await;
        if matches!(&*state, GateState::InFlight { epoch: e, .. } if *e == epoch) {
            *state = GateState::Idle;
        }

        result
    }

    /// Whether no refresh is currently in flight.
    pub async fn is_idle(&self) -> bool {
        matches!(&*self.state.lock().await, GateState::Idle)
    }
}
