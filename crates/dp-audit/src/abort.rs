//! External cancellation for long-running audits
//!
//! A single [`AbortHandle`] flips a watch channel; every clone of the paired
//! [`AbortSignal`] observes it. Work in progress is raced against the signal
//! so a hung warehouse call does not stall an interrupted run.

use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;

/// Returned by [`AbortSignal::guard`] when the signal fired first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("operation aborted")]
pub struct Aborted;

/// Triggers the paired [`AbortSignal`]
#[derive(Debug, Clone)]
pub struct AbortHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl AbortHandle {
    /// Fire the signal. Idempotent.
    pub fn abort(&self) {
        self.tx.send_replace(true);
    }
}

/// Observes an abort request
#[derive(Debug, Clone)]
pub struct AbortSignal {
    rx: watch::Receiver<bool>,
}

impl AbortSignal {
    /// Create a connected handle/signal pair
    pub fn pair() -> (AbortHandle, AbortSignal) {
        let (tx, rx) = watch::channel(false);
        (AbortHandle { tx: Arc::new(tx) }, AbortSignal { rx })
    }

    /// A signal that never fires
    pub fn never() -> Self {
        let (_handle, signal) = Self::pair();
        signal
    }

    /// A signal that fires on the first Ctrl-C. Must be called inside a tokio runtime.
    pub fn ctrl_c() -> Self {
        let (handle, signal) = Self::pair();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                log::warn!("Interrupt received, stopping after the current step");
                handle.abort();
            }
        });
        signal
    }

    /// Whether the signal has fired
    pub fn is_aborted(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve once the signal fires; never resolves if it cannot fire anymore.
    pub async fn aborted(&self) {
        let mut rx = self.rx.clone();
        if rx.wait_for(|aborted| *aborted).await.is_err() {
            // Every handle is gone and the flag was never set.
            std::future::pending::<()>().await;
        }
    }

    /// Run `fut` unless the signal fires first.
    pub async fn guard<F: Future>(&self, fut: F) -> Result<F::Output, Aborted> {
        if self.is_aborted() {
            return Err(Aborted);
        }
        tokio::select! {
            biased;
            _ = self.aborted() => Err(Aborted),
            output = fut => Ok(output),
        }
    }
}
