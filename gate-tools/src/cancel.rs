//! Turn-scoped cancellation.

use tokio::sync::watch;

/// Owned by whoever drives a model turn. Cancelling it aborts every
/// invocation holding one of its tokens.
#[derive(Debug)]
pub struct TurnCancellation {
    tx: watch::Sender<bool>,
}

impl Default for TurnCancellation {
    fn default() -> Self {
        Self::new()
    }
}

impl TurnCancellation {
    /// Creates a live (not cancelled) turn.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    /// Hands out a token observing this turn.
    #[must_use]
    pub fn token(&self) -> CancelToken {
        CancelToken {
            rx: self.tx.subscribe(),
        }
    }

    /// Cancels the turn.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    /// Whether [`TurnCancellation::cancel`] was called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }
}

/// Observer side of a [`TurnCancellation`].
#[derive(Debug, Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    /// Whether the turn has been cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once the turn is cancelled. Never resolves if the turn
    /// finishes without being cancelled.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        loop {
            if *rx.borrow_and_update() {
                return;
            }
            if rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}
