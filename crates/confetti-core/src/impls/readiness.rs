//! Readiness gates.
//!
//! `ReadySignal` is flipped by the transport once its connection is up;
//! every waiter (current and future) is released.

use async_trait::async_trait;
use tokio::sync::watch;

use crate::ports::ReadinessGate;

/// Gate that is open from the start (tests, console transport).
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysReady;

#[async_trait]
impl ReadinessGate for AlwaysReady {
    async fn await_ready(&self) {}
}

/// One-shot readiness latch backed by a `watch` channel.
#[derive(Debug)]
pub struct ReadySignal {
    tx: watch::Sender<bool>,
}

impl ReadySignal {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    /// A signal that is already open.
    pub fn ready() -> Self {
        let signal = Self::new();
        signal.mark_ready();
        signal
    }

    pub fn mark_ready(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_ready(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Default for ReadySignal {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReadinessGate for ReadySignal {
    async fn await_ready(&self) {
        let mut rx = self.tx.subscribe();
        // Err only if the sender is gone, which cannot happen while `self` lives.
        let _ = rx.wait_for(|ready| *ready).await;
    }
}
