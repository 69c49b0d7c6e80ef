//! ReadinessGate port - transport connection readiness.

use async_trait::async_trait;

/// The scheduler does not run its first cycle before `await_ready` resolves.
#[async_trait]
pub trait ReadinessGate: Send + Sync {
    async fn await_ready(&self);
}
