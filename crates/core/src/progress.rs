//! Progress reporting boundary.

use async_trait::async_trait;

/// Receives `completed/total` percentages, one per finished batch.
/// Values are monotonically non-decreasing and end at 100.0. A sink must
/// not block the scheduler indefinitely.
#[async_trait]
pub trait ProgressSink: Send + Sync {
    async fn report(&self, percent: f64);
}

#[derive(Debug, Default)]
pub struct NoopSink;

#[async_trait]
impl ProgressSink for NoopSink {
    async fn report(&self, _percent: f64) {}
}

/// Logs each update through `tracing`.
#[derive(Debug, Default)]
pub struct LogSink;

#[async_trait]
impl ProgressSink for LogSink {
    async fn report(&self, percent: f64) {
        tracing::info!(percent, "fingerprint progress");
    }
}
