use std::time::Duration;
use thiserror::Error;

/// A failure local to one file's fingerprint task. Recorded per path and
/// never allowed to abort the batch or the run.
#[derive(Debug, Error)]
pub enum FingerprintError {
    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    /// A classifier or hash implementation failed. The bundled ones are
    /// infallible; this is the escape hatch for alternate capabilities.
    #[error("tooling failed: {0}")]
    Tooling(String),
}
