//! Ties discovery and fingerprinting together for one run.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::classifier::ContentClassifier;
use crate::config::AppConfig;
use crate::hasher::Blake3Hashing;
use crate::progress::ProgressSink;
use crate::scanner;
use crate::scheduler::{BatchScheduler, RunOutcome};
use crate::strategy::FingerprintStrategy;

#[derive(Debug, Clone, Copy, Default, serde::Serialize)]
pub struct PipelineSummary {
    pub discovered: usize,
    pub fingerprinted: usize,
    pub failed: usize,
}

impl PipelineSummary {
    pub fn of(outcome: &RunOutcome) -> Self {
        Self {
            discovered: outcome.files.len() + outcome.failures.len(),
            fingerprinted: outcome.files.len(),
            failed: outcome.failures.len(),
        }
    }
}

/// Enumerates `root` and fingerprints everything found, reporting progress
/// to `sink` after each batch.
pub async fn run(
    config: &AppConfig,
    root: &Path,
    sink: Arc<dyn ProgressSink>,
) -> anyhow::Result<RunOutcome> {
    info!("Starting discovery phase...");
    let records = scanner::enumerate(root, &config.scan.exclude)?;
    info!("Discovery complete. Found {} files.", records.len());

    let strategy = FingerprintStrategy::new(
        Arc::new(ContentClassifier),
        Arc::new(Blake3Hashing),
        config.engine.sample_count,
        config.engine.sample_size,
    );
    let timeout = match config.engine.file_timeout_secs {
        0 => None,
        secs => Some(Duration::from_secs(secs)),
    };
    let scheduler = BatchScheduler::new(
        Arc::new(strategy),
        sink,
        config.engine.batch_size,
        timeout,
    );

    info!("Starting fingerprint phase...");
    let outcome = scheduler.run(root, records).await?;
    info!(
        "Fingerprint complete. {} succeeded, {} failed.",
        outcome.files.len(),
        outcome.failures.len()
    );
    Ok(outcome)
}
