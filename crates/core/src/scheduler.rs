//! Runs fingerprint tasks in bounded, barrier-synchronized batches.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::error::FingerprintError;
use crate::models::FileRecord;
use crate::progress::ProgressSink;
use crate::strategy::Fingerprinter;

/// Everything one run produced: successfully fingerprinted records keyed by
/// path, and the per-file failures that did not stop the run.
#[derive(Debug, Default)]
pub struct RunOutcome {
    pub files: HashMap<String, FileRecord>,
    pub failures: HashMap<String, FingerprintError>,
}

pub struct BatchScheduler {
    fingerprinter: Arc<dyn Fingerprinter>,
    sink: Arc<dyn ProgressSink>,
    batch_size: usize,
    file_timeout: Option<Duration>,
}

impl BatchScheduler {
    pub fn new(
        fingerprinter: Arc<dyn Fingerprinter>,
        sink: Arc<dyn ProgressSink>,
        batch_size: usize,
        file_timeout: Option<Duration>,
    ) -> Self {
        Self {
            fingerprinter,
            sink,
            batch_size: batch_size.max(1),
            file_timeout,
        }
    }

    /// Fingerprints `records` in consecutive batches of at most `batch_size`
    /// concurrent tasks. A batch must drain completely before the next one
    /// starts, which caps open file handles at `batch_size`. One progress
    /// update is emitted per finished batch.
    ///
    /// Per-file errors are recorded in the outcome; only a task that fails
    /// to join (a panic) aborts the run.
    pub async fn run(&self, root: &Path, records: Vec<FileRecord>) -> anyhow::Result<RunOutcome> {
        let total = records.len();
        let mut outcome = RunOutcome::default();
        if total == 0 {
            self.sink.report(100.0).await;
            return Ok(outcome);
        }

        let mut completed = 0usize;
        for batch in records.chunks(self.batch_size) {
            let mut tasks: JoinSet<(FileRecord, Result<String, FingerprintError>)> = JoinSet::new();
            for record in batch {
                let record = record.clone();
                let abs = root.join(&record.path);
                let fingerprinter = Arc::clone(&self.fingerprinter);
                let timeout = self.file_timeout;
                tasks.spawn(async move {
                    let res = match timeout {
                        Some(limit) => {
                            match tokio::time::timeout(
                                limit,
                                fingerprinter.fingerprint_file(&abs, record.size),
                            )
                            .await
                            {
                                Ok(res) => res,
                                Err(_) => Err(FingerprintError::Timeout(limit)),
                            }
                        }
                        None => fingerprinter.fingerprint_file(&abs, record.size).await,
                    };
                    (record, res)
                });
            }

            // Barrier: every task of this batch finishes before the next
            // batch spawns.
            while let Some(joined) = tasks.join_next().await {
                let (mut record, res) =
                    joined.map_err(|e| anyhow!("fingerprint task did not complete: {e}"))?;
                completed += 1;
                match res {
                    Ok(digest) => {
                        record.fingerprint = digest;
                        outcome.files.insert(record.path.clone(), record);
                    }
                    Err(err) => {
                        warn!(path = %record.path, error = %err, "fingerprint failed");
                        outcome.failures.insert(record.path.clone(), err);
                    }
                }
            }

            let percent = (completed as f64 / total as f64 * 100.0 * 100.0).round() / 100.0;
            debug!(completed, total, percent, "batch complete");
            self.sink.report(percent).await;
        }

        Ok(outcome)
    }
}
