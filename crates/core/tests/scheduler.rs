use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use fingerprint_core::classifier::ContentClassifier;
use fingerprint_core::error::FingerprintError;
use fingerprint_core::hasher::Blake3Hashing;
use fingerprint_core::models::FileRecord;
use fingerprint_core::progress::ProgressSink;
use fingerprint_core::scheduler::BatchScheduler;
use fingerprint_core::strategy::{Fingerprinter, FingerprintStrategy};

/// Instrumented stand-in for the real strategy: tracks how many tasks are in
/// flight, which paths had finished when each task started, and fails or
/// stalls on request.
#[derive(Default)]
struct MockFingerprinter {
    delay: Option<Duration>,
    slow: HashSet<String>,
    fail: HashSet<String>,
    tooling_fail: HashSet<String>,
    active: AtomicUsize,
    max_active: AtomicUsize,
    finished: Mutex<HashSet<String>>,
    finished_at_start: Mutex<HashMap<String, HashSet<String>>>,
}

impl MockFingerprinter {
    fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }
}

#[async_trait]
impl Fingerprinter for MockFingerprinter {
    async fn fingerprint_file(&self, path: &Path, _size: i64) -> Result<String, FingerprintError> {
        let name = path.to_string_lossy().replace('\\', "/");

        let seen = self.finished.lock().unwrap().clone();
        self.finished_at_start
            .lock()
            .unwrap()
            .insert(name.clone(), seen);

        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.slow.contains(&name) {
            tokio::time::sleep(Duration::from_secs(60)).await;
        }
        self.active.fetch_sub(1, Ordering::SeqCst);

        self.finished.lock().unwrap().insert(name.clone());
        if self.fail.contains(&name) {
            return Err(FingerprintError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "denied",
            )));
        }
        if self.tooling_fail.contains(&name) {
            return Err(FingerprintError::Tooling("hash backend unavailable".into()));
        }
        Ok(format!("digest-{name}"))
    }
}

#[derive(Default)]
struct RecordingSink(Mutex<Vec<f64>>);

#[async_trait]
impl ProgressSink for RecordingSink {
    async fn report(&self, percent: f64) {
        self.0.lock().unwrap().push(percent);
    }
}

fn records(names: &[&str]) -> Vec<FileRecord> {
    names
        .iter()
        .map(|n| FileRecord::new(*n, 100, 0, 0))
        .collect()
}

#[tokio::test]
async fn concurrency_never_exceeds_the_batch_width() {
    let mock = Arc::new(MockFingerprinter::with_delay(Duration::from_millis(25)));
    let scheduler = BatchScheduler::new(
        Arc::clone(&mock) as Arc<dyn Fingerprinter>,
        Arc::new(RecordingSink::default()),
        2,
        None,
    );

    let outcome = scheduler
        .run(Path::new(""), records(&["f0", "f1", "f2", "f3", "f4"]))
        .await
        .unwrap();

    assert_eq!(outcome.files.len(), 5);
    assert!(mock.max_active.load(Ordering::SeqCst) <= 2);
}

#[tokio::test]
async fn no_task_starts_before_the_previous_batch_finished() {
    let mock = Arc::new(MockFingerprinter::with_delay(Duration::from_millis(10)));
    let scheduler = BatchScheduler::new(
        Arc::clone(&mock) as Arc<dyn Fingerprinter>,
        Arc::new(RecordingSink::default()),
        2,
        None,
    );

    scheduler
        .run(Path::new(""), records(&["f0", "f1", "f2", "f3"]))
        .await
        .unwrap();

    let snapshots = mock.finished_at_start.lock().unwrap();
    for name in ["f2", "f3"] {
        let seen = &snapshots[name];
        assert!(
            seen.contains("f0") && seen.contains("f1"),
            "{name} started before batch 1 drained: saw {seen:?}"
        );
    }
}

#[tokio::test]
async fn one_bad_file_does_not_abort_the_run() {
    let mock = Arc::new(MockFingerprinter {
        fail: HashSet::from(["f1".to_string()]),
        ..MockFingerprinter::default()
    });
    let scheduler = BatchScheduler::new(
        mock as Arc<dyn Fingerprinter>,
        Arc::new(RecordingSink::default()),
        100,
        None,
    );

    let outcome = scheduler
        .run(Path::new(""), records(&["f0", "f1", "f2"]))
        .await
        .unwrap();

    assert_eq!(outcome.files.len(), 2);
    assert!(!outcome.files["f0"].fingerprint.is_empty());
    assert!(!outcome.files["f2"].fingerprint.is_empty());
    assert!(matches!(outcome.failures["f1"], FingerprintError::Io(_)));
}

#[tokio::test]
async fn a_tooling_failure_is_local_to_its_file() {
    let mock = Arc::new(MockFingerprinter {
        tooling_fail: HashSet::from(["f1".to_string()]),
        ..MockFingerprinter::default()
    });
    let scheduler = BatchScheduler::new(
        mock as Arc<dyn Fingerprinter>,
        Arc::new(RecordingSink::default()),
        100,
        None,
    );

    let outcome = scheduler
        .run(Path::new(""), records(&["f0", "f1", "f2"]))
        .await
        .unwrap();

    assert_eq!(outcome.files.len(), 2);
    assert!(matches!(
        outcome.failures["f1"],
        FingerprintError::Tooling(_)
    ));
}

#[tokio::test]
async fn progress_is_monotonic_and_ends_at_one_hundred() {
    let sink = Arc::new(RecordingSink::default());
    let scheduler = BatchScheduler::new(
        Arc::new(MockFingerprinter::default()) as Arc<dyn Fingerprinter>,
        Arc::clone(&sink) as Arc<dyn ProgressSink>,
        2,
        None,
    );

    scheduler
        .run(Path::new(""), records(&["f0", "f1", "f2", "f3", "f4"]))
        .await
        .unwrap();

    let reports = sink.0.lock().unwrap().clone();
    assert_eq!(reports, vec![40.0, 80.0, 100.0]);
    assert!(reports.windows(2).all(|w| w[0] <= w[1]));
}

#[tokio::test]
async fn empty_input_still_reports_completion() {
    let sink = Arc::new(RecordingSink::default());
    let scheduler = BatchScheduler::new(
        Arc::new(MockFingerprinter::default()) as Arc<dyn Fingerprinter>,
        Arc::clone(&sink) as Arc<dyn ProgressSink>,
        100,
        None,
    );

    let outcome = scheduler.run(Path::new(""), Vec::new()).await.unwrap();

    assert!(outcome.files.is_empty());
    assert!(outcome.failures.is_empty());
    assert_eq!(*sink.0.lock().unwrap(), vec![100.0]);
}

#[tokio::test]
async fn a_hung_file_times_out_without_stalling_the_others() {
    let mock = Arc::new(MockFingerprinter {
        slow: HashSet::from(["f1".to_string()]),
        ..MockFingerprinter::default()
    });
    let scheduler = BatchScheduler::new(
        mock as Arc<dyn Fingerprinter>,
        Arc::new(RecordingSink::default()),
        100,
        Some(Duration::from_millis(50)),
    );

    let outcome = scheduler
        .run(Path::new(""), records(&["f0", "f1", "f2"]))
        .await
        .unwrap();

    assert_eq!(outcome.files.len(), 2);
    assert!(matches!(
        outcome.failures["f1"],
        FingerprintError::Timeout(_)
    ));
}

#[tokio::test]
async fn scheduler_drives_the_real_strategy_over_a_directory() {
    let temp = tempfile::tempdir().unwrap();
    std::fs::write(temp.path().join("a.txt"), "hello").unwrap();
    std::fs::write(temp.path().join("b.bin"), [0u8, 1, 2, 3, 4, 5]).unwrap();

    let strategy = FingerprintStrategy::new(
        Arc::new(ContentClassifier),
        Arc::new(Blake3Hashing),
        5,
        1024,
    );
    let scheduler = BatchScheduler::new(
        Arc::new(strategy) as Arc<dyn Fingerprinter>,
        Arc::new(RecordingSink::default()),
        100,
        None,
    );

    let mut input = records(&["a.txt", "b.bin"]);
    input.push(FileRecord::new("missing.bin", 10, 0, 0));

    let outcome = scheduler.run(temp.path(), input).await.unwrap();

    assert_eq!(outcome.files.len(), 2);
    assert!(!outcome.files["a.txt"].fingerprint.is_empty());
    assert!(!outcome.files["b.bin"].fingerprint.is_empty());
    assert!(matches!(
        outcome.failures["missing.bin"],
        FingerprintError::Io(_)
    ));
}
