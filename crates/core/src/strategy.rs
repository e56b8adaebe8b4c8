//! Picks and runs one of three hashing tactics for a single file.
//!
//! Text files are hashed in full regardless of size: exactness matters more
//! than speed there, and sampling near-identical text would collide. Small
//! non-text files are also hashed in full. Large binaries get a sampled
//! fingerprint: a fixed number of fixed-size windows at evenly spaced
//! offsets. Two large binaries that differ only between the windows will
//! collide; that trade is intentional.

use std::io::SeekFrom;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeek, AsyncSeekExt};

use crate::classifier::{TypeClassifier, TypeTag};
use crate::error::FingerprintError;
use crate::hasher::{self, Hashing};

/// Bytes handed to the classifier before any tactic runs.
const SNIFF_LEN: usize = 2048;

/// Fingerprints one record. The scheduler only sees this seam, so tests can
/// substitute an instrumented implementation.
#[async_trait]
pub trait Fingerprinter: Send + Sync {
    async fn fingerprint_file(&self, path: &Path, size: i64) -> Result<String, FingerprintError>;
}

pub struct FingerprintStrategy {
    classifier: Arc<dyn TypeClassifier>,
    hashing: Arc<dyn Hashing>,
    sample_count: u32,
    sample_size: u32,
}

impl FingerprintStrategy {
    pub fn new(
        classifier: Arc<dyn TypeClassifier>,
        hashing: Arc<dyn Hashing>,
        sample_count: u32,
        sample_size: u32,
    ) -> Self {
        Self {
            classifier,
            hashing,
            sample_count: sample_count.max(1),
            sample_size: sample_size.max(1),
        }
    }

    /// Below this size, non-text content is hashed in full.
    fn small_threshold(&self) -> i64 {
        i64::from(self.sample_count) * i64::from(self.sample_size)
    }

    /// Fingerprints an open stream positioned at offset 0. `size` is the
    /// length declared at enumeration time; it is trusted even if the file
    /// has changed since.
    pub async fn fingerprint<R>(&self, reader: &mut R, size: i64) -> Result<String, FingerprintError>
    where
        R: AsyncRead + AsyncSeek + Unpin + Send,
    {
        let mut sniff = vec![0u8; SNIFF_LEN];
        let n = read_up_to(reader, &mut sniff).await?;
        reader.seek(SeekFrom::Start(0)).await?;

        if self.classifier.guess(&sniff[..n]) == TypeTag::Text {
            return Ok(hasher::hash_stream(self.hashing.as_ref(), reader).await?);
        }

        // Also catches size <= 0 from bad metadata, so the sampled branch
        // never computes offsets from a non-positive size.
        if size < self.small_threshold() {
            return self.full(reader).await;
        }

        self.sampled(reader, size).await
    }

    async fn full<R>(&self, reader: &mut R) -> Result<String, FingerprintError>
    where
        R: AsyncRead + Unpin + Send,
    {
        let mut content = Vec::new();
        reader.read_to_end(&mut content).await?;
        let mut hasher = self.hashing.begin();
        hasher.update(&content);
        Ok(hasher.finalize())
    }

    async fn sampled<R>(&self, reader: &mut R, size: i64) -> Result<String, FingerprintError>
    where
        R: AsyncRead + AsyncSeek + Unpin + Send,
    {
        let mut hasher = self.hashing.begin();
        let mut chunk = vec![0u8; self.sample_size as usize];
        for step in 0..self.sample_count {
            // Real-valued division, truncated toward zero for the seek target.
            let offset = (f64::from(step) * size as f64 / f64::from(self.sample_count)) as u64;
            reader.seek(SeekFrom::Start(offset)).await?;
            let n = read_up_to(reader, &mut chunk).await?;
            hasher.update(&chunk[..n]);
        }
        Ok(hasher.finalize())
    }
}

#[async_trait]
impl Fingerprinter for FingerprintStrategy {
    async fn fingerprint_file(&self, path: &Path, size: i64) -> Result<String, FingerprintError> {
        // The handle is owned by this task and dropped on every exit path.
        let mut file = tokio::fs::File::open(path).await?;
        self.fingerprint(&mut file, size).await
    }
}

/// Reads until `buf` is full or EOF; returns the bytes read. Unlike
/// `read_exact`, a short file is not an error.
async fn read_up_to<R>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<usize>
where
    R: AsyncRead + Unpin,
{
    let mut filled = 0;
    while filled < buf.len() {
        let n = reader.read(&mut buf[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}
