//! Incremental-hash capability, backed by blake3.

use tokio::io::{AsyncRead, AsyncReadExt};

/// One hash accumulator. Feed it chunks, then finalize once.
pub trait HashPrimitive: Send {
    fn update(&mut self, bytes: &[u8]);
    fn finalize(self: Box<Self>) -> String;
}

/// Hands out fresh accumulators; shared across concurrent tasks.
pub trait Hashing: Send + Sync {
    fn begin(&self) -> Box<dyn HashPrimitive>;
}

#[derive(Debug, Default)]
pub struct Blake3Hashing;

struct Blake3Primitive(blake3::Hasher);

impl HashPrimitive for Blake3Primitive {
    fn update(&mut self, bytes: &[u8]) {
        self.0.update(bytes);
    }

    fn finalize(self: Box<Self>) -> String {
        self.0.finalize().to_hex().to_string()
    }
}

impl Hashing for Blake3Hashing {
    fn begin(&self) -> Box<dyn HashPrimitive> {
        Box::new(Blake3Primitive(blake3::Hasher::new()))
    }
}

/// Hashes a reader to EOF in fixed-size chunks.
pub async fn hash_stream<R>(hashing: &dyn Hashing, reader: &mut R) -> std::io::Result<String>
where
    R: AsyncRead + Unpin + Send,
{
    let mut hasher = hashing.begin();
    let mut buf = [0u8; 8192];
    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finalize())
}
