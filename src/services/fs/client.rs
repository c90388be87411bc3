//! Filesystem access interface used by the probes.
use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;

/// Result type for filesystem operations.
pub type FsResult<T> = Result<T, FsError>;

#[derive(Debug, Error)]
pub enum FsError {
    #[error("filesystem i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// A minimal filesystem interface.
///
/// This is intentionally small: the liveness probe only needs
/// write / read-back / remove on a single scratch path. Keeping it a
/// trait lets tests drive the probe without touching a real disk.
#[async_trait]
pub trait FileStore: Send + Sync + 'static {
    // Write `contents` to `path`, overwriting any existing file.
    async fn write(&self, path: &Path, contents: &[u8]) -> FsResult<()>;

    // Read the whole file back.
    async fn read(&self, path: &Path) -> FsResult<Vec<u8>>;

    // Remove the file.
    //
    // Returns:
    // - `Ok(true)`  if the file was removed
    // - `Ok(false)` if there was nothing to remove
    async fn remove(&self, path: &Path) -> FsResult<bool>;
}
