use std::path::Path;

use async_trait::async_trait;

use crate::services::fs::client::{FileStore, FsResult};

/// Local-disk file store backed by `tokio::fs`.
#[derive(Clone, Debug, Default)]
pub struct LocalFileStore;

impl LocalFileStore {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn write(&self, path: &Path, contents: &[u8]) -> FsResult<()> {
        // The scratch path may live in a directory that does not exist yet
        // (e.g. tmp/ on a fresh deploy).
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(path, contents).await?;
        Ok(())
    }

    async fn read(&self, path: &Path) -> FsResult<Vec<u8>> {
        let contents = tokio::fs::read(path).await?;
        Ok(contents)
    }

    async fn remove(&self, path: &Path) -> FsResult<bool> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
