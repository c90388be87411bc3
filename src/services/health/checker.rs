//! Probe orchestration for the liveness endpoint.
//!
//! Three round-trip probes run strictly in sequence (filesystem, then
//! database, then cache) and the first failure stops the chain. Each
//! probe writes a fresh random value, reads it back, and tears its
//! scratch state down again; a passing check leaves no residue.
//!
//! The probes share fixed scratch identifiers (one file path, one table,
//! one cache key), so they must never run concurrently within a request.
//! Two overlapping requests to the endpoint can still race on that
//! shared state; that is an accepted limitation.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::repos::error::RepoError;
use crate::services::cache::{CacheClient, CacheError};
use crate::services::fs::{FileStore, FsError};
use crate::services::health::datastore::ScratchDatastore;

/// Fixed key the cache probe writes under.
pub const SCRATCH_CACHE_KEY: &str = "alive:scratch";

/// Why a probe failed. The Display text is surfaced verbatim in the
/// response body, so each subsystem gets its own wording.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("scratch file has a mismatching random value")]
    FileMismatch,
    #[error("failed to remove the scratch file")]
    FileCleanup,
    #[error("filesystem error: {0}")]
    FileIo(String),

    #[error("scratch row did not receive an id from the database")]
    MissingRowId,
    #[error("scratch row from the database has a mismatching random value")]
    RowMismatch,
    #[error("database error: {0}")]
    Db(String),

    #[error("cache entry has a mismatching random value")]
    CacheMismatch,
    #[error("cache error: {0}")]
    CacheIo(String),
}

impl From<FsError> for ProbeError {
    fn from(e: FsError) -> Self {
        ProbeError::FileIo(e.to_string())
    }
}

impl From<RepoError> for ProbeError {
    fn from(e: RepoError) -> Self {
        ProbeError::Db(e.to_string())
    }
}

impl From<CacheError> for ProbeError {
    fn from(e: CacheError) -> Self {
        ProbeError::CacheIo(e.to_string())
    }
}

/// The aggregate liveness check, behind a trait so the HTTP layer can be
/// exercised with a mock checker.
#[async_trait]
pub trait HealthCheck: Send + Sync + 'static {
    async fn check(&self) -> Result<(), ProbeError>;
}

/// Disposable token written and read back by every probe.
///
/// SHA-256 over a nanosecond timestamp plus a process-local counter, so
/// two probes in the same request never reuse a value.
fn random_value() -> String {
    static COUNTER: AtomicU64 = AtomicU64::new(0);

    let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    let digest = Sha256::digest(format!("{nanos}:{n}"));

    URL_SAFE_NO_PAD.encode(digest)
}

/// Orchestrates the three probes against the injected collaborators.
pub struct HealthChecker<F, D, C> {
    files: F,
    datastore: D,
    cache: C,
    scratch_path: PathBuf,
}

impl<F, D, C> HealthChecker<F, D, C>
where
    F: FileStore,
    D: ScratchDatastore,
    C: CacheClient,
{
    pub fn new(files: F, datastore: D, cache: C, scratch_path: impl Into<PathBuf>) -> Self {
        Self {
            files,
            datastore,
            cache,
            scratch_path: scratch_path.into(),
        }
    }

    /// Write a token to the scratch file, read it back, remove the file.
    ///
    /// Removal is attempted even when the read-back mismatches, so a
    /// corrupted read does not leak the file onto disk.
    async fn check_filesystem(&self) -> Result<(), ProbeError> {
        let token = random_value();

        self.files
            .write(&self.scratch_path, token.as_bytes())
            .await?;
        let read_back = self.files.read(&self.scratch_path).await?;
        let removed = self.files.remove(&self.scratch_path).await?;

        if read_back != token.as_bytes() {
            return Err(ProbeError::FileMismatch);
        }
        if !removed {
            return Err(ProbeError::FileCleanup);
        }

        Ok(())
    }

    /// Recreate the scratch table, insert a token row, read it back by
    /// id, drop the table.
    ///
    /// The drop happens before the mismatch verdict: the table goes away
    /// on the failure path too, instead of waiting for the next run to
    /// clear it.
    async fn check_database(&self) -> Result<(), ProbeError> {
        let token = random_value();

        self.datastore.reset().await?;

        let id = self
            .datastore
            .insert(&token)
            .await?
            .ok_or(ProbeError::MissingRowId)?;
        let fetched = self.datastore.fetch(id).await?;

        self.datastore.drop_table().await?;

        if fetched.as_deref() != Some(token.as_str()) {
            return Err(ProbeError::RowMismatch);
        }

        Ok(())
    }

    /// Put a token under the fixed key (forced overwrite), read it back,
    /// remove the key. Removal precedes the mismatch verdict as well.
    async fn check_cache(&self) -> Result<(), ProbeError> {
        let token = random_value();

        self.cache
            .put_string(SCRATCH_CACHE_KEY, &token, true)
            .await?;
        let cached = self.cache.get_string(SCRATCH_CACHE_KEY).await?;

        self.cache.del(SCRATCH_CACHE_KEY).await?;

        if cached.as_deref() != Some(token.as_str()) {
            return Err(ProbeError::CacheMismatch);
        }

        Ok(())
    }
}

#[async_trait]
impl<F, D, C> HealthCheck for HealthChecker<F, D, C>
where
    F: FileStore,
    D: ScratchDatastore,
    C: CacheClient,
{
    async fn check(&self) -> Result<(), ProbeError> {
        // Strict short-circuit: a failed probe stops the chain.
        self.check_filesystem().await?;
        self.check_database().await?;
        self.check_cache().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;
    use std::path::Path;
    use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize};
    use std::sync::{Arc, Mutex};

    use crate::services::cache::client::CacheResult;
    use crate::services::fs::client::FsResult;

    // --- filesystem mock -------------------------------------------------

    #[derive(Clone, Default)]
    struct MockFiles {
        inner: Arc<MockFilesInner>,
    }

    #[derive(Default)]
    struct MockFilesInner {
        files: Mutex<HashMap<PathBuf, Vec<u8>>>,
        writes: AtomicUsize,
        corrupt_reads: AtomicBool,
        refuse_removal: AtomicBool,
    }

    impl MockFiles {
        fn corrupt_reads(self) -> Self {
            self.inner.corrupt_reads.store(true, Ordering::SeqCst);
            self
        }

        fn refuse_removal(self) -> Self {
            self.inner.refuse_removal.store(true, Ordering::SeqCst);
            self
        }

        fn write_count(&self) -> usize {
            self.inner.writes.load(Ordering::SeqCst)
        }

        fn is_empty(&self) -> bool {
            self.inner.files.lock().unwrap().is_empty()
        }
    }

    #[async_trait]
    impl FileStore for MockFiles {
        async fn write(&self, path: &Path, contents: &[u8]) -> FsResult<()> {
            self.inner.writes.fetch_add(1, Ordering::SeqCst);
            self.inner
                .files
                .lock()
                .unwrap()
                .insert(path.to_path_buf(), contents.to_vec());
            Ok(())
        }

        async fn read(&self, path: &Path) -> FsResult<Vec<u8>> {
            if self.inner.corrupt_reads.load(Ordering::SeqCst) {
                return Ok(b"corrupted".to_vec());
            }

            self.inner
                .files
                .lock()
                .unwrap()
                .get(path)
                .cloned()
                .ok_or_else(|| {
                    std::io::Error::new(std::io::ErrorKind::NotFound, "no scratch file").into()
                })
        }

        async fn remove(&self, path: &Path) -> FsResult<bool> {
            if self.inner.refuse_removal.load(Ordering::SeqCst) {
                return Ok(false);
            }

            Ok(self.inner.files.lock().unwrap().remove(path).is_some())
        }
    }

    // --- datastore mock --------------------------------------------------

    #[derive(Clone, Default)]
    struct MockDatastore {
        inner: Arc<MockDatastoreInner>,
    }

    #[derive(Default)]
    struct MockDatastoreInner {
        // None = no scratch table
        table: Mutex<Option<HashMap<i64, String>>>,
        next_id: AtomicI64,
        resets: AtomicUsize,
        withhold_id: AtomicBool,
        corrupt_fetch: AtomicBool,
    }

    impl MockDatastore {
        fn withhold_id(self) -> Self {
            self.inner.withhold_id.store(true, Ordering::SeqCst);
            self
        }

        fn corrupt_fetch(self) -> Self {
            self.inner.corrupt_fetch.store(true, Ordering::SeqCst);
            self
        }

        fn reset_count(&self) -> usize {
            self.inner.resets.load(Ordering::SeqCst)
        }

        fn table_exists(&self) -> bool {
            self.inner.table.lock().unwrap().is_some()
        }
    }

    #[async_trait]
    impl ScratchDatastore for MockDatastore {
        async fn reset(&self) -> Result<(), RepoError> {
            self.inner.resets.fetch_add(1, Ordering::SeqCst);
            *self.inner.table.lock().unwrap() = Some(HashMap::new());
            Ok(())
        }

        async fn insert(&self, random_value: &str) -> Result<Option<i64>, RepoError> {
            if self.inner.withhold_id.load(Ordering::SeqCst) {
                return Ok(None);
            }

            let id = self.inner.next_id.fetch_add(1, Ordering::SeqCst) + 1;
            self.inner
                .table
                .lock()
                .unwrap()
                .as_mut()
                .ok_or(RepoError::Db(sqlx::Error::RowNotFound))?
                .insert(id, random_value.to_string());

            Ok(Some(id))
        }

        async fn fetch(&self, id: i64) -> Result<Option<String>, RepoError> {
            if self.inner.corrupt_fetch.load(Ordering::SeqCst) {
                return Ok(Some("corrupted".to_string()));
            }

            Ok(self
                .inner
                .table
                .lock()
                .unwrap()
                .as_ref()
                .and_then(|t| t.get(&id).cloned()))
        }

        async fn drop_table(&self) -> Result<(), RepoError> {
            *self.inner.table.lock().unwrap() = None;
            Ok(())
        }
    }

    // --- cache mock --------------------------------------------------------

    #[derive(Clone, Default)]
    struct MockCache {
        inner: Arc<MockCacheInner>,
    }

    #[derive(Default)]
    struct MockCacheInner {
        entries: Mutex<HashMap<String, String>>,
        puts: AtomicUsize,
        dels: AtomicUsize,
        corrupt_get: AtomicBool,
    }

    impl MockCache {
        fn corrupt_get(self) -> Self {
            self.inner.corrupt_get.store(true, Ordering::SeqCst);
            self
        }

        fn put_count(&self) -> usize {
            self.inner.puts.load(Ordering::SeqCst)
        }

        fn del_count(&self) -> usize {
            self.inner.dels.load(Ordering::SeqCst)
        }

        fn is_empty(&self) -> bool {
            self.inner.entries.lock().unwrap().is_empty()
        }
    }

    #[async_trait]
    impl CacheClient for MockCache {
        fn backend_name(&self) -> &'static str {
            "mock"
        }

        async fn get_string(&self, key: &str) -> CacheResult<Option<String>> {
            if self.inner.corrupt_get.load(Ordering::SeqCst) {
                return Ok(Some("corrupted".to_string()));
            }

            Ok(self.inner.entries.lock().unwrap().get(key).cloned())
        }

        async fn put_string(&self, key: &str, value: &str, overwrite: bool) -> CacheResult<bool> {
            self.inner.puts.fetch_add(1, Ordering::SeqCst);

            let mut entries = self.inner.entries.lock().unwrap();
            if !overwrite && entries.contains_key(key) {
                return Ok(false);
            }

            entries.insert(key.to_string(), value.to_string());
            Ok(true)
        }

        async fn del(&self, key: &str) -> CacheResult<u64> {
            self.inner.dels.fetch_add(1, Ordering::SeqCst);

            Ok(u64::from(self.inner.entries.lock().unwrap().remove(key).is_some()))
        }
    }

    // --- tests -------------------------------------------------------------

    fn checker(
        files: MockFiles,
        datastore: MockDatastore,
        cache: MockCache,
    ) -> HealthChecker<MockFiles, MockDatastore, MockCache> {
        HealthChecker::new(files, datastore, cache, "tmp/alive_scratch")
    }

    #[tokio::test]
    async fn all_probes_pass_and_leave_no_residue() {
        let files = MockFiles::default();
        let datastore = MockDatastore::default();
        let cache = MockCache::default();
        let checker = checker(files.clone(), datastore.clone(), cache.clone());

        checker.check().await.unwrap();

        assert!(files.is_empty());
        assert!(!datastore.table_exists());
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn filesystem_mismatch_short_circuits_the_later_probes() {
        let files = MockFiles::default().corrupt_reads();
        let datastore = MockDatastore::default();
        let cache = MockCache::default();
        let checker = checker(files.clone(), datastore.clone(), cache.clone());

        let err = checker.check().await.unwrap_err();

        assert!(matches!(err, ProbeError::FileMismatch));
        assert_eq!(datastore.reset_count(), 0);
        assert_eq!(cache.put_count(), 0);
        // cleanup is unconditional: the corrupted file is gone anyway
        assert!(files.is_empty());
    }

    #[tokio::test]
    async fn failed_file_removal_is_its_own_failure() {
        let files = MockFiles::default().refuse_removal();
        let checker = checker(files, MockDatastore::default(), MockCache::default());

        let err = checker.check().await.unwrap_err();

        assert!(matches!(err, ProbeError::FileCleanup));
    }

    #[tokio::test]
    async fn missing_row_id_fails_the_database_probe() {
        let datastore = MockDatastore::default().withhold_id();
        let cache = MockCache::default();
        let checker = checker(MockFiles::default(), datastore, cache.clone());

        let err = checker.check().await.unwrap_err();

        assert!(matches!(err, ProbeError::MissingRowId));
        assert_eq!(cache.put_count(), 0);
    }

    #[tokio::test]
    async fn database_mismatch_skips_cache_and_still_drops_the_table() {
        let datastore = MockDatastore::default().corrupt_fetch();
        let cache = MockCache::default();
        let checker = checker(MockFiles::default(), datastore.clone(), cache.clone());

        let err = checker.check().await.unwrap_err();

        assert!(matches!(err, ProbeError::RowMismatch));
        assert_eq!(cache.put_count(), 0);
        assert!(!datastore.table_exists());
    }

    #[tokio::test]
    async fn cache_mismatch_still_removes_the_key() {
        let cache = MockCache::default().corrupt_get();
        let checker = checker(MockFiles::default(), MockDatastore::default(), cache.clone());

        let err = checker.check().await.unwrap_err();

        assert!(matches!(err, ProbeError::CacheMismatch));
        assert_eq!(cache.del_count(), 1);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn repeated_checks_classify_identically() {
        let files = MockFiles::default();
        let checker = checker(files.clone(), MockDatastore::default(), MockCache::default());

        checker.check().await.unwrap();
        checker.check().await.unwrap();

        // one write per run; no state from the first run leaked into the second
        assert_eq!(files.write_count(), 2);
        assert!(files.is_empty());
    }

    #[tokio::test]
    async fn repeated_failures_classify_identically_too() {
        let datastore = MockDatastore::default().corrupt_fetch();
        let checker = checker(MockFiles::default(), datastore, MockCache::default());

        assert!(matches!(
            checker.check().await.unwrap_err(),
            ProbeError::RowMismatch
        ));
        assert!(matches!(
            checker.check().await.unwrap_err(),
            ProbeError::RowMismatch
        ));
    }

    #[test]
    fn random_values_are_fresh_per_invocation() {
        let a = random_value();
        let b = random_value();

        assert_ne!(a, b);
        // base64url of a SHA-256 digest, no padding
        assert_eq!(a.len(), 43);
    }

    #[test]
    fn probe_errors_name_their_subsystem() {
        assert!(ProbeError::FileMismatch.to_string().contains("file"));
        assert!(ProbeError::RowMismatch.to_string().contains("database"));
        assert!(ProbeError::CacheMismatch.to_string().contains("cache"));
    }
}
