//! Cache client interface used by the probes.
use async_trait::async_trait;
use thiserror::Error;

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Cache-layer errors (transport/command).
///
/// Kept independent from the probe error type so callers decide how to
/// fail (the liveness probe fails the whole check; other features may
/// prefer fail-open).
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache connection error: {0}")]
    BackendConnection(String),
    #[error("cache command error: {0}")]
    BackendCommand(String),
}

/// A minimal cache interface.
///
/// This is intentionally small and string-based:
/// - The liveness probe only needs `SET` (forced overwrite), `GET` and `DEL`.
/// - Other features can add methods later, but keep the surface area small.
///
/// Implementations must be cheap to clone (typically `Arc<...>` inside).
#[async_trait]
pub trait CacheClient: Clone + Send + Sync + 'static {
    // Returns the cache backend name (for logging/metrics).
    fn backend_name(&self) -> &'static str;

    // Get UTF-8 string value.
    async fn get_string(&self, key: &str) -> CacheResult<Option<String>>;

    // Store a value under `key`.
    //
    // Returns:
    // - `Ok(true)`  if the value was written
    // - `Ok(false)` if `overwrite` was false and the key already exists
    async fn put_string(&self, key: &str, value: &str, overwrite: bool) -> CacheResult<bool>;

    // Delete a key. Returns number of deleted keys.
    async fn del(&self, key: &str) -> CacheResult<u64>;
}
