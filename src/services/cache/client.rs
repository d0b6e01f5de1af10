//! Key-value client interface used by the user record repository.
use async_trait::async_trait;
use thiserror::Error;

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Store-layer errors (transport/command/value shape).
///
/// Note:
/// - Kept independent from `AppError`: the authorizer collapses every one of
///   these into a Deny, while the admin tool reports them verbatim.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache connection error: {0}")]
    BackendConnection(String),
    #[error("cache command error: {0}")]
    BackendCommand(String),
    #[error("cache value error: {0}")]
    InvalidValue(String),
}

/// A minimal list-oriented key-value interface.
///
/// Each key holds an ordered list of UTF-8 values. User records are stored
/// one list per user id, so a lookup can observe zero, one or several records.
///
/// Implementations must be cheap to clone (typically `Arc<...>` inside).
#[async_trait]
pub trait CacheClient: Clone + Send + Sync + 'static {
    // Returns the cache backend name (for logging).
    fn backend_name(&self) -> &'static str;

    // All values stored under `key`, in insertion order. Missing key => empty.
    async fn list_values(&self, key: &str) -> CacheResult<Vec<String>>;

    // Append a value only if the list is empty or missing, as one atomic step.
    // Returns true if the value was stored.
    async fn push_if_empty(&self, key: &str, value: &str) -> CacheResult<bool>;

    // Overwrite the value at `index`.
    async fn set_value_at(&self, key: &str, index: u64, value: &str) -> CacheResult<()>;
}
