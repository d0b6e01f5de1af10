/**
 * Responsibility
 * - repo が上位に伝える意味の定義
 */
use thiserror::Error;

use crate::services::cache::CacheError;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("no user with id {0} found")]
    UserNotFound(String),

    // The store holds more than one record for a primary key.
    #[error("too many results for user {username} ({count})")]
    AmbiguousUser { username: String, count: usize },

    // Transport failure or a record that does not match the schema.
    #[error("user lookup failed: {0}")]
    LookupFailed(#[from] CacheError),

    #[error("user {0} already exists")]
    AlreadyExists(String),

    #[error("user {username} has no key {key_id}")]
    KeyNotFound { username: String, key_id: String },
}

pub type RepoResult<T> = Result<T, RepoError>;
