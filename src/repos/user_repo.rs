/*
 * Responsibility
 * - user record の取得 (exact-match lookup) と provisioning 用の書き込み
 * - store の値は境界で AccountRecord に変換・検証する (形が違えば LookupFailed)
 * - レコードは `<table>:<user id>` の list に JSON で格納される
 */
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::repos::error::{RepoError, RepoResult};
use crate::services::cache::{CacheClient, CacheError};

/// A user's stored identity.
///
/// `secret_keys` holds the stored representation of each key: a JSON string
/// decoded by [`StoredSecretKey::decode`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRecord {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_keys: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credits: Option<i64>,
}

impl AccountRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            secret_keys: None,
            credits: None,
        }
    }

    /// Credit balance; a record without one has 0.
    pub fn credits(&self) -> i64 {
        self.credits.unwrap_or(0)
    }

    pub fn push_key(&mut self, key: &StoredSecretKey) -> RepoResult<()> {
        let encoded = key.encode()?;
        self.secret_keys.get_or_insert_with(Vec::new).push(encoded);
        Ok(())
    }
}

/// One registered secret, as serialized inside `secret_keys`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSecretKey {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub value: String,
    #[serde(default)]
    pub disabled: bool,
}

impl StoredSecretKey {
    pub fn decode(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn encode(&self) -> RepoResult<String> {
        serde_json::to_string(self)
            .map_err(|e| RepoError::LookupFailed(CacheError::InvalidValue(e.to_string())))
    }
}

/// The lookup the authorizer depends on.
#[async_trait]
pub trait UserLookup: Send + Sync {
    async fn lookup(&self, username: &str) -> RepoResult<AccountRecord>;
}

#[derive(Clone, Debug)]
pub struct UserRepo<C: CacheClient> {
    cache: C,
    table: String,
}

impl<C: CacheClient> UserRepo<C> {
    pub fn new(cache: C, table: impl Into<String>) -> Self {
        Self {
            cache,
            table: table.into(),
        }
    }

    pub fn key(&self, username: &str) -> String {
        format!("{}:{}", self.table, username)
    }

    pub fn backend_name(&self) -> &'static str {
        self.cache.backend_name()
    }

    /// Store a new record. Fails if any record already exists for the id.
    ///
    /// The existence check and the write are a single store operation, so two
    /// concurrent creates for the same id leave exactly one record behind.
    pub async fn create(&self, record: &AccountRecord) -> RepoResult<()> {
        let key = self.key(&record.id);
        if !self.cache.push_if_empty(&key, &encode_record(record)?).await? {
            return Err(RepoError::AlreadyExists(record.id.clone()));
        }

        Ok(())
    }

    /// Read-modify-write of the single record stored for `username`.
    pub async fn update<F>(&self, username: &str, apply: F) -> RepoResult<AccountRecord>
    where
        F: FnOnce(&mut AccountRecord) -> RepoResult<()> + Send,
    {
        let key = self.key(username);
        let mut record = self.lookup(username).await?;
        apply(&mut record)?;
        self.cache
            .set_value_at(&key, 0, &encode_record(&record)?)
            .await?;

        Ok(record)
    }
}

#[async_trait]
impl<C: CacheClient> UserLookup for UserRepo<C> {
    async fn lookup(&self, username: &str) -> RepoResult<AccountRecord> {
        let values = self.cache.list_values(&self.key(username)).await?;

        match values.as_slice() {
            [] => Err(RepoError::UserNotFound(username.to_string())),
            [raw] => Ok(parse_record(raw, username)?),
            many => Err(RepoError::AmbiguousUser {
                username: username.to_string(),
                count: many.len(),
            }),
        }
    }
}

fn parse_record(raw: &str, username: &str) -> Result<AccountRecord, CacheError> {
    let record: AccountRecord = serde_json::from_str(raw)
        .map_err(|e| CacheError::InvalidValue(format!("user record: {e}")))?;

    if record.id != username {
        return Err(CacheError::InvalidValue(format!(
            "user record id {:?} does not match key",
            record.id
        )));
    }

    Ok(record)
}

fn encode_record(record: &AccountRecord) -> RepoResult<String> {
    serde_json::to_string(record)
        .map_err(|e| RepoError::LookupFailed(CacheError::InvalidValue(e.to_string())))
}
