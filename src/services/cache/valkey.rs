use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::OnceCell;

use crate::services::cache::client::{CacheClient, CacheError, CacheResult};

const PUSH_IF_EMPTY_SCRIPT: &str = r#"
if redis.call('LLEN', KEYS[1]) == 0 then
  redis.call('RPUSH', KEYS[1], ARGV[1])
  return 1
end
return 0
"#;

/// Valkey/Redis-backend client.
///
/// The connection is opened on first use and shared by every clone for the
/// rest of the process lifetime. Concurrent first calls race on the
/// `OnceCell`, so only one connection manager is ever built.
#[derive(Clone, Debug)]
pub struct ValkeyClient {
    client: redis::Client,
    manager: Arc<OnceCell<redis::aio::ConnectionManager>>,
}

impl ValkeyClient {
    // Validate a URL like `redis://localhost:6379`. Does not connect yet.
    pub fn new(url: &str) -> Result<Self, CacheError> {
        let client =
            redis::Client::open(url).map_err(|e| CacheError::BackendConnection(e.to_string()))?;

        Ok(Self {
            client,
            manager: Arc::new(OnceCell::new()),
        })
    }

    async fn connection(&self) -> CacheResult<redis::aio::ConnectionManager> {
        let manager = self
            .manager
            .get_or_try_init(|| async {
                tracing::info!("opening valkey connection");
                self.client
                    .get_connection_manager()
                    .await
                    .map_err(|e| CacheError::BackendConnection(e.to_string()))
            })
            .await?;

        // ConnectionManager is a cheap handle over the shared multiplexed connection.
        Ok(manager.clone())
    }
}

#[async_trait]
impl CacheClient for ValkeyClient {
    fn backend_name(&self) -> &'static str {
        "valkey"
    }

    async fn list_values(&self, key: &str) -> CacheResult<Vec<String>> {
        let mut conn = self.connection().await?;

        let values: Vec<String> = redis::cmd("LRANGE")
            .arg(key)
            .arg(0)
            .arg(-1)
            .query_async(&mut conn)
            .await
            .map_err(|e| CacheError::BackendCommand(e.to_string()))?;

        Ok(values)
    }

    async fn push_if_empty(&self, key: &str, value: &str) -> CacheResult<bool> {
        let mut conn = self.connection().await?;

        // The script runs atomically on the server: 1 if pushed, 0 otherwise.
        let pushed: u64 = redis::cmd("EVAL")
            .arg(PUSH_IF_EMPTY_SCRIPT)
            .arg(1)
            .arg(key)
            .arg(value)
            .query_async(&mut conn)
            .await
            .map_err(|e| CacheError::BackendCommand(e.to_string()))?;

        Ok(pushed == 1)
    }

    async fn set_value_at(&self, key: &str, index: u64, value: &str) -> CacheResult<()> {
        let mut conn = self.connection().await?;

        let _: () = redis::cmd("LSET")
            .arg(key)
            .arg(index)
            .arg(value)
            .query_async(&mut conn)
            .await
            .map_err(|e| CacheError::BackendCommand(e.to_string()))?;

        Ok(())
    }
}
