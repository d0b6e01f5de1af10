//! In-process `CacheClient` used by tests.
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::services::cache::client::{CacheClient, CacheError, CacheResult};

#[derive(Clone, Debug, Default)]
pub struct MemoryClient {
    lists: Arc<Mutex<HashMap<String, Vec<String>>>>,
    // When set, every command fails with this message.
    failure: Arc<Mutex<Option<String>>>,
}

impl MemoryClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_with(&self, message: &str) {
        *self.failure.lock().unwrap() = Some(message.to_string());
    }

    pub fn seed(&self, key: &str, value: &str) {
        self.lists
            .lock()
            .unwrap()
            .entry(key.to_string())
            .or_default()
            .push(value.to_string());
    }

    fn check(&self) -> CacheResult<()> {
        match self.failure.lock().unwrap().as_ref() {
            Some(msg) => Err(CacheError::BackendCommand(msg.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl CacheClient for MemoryClient {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn list_values(&self, key: &str) -> CacheResult<Vec<String>> {
        self.check()?;
        Ok(self
            .lists
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .unwrap_or_default())
    }

    async fn push_if_empty(&self, key: &str, value: &str) -> CacheResult<bool> {
        self.check()?;
        let mut lists = self.lists.lock().unwrap();
        let list = lists.entry(key.to_string()).or_default();
        if !list.is_empty() {
            return Ok(false);
        }
        list.push(value.to_string());
        Ok(true)
    }

    async fn set_value_at(&self, key: &str, index: u64, value: &str) -> CacheResult<()> {
        self.check()?;
        let mut lists = self.lists.lock().unwrap();
        let slot = lists
            .get_mut(key)
            .and_then(|list| list.get_mut(index as usize))
            .ok_or_else(|| CacheError::BackendCommand("ERR index out of range".into()))?;
        *slot = value.to_string();
        Ok(())
    }
}
