pub mod client;
#[cfg(test)]
pub mod memory;
pub mod valkey;

pub use client::{CacheClient, CacheError, CacheResult};
pub use valkey::ValkeyClient;
