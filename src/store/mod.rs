//! Shared cache store
//!
//! The relay keeps its subscription and cache state in a key/value store
//! that is also, by default, the task queue's broker and result backend.
//! Configuration holds one live handle that dependents share.

pub mod redis;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

pub use self::redis::{RedisConnector, RedisStore};

/// Errors talking to the cache store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("connection failed: {0}")]
    Connection(String),

    #[error("backend error: {0}")]
    Backend(String),

    #[error("unexpected reply: {0}")]
    UnexpectedReply(String),
}

/// Key/value operations the relay needs from its cache store
#[async_trait]
pub trait CacheStore: Send + Sync + std::fmt::Debug {
    /// Liveness check
    async fn ping(&self) -> Result<(), StoreError>;

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Set a value; `ttl` of `None` keeps it until deleted
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), StoreError>;

    async fn delete(&self, key: &str) -> Result<(), StoreError>;

    /// Name of the backing implementation
    fn provider_name(&self) -> &'static str;
}

/// Opens cache store handles from a connection descriptor
#[async_trait]
pub trait StoreConnector: Send + Sync {
    async fn connect(
        &self,
        info: ::redis::ConnectionInfo,
    ) -> Result<Arc<dyn CacheStore>, StoreError>;
}
