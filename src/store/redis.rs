//! Redis cache store
//!
//! Uses `redis::aio::MultiplexedConnection`, a cloneable connection that is
//! safe to share across tasks. The initial connect is attempted once; a
//! store that is down at startup is reported immediately.

use super::{CacheStore, StoreConnector, StoreError};
use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::ConnectionInfo;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Redis-backed cache store
#[derive(Clone)]
pub struct RedisStore {
    connection: MultiplexedConnection,
}

impl std::fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStore")
            .field("connection", &"MultiplexedConnection")
            .finish()
    }
}

impl RedisStore {
    /// Open a multiplexed connection for `info`
    pub async fn connect(info: ConnectionInfo) -> Result<Self, StoreError> {
        let client = redis::Client::open(info).map_err(|e| {
            StoreError::Connection(format!("Failed to create Redis client: {}", e))
        })?;

        let connection = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| StoreError::Connection(format!("Failed to connect to Redis: {}", e)))?;

        Ok(Self { connection })
    }

    /// Clone of the underlying connection for direct command use
    pub fn connection(&self) -> MultiplexedConnection {
        self.connection.clone()
    }
}

#[async_trait]
impl CacheStore for RedisStore {
    async fn ping(&self) -> Result<(), StoreError> {
        let mut conn = self.connection.clone();
        let pong: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| StoreError::Backend(format!("Redis PING failed: {}", e)))?;

        if pong == "PONG" {
            Ok(())
        } else {
            Err(StoreError::UnexpectedReply(pong))
        }
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.connection.clone();
        redis::cmd("GET")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(|e| StoreError::Backend(format!("Redis GET failed: {}", e)))
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), StoreError> {
        let mut conn = self.connection.clone();
        let mut cmd = redis::cmd("SET");
        cmd.arg(key).arg(value);
        if let Some(ttl) = ttl {
            cmd.arg("EX").arg(ttl.as_secs().max(1));
        }

        cmd.query_async::<()>(&mut conn)
            .await
            .map_err(|e| StoreError::Backend(format!("Redis SET failed: {}", e)))
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut conn = self.connection.clone();
        redis::cmd("DEL")
            .arg(key)
            .query_async::<()>(&mut conn)
            .await
            .map_err(|e| StoreError::Backend(format!("Redis DEL failed: {}", e)))
    }

    fn provider_name(&self) -> &'static str {
        "redis"
    }
}

/// Connector that opens [`RedisStore`] handles
#[derive(Debug, Clone, Copy, Default)]
pub struct RedisConnector;

#[async_trait]
impl StoreConnector for RedisConnector {
    async fn connect(&self, info: ConnectionInfo) -> Result<Arc<dyn CacheStore>, StoreError> {
        let addr = info.addr.to_string();
        let db = info.redis.db;
        let store = RedisStore::connect(info).await?;
        debug!(addr = %addr, db = db, "Redis cache store connected");
        Ok(Arc::new(store))
    }
}
