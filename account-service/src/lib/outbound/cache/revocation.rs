use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::Client;

use crate::domain::auth::ports::RevocationCache;
use crate::domain::errors::AppError;

/// Connect to Redis and verify the connection with a PING.
///
/// # Arguments
/// * `url` - Redis connection string (e.g. "redis://127.0.0.1:6379")
///
/// # Errors
/// Returns the Redis error if the URL is invalid or the server is unreachable
pub async fn connect(url: &str) -> redis::RedisResult<ConnectionManager> {
    let client = Client::open(url)?;
    let manager = ConnectionManager::new(client).await?;

    let mut conn = manager.clone();
    let _: String = redis::cmd("PING").query_async(&mut conn).await?;

    tracing::info!("Connected to Redis");
    Ok(manager)
}

fn cache_error(e: redis::RedisError) -> AppError {
    AppError::internal("cache operation failed").with_source(e)
}

/// Redis expiry is whole seconds; never round a live entry down to zero.
fn expiry_secs(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

/// Refresh token denylist stored in Redis.
#[derive(Clone)]
pub struct RedisRevocationCache {
    redis: ConnectionManager,
}

impl RedisRevocationCache {
    pub fn new(redis: ConnectionManager) -> Self {
        Self { redis }
    }
}

#[async_trait]
impl RevocationCache for RedisRevocationCache {
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), AppError> {
        let mut conn = self.redis.clone();

        let _: () = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("EX")
            .arg(expiry_secs(ttl))
            .query_async(&mut conn)
            .await
            .map_err(cache_error)?;

        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, AppError> {
        let mut conn = self.redis.clone();

        let count: u64 = redis::cmd("EXISTS")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(cache_error)?;

        Ok(count > 0)
    }

    async fn set_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<bool, AppError> {
        let mut conn = self.redis.clone();

        // SET NX replies OK when the key was created and nil otherwise
        let reply: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("NX")
            .arg("EX")
            .arg(expiry_secs(ttl))
            .query_async(&mut conn)
            .await
            .map_err(cache_error)?;

        Ok(reply.is_some())
    }
}
