use anyhow::Context;
use deadpool_redis::{redis, Connection, PoolError, Runtime};
use secrecy::ExposeSecret;
use tracing::error;

use crate::configuration::RedisConfig;

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache pool exhausted or unavailable")]
    Pool(#[from] PoolError),
    #[error("Cache command failed")]
    Command(#[from] redis::RedisError),
}

/// Bounded Redis pool handle. Built once at startup and cloned into
/// request handlers; connections return to the pool on drop.
#[derive(Clone)]
pub struct CachePool {
    pool: deadpool_redis::Pool,
}

impl CachePool {
    /// Opens the pool and performs one `PING` probe. A probe failure is
    /// returned to the caller so that startup can abort.
    pub async fn connect(config: &RedisConfig) -> anyhow::Result<Self> {
        let pool = deadpool_redis::Config::from_url(config.url().expose_secret().as_str())
            .builder()
            .context("Failed to parse Redis pool config")?
            .max_size(config.pool_max_size)
            .create_timeout(Some(config.connect_timeout()))
            .wait_timeout(Some(config.wait_timeout()))
            .runtime(Runtime::Tokio1)
            .build()
            .context("Failed to build the Redis pool")?;
        let cache = Self { pool };
        cache.ping().await.context("Redis liveness probe failed")?;
        Ok(cache)
    }

    /// Scoped checkout of one connection; waiting callers beyond capacity
    /// fail with a pool error once the wait timeout elapses.
    pub async fn get(&self) -> Result<Connection, CacheError> {
        self.pool.get().await.map_err(CacheError::from)
    }

    #[tracing::instrument(name = "Probing cache liveness", skip_all)]
    pub async fn health_check(&self) -> Result<(), CacheError> {
        self.ping().await.map_err(|e| {
            error!("Cache liveness probe failed: {:?}", e);
            e
        })
    }

    async fn ping(&self) -> Result<(), CacheError> {
        let mut conn = self.get().await?;
        redis::cmd("PING")
            .query_async::<_, String>(&mut conn)
            .await?;
        Ok(())
    }

    /// Idempotent; safe to call more than once.
    pub fn close(&self) {
        self.pool.close();
    }
}
