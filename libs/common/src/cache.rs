//! Redis-backed marker keys
//!
//! The service only needs expiring presence markers (revoked access tokens),
//! so the wrapper exposes exactly that: mark a key for a while, ask whether
//! it is still marked.

use anyhow::{Result, bail};
use redis::{AsyncCommands, Client, aio::MultiplexedConnection};
use std::time::Duration;
use tracing::{debug, info};

const DEFAULT_REDIS_URL: &str = "redis://localhost:6379";

#[derive(Debug, Clone)]
pub struct RedisConfig {
    pub url: String,
}

impl RedisConfig {
    /// Reads `REDIS_URL`, falling back to a local instance
    pub fn from_env() -> Result<Self> {
        let url = std::env::var("REDIS_URL").unwrap_or_else(|_| DEFAULT_REDIS_URL.to_string());
        Ok(Self { url })
    }
}

/// Lazily connected Redis client
#[derive(Clone)]
pub struct RedisPool {
    client: Client,
}

impl RedisPool {
    pub fn new(config: &RedisConfig) -> Result<Self> {
        let client = Client::open(config.url.as_str())?;
        info!("Redis client configured for {}", config.url);
        Ok(Self { client })
    }

    async fn connection(&self) -> Result<MultiplexedConnection> {
        Ok(self.client.get_multiplexed_async_connection().await?)
    }

    /// Mark `key` as present for `ttl`; a zero ttl is rejected
    pub async fn mark(&self, key: &str, ttl: Duration) -> Result<()> {
        let seconds = ttl.as_secs();
        if seconds == 0 {
            bail!("marker {} needs a ttl of at least one second", key);
        }

        let mut conn = self.connection().await?;
        let _: () = conn.set_ex(key, 1u8, seconds).await?;
        debug!("Marked {} for {}s", key, seconds);
        Ok(())
    }

    /// Whether `key` is still marked
    pub async fn is_marked(&self, key: &str) -> Result<bool> {
        let mut conn = self.connection().await?;
        Ok(conn.exists(key).await?)
    }

    /// Seconds until `key` expires, `None` when absent or persistent
    pub async fn remaining(&self, key: &str) -> Result<Option<u64>> {
        let mut conn = self.connection().await?;
        let ttl: i64 = conn.ttl(key).await?;
        Ok(u64::try_from(ttl).ok())
    }

    pub async fn unmark(&self, key: &str) -> Result<bool> {
        let mut conn = self.connection().await?;
        let removed: u64 = conn.del(key).await?;
        Ok(removed > 0)
    }

    pub async fn health_check(&self) -> Result<bool> {
        let mut conn = self.connection().await?;
        let reply: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(reply == "PONG")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_from_env_falls_back_to_localhost() {
        unsafe {
            std::env::remove_var("REDIS_URL");
        }
        assert_eq!(RedisConfig::from_env().unwrap().url, DEFAULT_REDIS_URL);
    }

    #[test]
    #[serial]
    fn test_from_env_reads_variable() {
        unsafe {
            std::env::set_var("REDIS_URL", "redis://cache:6380");
        }
        let config = RedisConfig::from_env().unwrap();
        unsafe {
            std::env::remove_var("REDIS_URL");
        }
        assert_eq!(config.url, "redis://cache:6380");
    }

    #[test]
    fn test_malformed_url_fails_fast() {
        let config = RedisConfig {
            url: "not a redis url".to_string(),
        };
        assert!(RedisPool::new(&config).is_err());
    }

    #[tokio::test]
    async fn test_zero_ttl_is_rejected_before_connecting() {
        // port 1 is never listening; the ttl check must fail first
        let pool = RedisPool::new(&RedisConfig {
            url: "redis://127.0.0.1:1".to_string(),
        })
        .unwrap();

        let err = pool.mark("revoked:x", Duration::ZERO).await.unwrap_err();
        assert!(err.to_string().contains("ttl"));
    }
}
