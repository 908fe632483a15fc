use std::collections::HashMap;

use deadpool_redis::{redis::AsyncCommands, Runtime};
use sqlx::{postgres::PgPoolOptions, PgPool};
use tokio::sync::RwLock;

use crate::api::error;

pub async fn connect_database(database_url: &str) -> Result<PgPool, error::SystemError> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .min_connections(1)
        .acquire_slow_threshold(std::time::Duration::from_secs(3))
        .connect(database_url)
        .await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    Ok(pool)
}

/// Persisted client state: string values addressed by key, JSON-encoded by the helpers.
#[async_trait::async_trait]
pub trait KeyValueStore {
    async fn get_raw(&self, key: &str) -> Result<Option<Vec<u8>>, error::SystemError>;

    async fn set_raw(
        &self,
        key: &str,
        value: Vec<u8>,
        expiration: Option<u64>,
    ) -> Result<(), error::SystemError>;

    async fn delete(&self, key: &str) -> Result<(), error::SystemError>;
}

pub async fn get_json<T>(
    store: &(dyn KeyValueStore + Send + Sync),
    key: &str,
) -> Result<Option<T>, error::SystemError>
where
    T: serde::de::DeserializeOwned,
{
    match store.get_raw(key).await? {
        Some(v) => {
            let parsed = serde_json::from_slice(&v)?;
            Ok(Some(parsed))
        }
        None => Ok(None),
    }
}

pub async fn set_json<T>(
    store: &(dyn KeyValueStore + Send + Sync),
    key: &str,
    value: &T,
    expiration: Option<u64>,
) -> Result<(), error::SystemError>
where
    T: serde::Serialize,
{
    let serialized = serde_json::to_vec(value)?;
    store.set_raw(key, serialized, expiration).await
}

pub struct RedisCache {
    pool: deadpool_redis::Pool,
}

impl RedisCache {
    pub async fn new(redis_url: &str) -> Result<Self, error::SystemError> {
        let mut cfg = deadpool_redis::Config::from_url(redis_url);
        cfg.pool = Some(deadpool_redis::PoolConfig { max_size: 16, ..Default::default() });
        let pool = cfg.create_pool(Some(Runtime::Tokio1))?;
        Ok(Self { pool })
    }
}

#[async_trait::async_trait]
impl KeyValueStore for RedisCache {
    async fn get_raw(&self, key: &str) -> Result<Option<Vec<u8>>, error::SystemError> {
        let mut conn = self.pool.get().await?;
        let value: Option<Vec<u8>> = conn.get(key).await?;
        Ok(value)
    }

    async fn set_raw(
        &self,
        key: &str,
        value: Vec<u8>,
        expiration: Option<u64>,
    ) -> Result<(), error::SystemError> {
        let mut conn = self.pool.get().await?;
        match expiration {
            Some(seconds) => conn.set_ex::<_, _, ()>(key, value, seconds).await?,
            None => conn.set::<_, _, ()>(key, value).await?,
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), error::SystemError> {
        let mut conn = self.pool.get().await?;
        conn.del::<_, ()>(key).await?;
        Ok(())
    }
}

/// Process-local store used when no Redis is configured. Expiration is ignored.
#[derive(Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl KeyValueStore for MemoryCache {
    async fn get_raw(&self, key: &str) -> Result<Option<Vec<u8>>, error::SystemError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set_raw(
        &self,
        key: &str,
        value: Vec<u8>,
        _expiration: Option<u64>,
    ) -> Result<(), error::SystemError> {
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), error::SystemError> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}
