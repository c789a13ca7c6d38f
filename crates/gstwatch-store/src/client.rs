//! Redis connection pool management.

use redis::aio::ConnectionManager;
use thiserror::Error;

/// Document store error types.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Redis connection error: {0}")]
    Connection(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unknown collection: {0}")]
    UnknownCollection(String),
}

/// Result type for document store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Shared document store handle - ConnectionManager multiplexes
/// internally and is Clone, so callers clone it per operation.
/// One pool per process, created once and reused.
pub type StorePool = ConnectionManager;

/// Initialize the store pool from a Redis URL.
///
/// Example URL: `redis://127.0.0.1:6379`
pub async fn init_pool(redis_url: &str) -> StoreResult<StorePool> {
    let client = redis::Client::open(redis_url)?;
    let manager = ConnectionManager::new(client).await?;
    Ok(manager)
}

/// Initialize the pool reading `REDIS_URL` from the environment,
/// falling back to the local default.
pub async fn init_pool_from_env() -> StoreResult<StorePool> {
    let url = std::env::var("REDIS_URL")
        .unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());
    init_pool(&url).await
}
