use redis::{AsyncCommands, Client};
use std::fmt::Display;
use uuid::Uuid;

/// Keys for cached values, namespaced by kind
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Embedding vector for a text, keyed by a UUIDv5 of the text itself
    Embedding(Uuid),
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::Embedding(digest) => write!(f, "emb:{}", digest),
        }
    }
}

/// Creates a Redis client for caching
///
/// Establishes a connection to Redis for fast data caching.
/// Uses connection pooling via the connection-manager feature.
pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    let client = Client::open(redis_url)?;
    Ok(client)
}

/// Cache handler for storing and retrieving data from Redis
///
/// A cache outage degrades to misses: failures are logged and the caller
/// recomputes, so Redis being down never fails a request.
#[derive(Clone)]
pub struct Cache {
    redis_client: Client,
}

impl Cache {
    pub fn new(redis_client: Client) -> Self {
        Self { redis_client }
    }

    /// Retrieves a cached value, treating any cache failure as a miss
    pub async fn get<T: serde::de::DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        let mut conn = match self.redis_client.get_multiplexed_async_connection().await {
            Ok(conn) => conn,
            Err(e) => {
                tracing::warn!(error = %e, "Redis connection failed, treating as cache miss");
                return None;
            }
        };

        let cached: Option<String> = match conn.get(format!("{}", key)).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(error = %e, key = %key, "Redis get failed");
                return None;
            }
        };

        cached.and_then(|json| match serde_json::from_str(&json) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(error = %e, key = %key, "Cache deserialization error");
                None
            }
        })
    }

    /// Stores a value with a TTL; failures are logged and swallowed
    pub async fn set<T: serde::Serialize>(&self, key: &CacheKey, value: &T, ttl: u64) {
        let json = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(error = %e, key = %key, "Cache serialization error");
                return;
            }
        };

        let mut conn = match self.redis_client.get_multiplexed_async_connection().await {
            Ok(conn) => conn,
            Err(e) => {
                tracing::warn!(error = %e, "Redis connection failed, skipping cache write");
                return;
            }
        };

        let result: Result<(), _> = conn.set_ex(format!("{}", key), json, ttl).await;
        if let Err(e) = result {
            tracing::warn!(error = %e, key = %key, "Redis set failed");
        } else {
            tracing::debug!(key = %key, ttl = ttl, "Cached value");
        }
    }
}
