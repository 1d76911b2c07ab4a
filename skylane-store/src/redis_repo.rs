use std::sync::Arc;

use async_trait::async_trait;
use redis::{AsyncCommands, RedisResult};
use uuid::Uuid;

use skylane_core::identity::{generate_token, AdminSessions, IdentityError};

#[derive(Clone)]
pub struct RedisClient {
    client: redis::Client,
}

impl RedisClient {
    pub async fn new(connection_string: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(connection_string)?;
        Ok(Self { client })
    }

    pub async fn get_flight_availability(&self, flight_id: &str) -> RedisResult<Option<i32>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let key = format!("flight:{}:availability", flight_id);
        conn.get(key).await
    }

    pub async fn set_flight_availability(&self, flight_id: &str, count: i32) -> RedisResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let key = format!("flight:{}:availability", flight_id);
        conn.set::<_, _, ()>(key, count).await
    }

    pub async fn delete_flight_availability(&self, flight_id: &str) -> RedisResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let key = format!("flight:{}:availability", flight_id);
        conn.del::<_, ()>(key).await
    }

    /// Decrement the cached count only if the key exists; a miss returns nil
    /// and the next search re-seeds the cache from SQL.
    pub async fn decr_flight_availability(&self, flight_id: &str) -> RedisResult<Option<i64>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let key = format!("flight:{}:availability", flight_id);
        let script = redis::Script::new(
            r#"
            if redis.call("EXISTS", KEYS[1]) == 1 then
                return redis.call("DECR", KEYS[1])
            else
                return nil
            end
        "#,
        );

        script.key(key).invoke_async(&mut conn).await
    }

    pub async fn store_admin_session(
        &self,
        token: &str,
        admin_id: &str,
        ttl_seconds: u64,
    ) -> RedisResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let key = format!("admin_session:{}", token);
        conn.set_ex::<_, _, ()>(key, admin_id, ttl_seconds).await
    }

    pub async fn fetch_admin_session(&self, token: &str) -> RedisResult<Option<String>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let key = format!("admin_session:{}", token);
        conn.get(key).await
    }

    pub async fn check_rate_limit(
        &self,
        key: &str,
        limit: i64,
        window_seconds: i64,
    ) -> RedisResult<bool> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let (count,): (i64,) = redis::pipe()
            .atomic()
            .incr(key, 1)
            .expire(key, window_seconds)
            .query_async(&mut conn)
            .await?;

        Ok(count <= limit)
    }
}

/// Admin sessions backed by Redis keys with a TTL. Only tokens issued here
/// validate; expiry is Redis-side.
pub struct RedisAdminSessions {
    client: Arc<RedisClient>,
    ttl_seconds: u64,
}

impl RedisAdminSessions {
    pub fn new(client: Arc<RedisClient>, ttl_seconds: u64) -> Self {
        Self {
            client,
            ttl_seconds,
        }
    }
}

#[async_trait]
impl AdminSessions for RedisAdminSessions {
    async fn issue(&self, admin_id: Uuid) -> Result<String, IdentityError> {
        let token = generate_token();
        self.client
            .store_admin_session(&token, &admin_id.to_string(), self.ttl_seconds)
            .await
            .map_err(|e| IdentityError::Storage(e.to_string()))?;
        Ok(token)
    }

    async fn validate(&self, token: &str) -> Result<Option<Uuid>, IdentityError> {
        let stored = self
            .client
            .fetch_admin_session(token)
            .await
            .map_err(|e| IdentityError::Storage(e.to_string()))?;
        Ok(stored.and_then(|id| Uuid::parse_str(&id).ok()))
    }
}
