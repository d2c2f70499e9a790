use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands};

use crate::core::{constants::REDIS_PREFIX_REFRESH, error::AppError};

/// 用户的服务端 Refresh Token 列表。
///
/// 所有操作都是单条原子命令，不做"读出列表 → 修改 → 整体写回"，
/// 因此同一用户并发登录不会互相覆盖。
#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    /// 追加一个令牌
    async fn push(&self, user_id: &str, token: &str) -> Result<(), AppError>;

    /// 移除令牌，返回它之前是否存在。轮换时用它同时完成"校验 + 作废"。
    async fn remove(&self, user_id: &str, token: &str) -> Result<bool, AppError>;
}

#[inline]
fn refresh_key(user_id: &str) -> String {
    format!("{}{}", REDIS_PREFIX_REFRESH, user_id)
}

/// Redis 实现：每个用户一个 SET，整个 SET 的 TTL 随每次登录顺延到最长的 Refresh 有效期。
#[derive(Clone)]
pub struct RedisRefreshTokenStore {
    redis: ConnectionManager,
    ttl_seconds: i64,
}

impl RedisRefreshTokenStore {
    pub fn new(redis: ConnectionManager, ttl_seconds: i64) -> Self {
        Self { redis, ttl_seconds }
    }
}

#[async_trait]
impl RefreshTokenStore for RedisRefreshTokenStore {
    async fn push(&self, user_id: &str, token: &str) -> Result<(), AppError> {
        let key = refresh_key(user_id);
        let mut conn = self.redis.clone();

        // SADD + EXPIRE 放在同一个 MULTI 中
        let _: () = redis::pipe()
            .atomic()
            .sadd(&key, token)
            .ignore()
            .expire(&key, self.ttl_seconds)
            .ignore()
            .query_async(&mut conn)
            .await?;

        tracing::debug!("💾 Refresh token stored for user {}", user_id);
        Ok(())
    }

    async fn remove(&self, user_id: &str, token: &str) -> Result<bool, AppError> {
        let mut conn = self.redis.clone();
        let removed: i64 = conn.srem(refresh_key(user_id), token).await?;
        Ok(removed > 0)
    }
}
