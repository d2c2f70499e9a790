//! 单元测试共用的构造函数。

use std::{sync::Arc, time::Duration};

use axum::response::Response;
use chrono::Utc;
use uuid::Uuid;

use crate::{
    core::{config::Config, enums::{TokenType, UserRole}},
    entity::users,
    repositories::{
        memory::{MemoryRefreshTokenStore, MemoryUserRepository},
        refresh_tokens::RefreshTokenStore,
        users::NewUser,
    },
    services::{auth::hash_password, token::TokenService},
    state::AppState,
    utils::cache::ResponseCache,
};

pub const TEST_PASSWORD: &str = "correct-horse";

pub fn test_config() -> Config {
    Config {
        database_url: "postgres://localhost/dhyey_test".to_string().into(),
        redis_url: "redis://127.0.0.1/".to_string().into(),
        access_token_secret: "access-secret-for-tests".to_string().into(),
        access_token_expires_in: 900,
        refresh_token_secret: "refresh-secret-for-tests".to_string().into(),
        refresh_token_expires_in: 7 * 24 * 3600,
        jwt_cookie_expires_in: 7,
        server_port: 0,
        server_host: "127.0.0.1".to_string(),
        rust_log: "debug".to_string(),
        log_dir: "logs".to_string(),
        cache_duration_ms: 1000,
    }
}

/// 内存存储 + 1 秒响应缓存。额外返回 Refresh Token 存储的具体类型，方便断言。
pub fn test_state() -> (AppState, Arc<MemoryRefreshTokenStore>) {
    let store = Arc::new(MemoryRefreshTokenStore::default());
    (test_state_with_store(store.clone()), store)
}

pub fn test_state_with_store(store: Arc<dyn RefreshTokenStore>) -> AppState {
    let config = test_config();
    AppState::new(
        Arc::new(MemoryUserRepository::default()),
        store,
        TokenService::new(&config),
        ResponseCache::new(Duration::from_millis(config.cache_duration_ms)),
    )
}

/// 未持久化的用户模型
pub fn sample_user(role: UserRole) -> users::Model {
    let now = Utc::now().fixed_offset();
    users::Model {
        id: Uuid::new_v4(),
        name: "Test User".to_string(),
        email: "test@example.com".to_string(),
        password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_string(),
        role,
        created_at: now,
        updated_at: now,
    }
}

/// 写入用户，密码为 [`TEST_PASSWORD`]
pub async fn insert_user(state: &AppState, email: &str, role: UserRole) -> users::Model {
    state
        .users
        .create(NewUser {
            name: "Test User".to_string(),
            email: email.to_string(),
            password_hash: hash_password(TEST_PASSWORD).unwrap(),
            role,
        })
        .await
        .unwrap()
}

pub fn access_token_for(state: &AppState, user: &users::Model) -> String {
    state
        .tokens
        .sign_token(&user.id.to_string(), TokenType::Access, Some(user.role))
        .unwrap()
}

pub async fn read_json(response: Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}
