use std::sync::Arc;

use crate::{
    repositories::{refresh_tokens::RefreshTokenStore, users::UserRepository},
    services::token::TokenService,
    utils::cache::ResponseCache,
};

/// 所有请求处理器共享的状态。存储层以 trait 对象注入：
/// 生产环境是 Postgres + Redis，测试中替换为内存实现。
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub refresh_tokens: Arc<dyn RefreshTokenStore>,
    pub tokens: Arc<TokenService>,
    pub cache: Arc<ResponseCache>,
}

impl AppState {
    pub fn new(
        users: Arc<dyn UserRepository>,
        refresh_tokens: Arc<dyn RefreshTokenStore>,
        tokens: TokenService,
        cache: ResponseCache,
    ) -> Self {
        Self {
            users,
            refresh_tokens,
            tokens: Arc::new(tokens),
            cache: Arc::new(cache),
        }
    }
}
