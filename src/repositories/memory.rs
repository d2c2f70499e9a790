//! 测试用的内存实现。

use std::{
    collections::{HashMap, HashSet},
    sync::Mutex,
};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::{refresh_tokens::RefreshTokenStore, users::{NewUser, UserRepository}};
use crate::{core::error::AppError, entity::users};

#[derive(Default)]
pub struct MemoryUserRepository {
    users: Mutex<HashMap<Uuid, users::Model>>,
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn create(&self, new_user: NewUser) -> Result<users::Model, AppError> {
        let mut users = self.users.lock().unwrap();
        if users.values().any(|u| u.email == new_user.email) {
            return Err(AppError::Conflict("Email already in use".to_string()));
        }

        let now = Utc::now().fixed_offset();
        let model = users::Model {
            id: Uuid::new_v4(),
            name: new_user.name,
            email: new_user.email,
            password_hash: new_user.password_hash,
            role: new_user.role,
            created_at: now,
            updated_at: now,
        };
        users.insert(model.id, model.clone());
        Ok(model)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<users::Model>, AppError> {
        Ok(self.users.lock().unwrap().values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<users::Model>, AppError> {
        Ok(self.users.lock().unwrap().get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<users::Model>, AppError> {
        let mut all: Vec<_> = self.users.lock().unwrap().values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }
}

#[derive(Default)]
pub struct MemoryRefreshTokenStore {
    tokens: Mutex<HashMap<String, HashSet<String>>>,
}

impl MemoryRefreshTokenStore {
    pub fn count(&self, user_id: &str) -> usize {
        self.tokens.lock().unwrap().get(user_id).map_or(0, HashSet::len)
    }

    pub fn contains(&self, user_id: &str, token: &str) -> bool {
        self.tokens
            .lock()
            .unwrap()
            .get(user_id)
            .is_some_and(|set| set.contains(token))
    }
}

#[async_trait]
impl RefreshTokenStore for MemoryRefreshTokenStore {
    async fn push(&self, user_id: &str, token: &str) -> Result<(), AppError> {
        self.tokens
            .lock()
            .unwrap()
            .entry(user_id.to_string())
            .or_default()
            .insert(token.to_string());
        Ok(())
    }

    async fn remove(&self, user_id: &str, token: &str) -> Result<bool, AppError> {
        Ok(self
            .tokens
            .lock()
            .unwrap()
            .get_mut(user_id)
            .is_some_and(|set| set.remove(token)))
    }
}

/// 写入总是失败，用来验证存储错误会向上传播。
pub struct FailingRefreshTokenStore;

#[async_trait]
impl RefreshTokenStore for FailingRefreshTokenStore {
    async fn push(&self, _user_id: &str, _token: &str) -> Result<(), AppError> {
        Err(AppError::InternalServerError("token store unavailable".to_string()))
    }

    async fn remove(&self, _user_id: &str, _token: &str) -> Result<bool, AppError> {
        Err(AppError::InternalServerError("token store unavailable".to_string()))
    }
}
