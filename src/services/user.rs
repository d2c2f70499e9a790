// src/services/user.rs
use uuid::Uuid;

use crate::{
    core::error::AppError,
    dtos::user::{PublicProfile, UserList},
    state::AppState,
};

/// 公开资料。该接口无需登录，结果会被响应缓存中间件缓存。
pub async fn get_public_profile(state: &AppState, user_id: Uuid) -> Result<PublicProfile, AppError> {
    state
        .users
        .find_by_id(user_id)
        .await?
        .map(PublicProfile::from)
        .ok_or_else(|| AppError::NotFound("No user found with that ID".to_string()))
}

/// 管理后台的用户列表（已脱敏）
pub async fn list_users(state: &AppState) -> Result<UserList, AppError> {
    let users: Vec<_> = state.users.list().await?.into_iter().map(Into::into).collect();
    Ok(UserList {
        results: users.len(),
        users,
    })
}
