use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use serde_json::json;
use uuid::Uuid;

use crate::{
    core::error::AppError,
    dtos::{auth::Claims, response::Res},
    services::user as UserService,
    state::AppState,
};

/// 公开资料，无需登录（会被响应缓存）
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let profile = UserService::get_public_profile(&state, user_id).await?;
    Ok(Res::with_data(json!({ "user": profile })))
}

pub async fn list_users(
    claims: Claims,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    tracing::info!("📋 User list requested by {}", claims.id);
    let list = UserService::list_users(&state).await?;
    Ok(Res::with_data(list))
}

/// 清空响应缓存。内容审核后需要立即让公开页面失效时使用。
pub async fn flush_cache(claims: Claims, State(state): State<AppState>) -> impl IntoResponse {
    if state.cache.is_empty() {
        tracing::debug!("🧹 Response cache already empty");
        return Res::with_data(json!({ "cleared": 0 }));
    }
    let cleared = state.cache.len();
    state.cache.clear();
    tracing::info!("🧹 Response cache flushed by {} ({} entries)", claims.id, cleared);
    Res::with_data(json!({ "cleared": cleared }))
}
