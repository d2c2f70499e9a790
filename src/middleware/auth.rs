use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::{
    core::{enums::TokenType, error::AppError},
    dtos::auth::Claims,
    entity::users,
    state::AppState,
    utils::role_guard,
};

/// 通过 `protect` 的请求会在扩展中携带当前用户
#[derive(Debug, Clone)]
pub struct CurrentUser(pub users::Model);

pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .filter(|token| !token.is_empty())
}

/// 登录校验中间件。
///
/// 1. 从 `Authorization: Bearer <token>` 取出 Access Token，缺失时返回 401；
/// 2. 用 Access 密钥校验（Refresh Token 冒充 Access Token 会在这里被拒绝）；
/// 3. 确认令牌对应的用户仍然存在；
/// 4. 把 `Claims` 和 `CurrentUser` 放入请求扩展，供后续守卫和处理器使用。
pub async fn protect(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(req.headers()).ok_or_else(|| {
        AppError::AuthError("You are not logged in! Please log in to get access.".to_string())
    })?;

    let claims = state.tokens.verify_token(token, TokenType::Access)?;

    let uid = Uuid::parse_str(&claims.id).map_err(|_| AppError::InvalidToken)?;
    let user = state.users.find_by_id(uid).await?.ok_or_else(|| {
        AppError::AuthError("The user belonging to this token no longer exists".to_string())
    })?;

    req.extensions_mut().insert(claims);
    req.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(req).await)
}

/// 管理后台守卫，必须挂在 `protect` 之内。
///
/// 角色取自签名过的 Access Token 声明，而不是客户端上报的任何数据。
/// `admin` 与 `moderator` 放行，其余返回 403。
pub async fn restrict_to_admin(req: Request, next: Next) -> Result<Response, AppError> {
    let claims = req
        .extensions()
        .get::<Claims>()
        .ok_or_else(|| AppError::AuthError("You are not logged in! Please log in to get access.".to_string()))?;

    if !role_guard::has_admin_access(Some(claims)) {
        tracing::warn!("🚫 Admin access denied: user {}", claims.id);
        return Err(AppError::Forbidden(
            "You do not have permission to perform this action".to_string(),
        ));
    }

    Ok(next.run(req).await)
}
