use argon2::{
    password_hash::SaltString, Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};
use rand::rngs::OsRng;
use uuid::Uuid;

use crate::{
    core::{
        enums::{TokenType, UserRole},
        error::AppError,
    },
    dtos::auth::{Claims, LoginRequest, SignupRequest},
    entity::users,
    repositories::users::NewUser,
    state::AppState,
    utils::role_guard::{self, GuardDecision, StoredUser},
};

#[inline]
fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub(crate) fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::InternalServerError(format!("Hash failed: {}", e)))?
        .to_string())
}

/// 用户注册。新用户一律是 `user` 角色，管理员/版主只能通过后台脚本提升。
///
/// # 返回值
/// - `Ok(users::Model)`: 新建的用户，交给 `create_send_token` 签发会话。
/// - `Err(AppError::Conflict)`: 邮箱已被注册。
pub async fn signup(state: &AppState, req: SignupRequest) -> Result<users::Model, AppError> {
    let password_hash = hash_password(&req.password)?;

    let user = state
        .users
        .create(NewUser {
            name: req.name.trim().to_string(),
            email: normalize_email(&req.email),
            password_hash,
            role: UserRole::User,
        })
        .await?;

    tracing::info!("👤 New user registered: {}", user.id);
    Ok(user)
}

/// 邮箱 + 密码登录。用户不存在和密码错误返回同一条消息，避免泄露账号是否存在。
pub async fn login(state: &AppState, req: LoginRequest) -> Result<users::Model, AppError> {
    let invalid = || AppError::AuthError("Incorrect email or password".to_string());

    let user = state
        .users
        .find_by_email(&normalize_email(&req.email))
        .await?
        .ok_or_else(invalid)?;

    let parsed_hash = PasswordHash::new(&user.password_hash)
        .map_err(|_| AppError::InternalServerError("Stored password hash is malformed".to_string()))?;

    Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .map_err(|_| invalid())?;

    Ok(user)
}

/// 令牌轮换。Refresh Token 必须同时满足：
/// 1. 签名与有效期校验通过（`verify_token`）；
/// 2. 仍在该用户的服务端列表中。
///
/// 第二步用一次原子的 `remove` 完成"存在性检查 + 作废"，同一个旧令牌并发刷新时只有一个请求能成功。
pub async fn refresh(state: &AppState, token: Option<&str>) -> Result<users::Model, AppError> {
    let token = token.ok_or_else(|| AppError::AuthError("No refresh token provided".to_string()))?;
    let claims = state.tokens.verify_token(token, TokenType::Refresh)?;

    if !state.refresh_tokens.remove(&claims.id, token).await? {
        // 签名有效但服务端不认：已轮换过、已登出，或者被盗用
        tracing::warn!("🚨 Refresh token not in store for user {}", claims.id);
        return Err(AppError::InvalidToken);
    }

    let uid = Uuid::parse_str(&claims.id).map_err(|_| AppError::InvalidToken)?;
    state
        .users
        .find_by_id(uid)
        .await?
        .ok_or_else(|| AppError::AuthError("The user belonging to this token no longer exists".to_string()))
}

/// 登出：尽力从服务端列表中移除 Refresh Token。
/// 令牌无效、缺失，或存储不可用时都只记录日志，调用方总是会清除 Cookie。
pub async fn logout(state: &AppState, token: Option<&str>) {
    let Some(token) = token else {
        return;
    };
    let Ok(claims) = state.tokens.verify_token(token, TokenType::Refresh) else {
        return;
    };

    match state.refresh_tokens.remove(&claims.id, token).await {
        Ok(true) => tracing::info!("👋 User {} logged out", claims.id),
        Ok(false) => {}
        Err(e) => tracing::error!("❌ Failed to revoke refresh token for user {}: {}", claims.id, e),
    }
}

/// 前端角色守卫的服务端校验结果
#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteAccess {
    pub decision: GuardDecision,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_to: Option<&'static str>,
    pub is_admin: bool,
    /// 以签名声明修正过角色的本地用户数据，前端应写回本地存储
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<StoredUser>,
}

/// 判定路由访问权限。角色只取自已校验的 Access Token 声明，
/// 本地缓存的用户数据仅用于回显（其中的 `role` 字段会被声明覆盖）。
pub fn route_access(path: &str, claims: Option<&Claims>, stored_user: Option<&str>) -> RouteAccess {
    let decision = role_guard::guard_route(path, claims);

    let user = claims.and_then(|claims| {
        let mut user = stored_user.and_then(role_guard::get_stored_user_data)?;
        if user.id != claims.id {
            return None;
        }
        user.role = role_guard::HasRole::role(claims);
        Some(user)
    });

    RouteAccess {
        decision,
        redirect_to: decision.redirect_to(),
        is_admin: role_guard::is_admin(claims),
        user,
    }
}
