use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    core::enums::{TokenType, UserRole},
    dtos::user::UserProfile,
};

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    #[validate(length(min = 1, max = 50, message = "Name must be between 1 and 50 characters"))]
    pub name: String,

    #[validate(email(message = "Please provide a valid email"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    #[validate(must_match(other = "password", message = "Passwords are not the same"))]
    pub password_confirm: String,
}

#[derive(Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Please provide email and password"))]
    pub email: String,
    #[validate(length(min = 1, message = "Please provide email and password"))]
    pub password: String,
}

/// 前端角色守卫的校验请求：目标路由 + 本地缓存的用户数据（原样的 JSON 字符串）。
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteAccessRequest {
    pub path: String,
    #[serde(default)]
    pub stored_user: Option<String>,
}

/// JWT 载荷。`role` 只在 Access Token 中出现，`jti` 保证同一秒内签发的令牌也互不相同。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub id: String,
    #[serde(rename = "type")]
    pub token_type: TokenType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Serialize)]
pub struct AuthData {
    pub user: UserProfile,
}
