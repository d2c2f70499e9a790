// src/utils/role_guard.rs
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    core::{
        constants::{ADMIN_PATH_PREFIX, HOME_PATH, LOGIN_PATH},
        enums::UserRole,
    },
    dtos::auth::Claims,
};

/// 任何带角色的用户表示（前端缓存的用户、JWT 声明……）都可以交给守卫判断。
pub trait HasRole {
    fn role(&self) -> UserRole;
}

impl HasRole for Claims {
    // 只有 Access Token 带角色；缺失时按最低权限处理
    fn role(&self) -> UserRole {
        self.role.unwrap_or_default()
    }
}

/// 前端本地缓存的用户对象（localStorage 中的 JSON）。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredUser {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub role: UserRole,
}

impl HasRole for StoredUser {
    fn role(&self) -> UserRole {
        self.role
    }
}

pub fn is_valid_role(role: &str) -> bool {
    UserRole::from_str(role).is_ok()
}

pub fn is_admin<U: HasRole>(user: Option<&U>) -> bool {
    user.is_some_and(|u| u.role().is_admin())
}

pub fn has_admin_access<U: HasRole>(user: Option<&U>) -> bool {
    user.is_some_and(|u| u.role().has_admin_access())
}

/// 解析本地缓存的用户数据。
///
/// - 不是合法 JSON、不是对象或缺少 `id` 时返回 `None`（视为未登录）。
/// - `role` 缺失或不在 `user | admin | moderator` 中时归一化为 `user`。
pub fn get_stored_user_data(raw: &str) -> Option<StoredUser> {
    let mut value: Value = serde_json::from_str(raw).ok()?;
    let object = value.as_object_mut()?;

    let role_ok = object
        .get("role")
        .and_then(Value::as_str)
        .is_some_and(is_valid_role);
    if !role_ok {
        tracing::debug!("⚠️ Stored user has invalid role {:?}, falling back to user", object.get("role"));
        object.insert("role".to_string(), Value::String(UserRole::User.to_string()));
    }

    serde_json::from_value(value).ok()
}

/// 路由守卫的判定结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum GuardDecision {
    Allow,
    RedirectToLogin,
    RedirectToHome,
}

impl GuardDecision {
    /// 需要跳转时的目标路由
    pub fn redirect_to(self) -> Option<&'static str> {
        match self {
            GuardDecision::Allow => None,
            GuardDecision::RedirectToLogin => Some(LOGIN_PATH),
            GuardDecision::RedirectToHome => Some(HOME_PATH),
        }
    }
}

fn is_admin_path(path: &str) -> bool {
    path == ADMIN_PATH_PREFIX
        || path
            .strip_prefix(ADMIN_PATH_PREFIX)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// 受保护路由的判定：未登录去登录页，非管理人员访问 `/admin` 下的页面回首页。
pub fn guard_route<U: HasRole>(path: &str, user: Option<&U>) -> GuardDecision {
    if user.is_none() {
        return GuardDecision::RedirectToLogin;
    }
    if is_admin_path(path) && !has_admin_access(user) {
        return GuardDecision::RedirectToHome;
    }
    GuardDecision::Allow
}
