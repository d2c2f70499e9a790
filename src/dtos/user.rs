// src/dtos/user.rs
use crate::core::enums::UserRole;
use crate::entity::users;
use serde::Serialize;

/// 返回给本人/管理员的用户数据：不含密码哈希，也不含任何 Refresh Token。
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub created_at: String,
}

impl From<users::Model> for UserProfile {
    fn from(user: users::Model) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.name,
            email: user.email,
            role: user.role,
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

/// 公开资料（任何人可读，会被响应缓存）
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PublicProfile {
    pub id: String,
    pub name: String,
    pub role: UserRole,
    pub created_at: String,
}

impl From<users::Model> for PublicProfile {
    fn from(user: users::Model) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.name,
            role: user.role,
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

#[derive(Serialize, Debug)]
pub struct UserList {
    pub results: usize,
    pub users: Vec<UserProfile>,
}
