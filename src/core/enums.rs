// src/core/enums.rs

use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// 用户角色枚举
/// 同时支持：
/// 1. 数据库映射 (SeaORM) - 存为字符串 "user" / "admin" / "moderator"
/// 2. JSON 序列化 (Serde) - 前端交互、JWT 声明
/// 3. 字符串转换 (Strum) - 校验前端缓存中的角色字段
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum UserRole {
    #[default]
    #[sea_orm(string_value = "user")]
    User,

    #[sea_orm(string_value = "admin")]
    Admin,

    #[sea_orm(string_value = "moderator")]
    Moderator,
}

impl UserRole {
    pub fn is_admin(self) -> bool {
        self == UserRole::Admin
    }

    /// 能否进入管理后台：管理员和版主都可以（版主负责内容审核）。
    pub fn has_admin_access(self) -> bool {
        matches!(self, UserRole::Admin | UserRole::Moderator)
    }
}

/// 令牌类型。每种类型有独立的密钥和有效期，签发和校验时都必须显式指定，
/// 不存在"未知类型回落到某个密钥"的分支。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}
