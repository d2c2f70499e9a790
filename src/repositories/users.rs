use async_trait::async_trait;
use chrono::Utc;
use sea_orm::*;
use uuid::Uuid;

use crate::{
    core::{enums::UserRole, error::AppError},
    entity::users,
};

/// 新建用户所需字段（密码已哈希，邮箱已规范化）。
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// 邮箱已存在时返回 `AppError::Conflict`。
    async fn create(&self, new_user: NewUser) -> Result<users::Model, AppError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<users::Model>, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<users::Model>, AppError>;

    /// 按注册时间倒序
    async fn list(&self) -> Result<Vec<users::Model>, AppError>;
}

/// Postgres 实现（SeaORM）。
#[derive(Clone)]
pub struct SeaOrmUserRepository {
    db: DatabaseConnection,
}

impl SeaOrmUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for SeaOrmUserRepository {
    async fn create(&self, new_user: NewUser) -> Result<users::Model, AppError> {
        let now = Utc::now().fixed_offset();
        let model = users::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(new_user.name),
            email: Set(new_user.email),
            password_hash: Set(new_user.password_hash),
            role: Set(new_user.role),
            created_at: Set(now),
            updated_at: Set(now),
        };

        model.insert(&self.db).await.map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                AppError::Conflict("Email already in use".to_string())
            }
            _ => AppError::DatabaseError(e),
        })
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<users::Model>, AppError> {
        Ok(users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await?)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<users::Model>, AppError> {
        Ok(users::Entity::find_by_id(id).one(&self.db).await?)
    }

    async fn list(&self) -> Result<Vec<users::Model>, AppError> {
        Ok(users::Entity::find()
            .order_by_desc(users::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }
}
