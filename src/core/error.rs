// src/core/error.rs
use axum::{http::StatusCode, response::{IntoResponse, Response}};
use thiserror::Error;
use crate::dtos::response::Res;

/// 应用程序统一错误类型。覆盖数据库、Redis、校验、令牌、认证、授权等各层错误。
///
/// 通过实现 `IntoResponse` trait，任何 `AppError` 都可以直接转换为HTTP响应，
/// 以 `{status: "fail" | "error", message}` 的统一格式返回给客户端。
#[derive(Error, Debug)]
pub enum AppError {
    /// 数据库相关错误。包装 SeaORM 的 `DbErr`，自动转换。
    #[error("Database error: {0}")]
    DatabaseError(#[from] sea_orm::DbErr),

    /// Redis 相关错误（Refresh Token 集合读写失败）。
    #[error("Redis error: {0}")]
    RedisError(#[from] redis::RedisError),

    /// 输入验证错误。包装 validator crate 的 `ValidationErrors`，自动转换。
    #[error("Validation error: {0}")]
    ValidationError(#[from] validator::ValidationErrors),

    /// 令牌签名错误、已过期、类型不匹配或已被吊销。返回401。
    #[error("Invalid or expired token")]
    InvalidToken,

    /// 认证错误。如未登录、邮箱或密码错误等。返回401 Unauthorized。
    #[error("Authentication failed: {0}")]
    AuthError(String),

    /// 授权错误。如权限不足、需要管理员权限等。返回403 Forbidden。
    #[error("Permission denied: {0}")]
    Forbidden(String),

    /// 资源未找到错误。返回404 Not Found。
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// 资源冲突错误。如邮箱已注册。返回409 Conflict。
    #[error("Conflict: {0}")]
    Conflict(String),

    /// 服务器内部错误。返回500 Internal Server Error。
    #[error("Internal server error: {0}")]
    InternalServerError(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::DatabaseError(_)
            | AppError::RedisError(_)
            | AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidToken | AppError::AuthError(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // 内部错误只记录日志，返回给客户端的是通用消息，避免泄露敏感信息。
        let msg = match &self {
            AppError::DatabaseError(e) => {
                tracing::error!("❌ Database Error: {}", e);
                "Database service error".to_string()
            }
            AppError::RedisError(e) => {
                tracing::error!("❌ Redis Error: {}", e);
                "Token store error".to_string()
            }
            AppError::InternalServerError(msg) => {
                tracing::error!("❌ Internal Error: {}", msg);
                "Something went wrong".to_string()
            }
            AppError::InvalidToken => "Invalid token. Please log in again.".to_string(),
            AppError::ValidationError(e) => e.to_string(),
            AppError::AuthError(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg) => msg.clone(),
        };

        Res::<()>::with_error(status, &msg).into_response()
    }
}
