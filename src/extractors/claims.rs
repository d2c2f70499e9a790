use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    RequestPartsExt,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

use crate::{
    core::{enums::TokenType, error::AppError},
    dtos::auth::Claims,
    state::AppState,
};

/// 自定义提取器：取得当前请求的 Access Token 声明。
/// 已经过 `protect` 的请求直接复用扩展中的声明，否则自行解析并校验 Bearer 头。
impl FromRequestParts<AppState> for Claims {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(claims) = parts.extensions.get::<Claims>() {
            return Ok(claims.clone());
        }

        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| AppError::AuthError("Missing or invalid Authorization header".to_string()))?;

        state.tokens.verify_token(bearer.token(), TokenType::Access)
    }
}
