// src/handlers/auth.rs
use axum::{
    extract::{Json, State},
    http::{HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
    Extension,
};
use axum_extra::extract::CookieJar;
use validator::Validate;

use crate::{
    core::{constants::REFRESH_COOKIE_NAME, enums::TokenType, error::AppError},
    dtos::{
        auth::{AuthData, LoginRequest, RouteAccessRequest, SignupRequest},
        response::Res,
    },
    middleware::auth::{bearer_token, CurrentUser},
    services::{auth as AuthService, token::is_secure_request},
    state::AppState,
};

/// 注册并直接登录，返回 201。
pub async fn signup(
    State(state): State<AppState>,
    uri: Uri,
    headers: HeaderMap,
    jar: CookieJar,
    Json(payload): Json<SignupRequest>,
) -> Result<Response, AppError> {
    payload.validate()?;

    let user = AuthService::signup(&state, payload).await?;
    state
        .tokens
        .create_send_token(
            user,
            StatusCode::CREATED,
            is_secure_request(&uri, &headers),
            jar,
            state.refresh_tokens.as_ref(),
        )
        .await
}

pub async fn login(
    State(state): State<AppState>,
    uri: Uri,
    headers: HeaderMap,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<Response, AppError> {
    payload.validate()?;

    let user = AuthService::login(&state, payload).await?;
    state
        .tokens
        .create_send_token(
            user,
            StatusCode::OK,
            is_secure_request(&uri, &headers),
            jar,
            state.refresh_tokens.as_ref(),
        )
        .await
}

/// 用 Cookie 中的 Refresh Token 换一对新令牌（旧令牌随即作废）。
pub async fn refresh(
    State(state): State<AppState>,
    uri: Uri,
    headers: HeaderMap,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let token = jar.get(REFRESH_COOKIE_NAME).map(|c| c.value().to_string());

    let user = AuthService::refresh(&state, token.as_deref()).await?;
    state
        .tokens
        .create_send_token(
            user,
            StatusCode::OK,
            is_secure_request(&uri, &headers),
            jar,
            state.refresh_tokens.as_ref(),
        )
        .await
}

/// 登出：作废服务端的 Refresh Token 并清除 Cookie。总是返回 200。
pub async fn logout(
    State(state): State<AppState>,
    uri: Uri,
    headers: HeaderMap,
    jar: CookieJar,
) -> impl IntoResponse {
    let token = jar.get(REFRESH_COOKIE_NAME).map(|c| c.value().to_string());
    AuthService::logout(&state, token.as_deref()).await;

    let cleared = state.tokens.clear_refresh_cookie(is_secure_request(&uri, &headers));
    (jar.add(cleared), Res::<()>::with_msg("Logged out successfully"))
}

pub async fn me(Extension(CurrentUser(user)): Extension<CurrentUser>) -> impl IntoResponse {
    Res::with_data(AuthData { user: user.into() })
}

/// 前端路由守卫的服务端判定。未携带令牌视为未登录；携带了无效令牌返回 401，前端应走刷新流程。
pub async fn route_access(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<RouteAccessRequest>,
) -> Result<impl IntoResponse, AppError> {
    let claims = match bearer_token(&headers) {
        Some(token) => Some(state.tokens.verify_token(token, TokenType::Access)?),
        None => None,
    };

    let access = AuthService::route_access(
        &payload.path,
        claims.as_ref(),
        payload.stored_user.as_deref(),
    );
    Ok(Res::with_data(access))
}
