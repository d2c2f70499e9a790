use axum::{
    http::{uri::Scheme, HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;
use uuid::Uuid;

use crate::{
    core::{
        config::Config,
        constants::{FORWARDED_PROTO_HEADER, REFRESH_COOKIE_NAME},
        enums::{TokenType, UserRole},
        error::AppError,
    },
    dtos::{
        auth::{AuthData, Claims},
        response::Res,
        user::UserProfile,
    },
    entity::users,
    repositories::refresh_tokens::RefreshTokenStore,
};

/// 单一类型令牌的密钥与有效期
struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenKeys {
    fn new(secret: &str, ttl_seconds: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::seconds(ttl_seconds),
        }
    }
}

/// 一次登录产生的会话材料
#[derive(Debug)]
pub struct IssuedSession {
    pub access_token: String,
    pub refresh_token: String,
    pub user: UserProfile,
}

/// 令牌服务：签发/校验 Access 与 Refresh 两种 JWT，并负责 refreshToken Cookie。
///
/// 纯计算部分（`sign_token` / `verify_token`）无共享状态，可以在任意请求中并发调用；
/// 唯一的副作用是 `issue_session` 向 [`RefreshTokenStore`] 追加令牌。
pub struct TokenService {
    access: TokenKeys,
    refresh: TokenKeys,
    cookie_max_age: time::Duration,
    validation: Validation,
}

impl TokenService {
    pub fn new(config: &Config) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // 过期即失效，不留宽限
        validation.leeway = 0;

        Self {
            access: TokenKeys::new(
                config.access_token_secret.expose_secret(),
                config.access_token_expires_in,
            ),
            refresh: TokenKeys::new(
                config.refresh_token_secret.expose_secret(),
                config.refresh_token_expires_in,
            ),
            cookie_max_age: time::Duration::days(config.jwt_cookie_expires_in),
            validation,
        }
    }

    fn keys(&self, token_type: TokenType) -> &TokenKeys {
        match token_type {
            TokenType::Access => &self.access,
            TokenType::Refresh => &self.refresh,
        }
    }

    /// 签发令牌。载荷为 `{id, type, role?, jti, iat, exp}`，密钥和有效期由 `token_type` 决定。
    ///
    /// `role` 只写入 Access Token，服务端的角色校验以这个签名过的声明为准。
    pub fn sign_token(
        &self,
        id: &str,
        token_type: TokenType,
        role: Option<UserRole>,
    ) -> Result<String, AppError> {
        let keys = self.keys(token_type);
        let now = Utc::now();

        let claims = Claims {
            id: id.to_string(),
            token_type,
            role: match token_type {
                TokenType::Access => role,
                TokenType::Refresh => None,
            },
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: (now + keys.ttl).timestamp(),
        };

        encode(&Header::default(), &claims, &keys.encoding)
            .map_err(|e| AppError::InternalServerError(format!("Token generation failed: {}", e)))
    }

    /// 校验签名、有效期以及载荷中的 `type`。任何失败都归为 `AppError::InvalidToken`。
    pub fn verify_token(&self, token: &str, token_type: TokenType) -> Result<Claims, AppError> {
        let data = decode::<Claims>(token, &self.keys(token_type).decoding, &self.validation)
            .map_err(|e| {
                tracing::debug!("⚠️ {} token rejected: {}", token_type, e);
                AppError::InvalidToken
            })?;

        if data.claims.token_type != token_type {
            tracing::warn!(
                "🚫 Token type mismatch: expected {}, got {}",
                token_type,
                data.claims.token_type
            );
            return Err(AppError::InvalidToken);
        }

        Ok(data.claims)
    }

    pub fn refresh_cookie(&self, token: String, secure: bool) -> Cookie<'static> {
        Cookie::build((REFRESH_COOKIE_NAME, token))
            .http_only(true)
            .secure(secure)
            .same_site(SameSite::Strict)
            .path("/")
            .max_age(self.cookie_max_age)
            .build()
    }

    /// 登出时下发的清除 Cookie（空值 + 立即过期）
    pub fn clear_refresh_cookie(&self, secure: bool) -> Cookie<'static> {
        Cookie::build((REFRESH_COOKIE_NAME, ""))
            .http_only(true)
            .secure(secure)
            .same_site(SameSite::Strict)
            .path("/")
            .max_age(time::Duration::ZERO)
            .build()
    }

    /// 为用户签发一对令牌，并把 Refresh Token 原子地追加到服务端列表。
    /// 存储失败时直接返回错误，不会签出一个服务端不认识的 Refresh Token。
    pub async fn issue_session(
        &self,
        user: users::Model,
        store: &dyn RefreshTokenStore,
    ) -> Result<IssuedSession, AppError> {
        let user_id = user.id.to_string();
        let access_token = self.sign_token(&user_id, TokenType::Access, Some(user.role))?;
        let refresh_token = self.sign_token(&user_id, TokenType::Refresh, None)?;

        store.push(&user_id, &refresh_token).await?;

        Ok(IssuedSession {
            access_token,
            refresh_token,
            user: user.into(),
        })
    }

    /// 签发令牌并组装 HTTP 响应：
    /// - `Set-Cookie: refreshToken=...; HttpOnly; SameSite=Strict; Path=/; Max-Age=...`（TLS 下加 `Secure`）
    /// - body：`{status: "success", token, data: {user}}`，user 不含密码和 Refresh Token
    pub async fn create_send_token(
        &self,
        user: users::Model,
        status: StatusCode,
        secure: bool,
        jar: CookieJar,
        store: &dyn RefreshTokenStore,
    ) -> Result<Response, AppError> {
        let session = self.issue_session(user, store).await?;
        let cookie = self.refresh_cookie(session.refresh_token, secure);

        tracing::info!("🔑 Session issued for user {}", session.user.id);

        Ok((
            jar.add(cookie),
            Res::with_token(status, session.access_token, AuthData { user: session.user }),
        )
            .into_response())
    }
}

/// 请求是否经由 TLS 到达：URI 自带 `https` 协议（绝对形式 / HTTP/2），
/// 或者反向代理写入了 `X-Forwarded-Proto: https`。
pub fn is_secure_request(uri: &Uri, headers: &HeaderMap) -> bool {
    if uri.scheme() == Some(&Scheme::HTTPS) {
        return true;
    }
    headers
        .get(FORWARDED_PROTO_HEADER)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|proto| proto.eq_ignore_ascii_case("https"))
}
