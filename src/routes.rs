use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{TraceLayer, DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse},
};
use tracing::Level;

// 重命名为 app_middleware，避免与 axum::middleware 冲突
use crate::{handlers, state::AppState, middleware as app_middleware};

/// 创建应用程序路由器。
///
/// # 路由结构（均位于 `/api/v1` 下）
/// 1. `/auth/*` - 公开：注册、登录、刷新、登出、路由守卫判定；`/auth/me` 需登录。
/// 2. `/users/{id}` - 公开资料，可被响应缓存。
/// 3. `/admin/*` - 需登录且角色为 admin / moderator。
///
/// # 中间件
/// - 响应缓存挂在最外层，只处理匿名 GET；
/// - 全局请求日志与 CORS。
pub fn create_router(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/signup", post(handlers::auth::signup))
        .route("/login", post(handlers::auth::login))
        .route("/refresh", post(handlers::auth::refresh)) // 凭 Cookie 中的 Refresh Token，不需要 Bearer
        .route("/logout", post(handlers::auth::logout))
        .route("/route-access", post(handlers::auth::route_access))
        .merge(
            Router::new()
                .route("/me", get(handlers::auth::me))
                .layer(middleware::from_fn_with_state(
                    state.clone(),
                    app_middleware::auth::protect,
                )),
        );

    let user_routes = Router::new().route("/{id}", get(handlers::users::get_user));

    // --- 管理员模块路由 (需登录 + 管理权限) ---
    let admin_routes = Router::new()
        .route("/users", get(handlers::users::list_users))
        .route("/cache", delete(handlers::users::flush_cache))
        // ✨ 中间件链 (执行顺序：从下往上，即 protect -> restrict_to_admin -> Handler)
        .layer(middleware::from_fn(app_middleware::auth::restrict_to_admin))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            app_middleware::auth::protect,
        ));

    let api = Router::new()
        .nest("/auth", auth_routes)
        .nest("/users", user_routes)
        .nest("/admin", admin_routes);

    Router::new()
        .route("/", get(|| async { "🚀 Dhyey API is running" }))
        .nest("/api/v1", api)
        // 在外层挂缓存，中间件拿到的是未经 nest 裁剪的完整 URI
        .layer(middleware::from_fn_with_state(
            state.cache.clone(),
            app_middleware::cache::cache_middleware,
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO))
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::enums::{TokenType, UserRole},
        repositories::memory::FailingRefreshTokenStore,
        test_support::{
            access_token_for, insert_user, read_json, test_state, test_state_with_store, TEST_PASSWORD,
        },
    };
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;
    use uuid::Uuid;

    fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn with_cookie(uri: &str, cookie: &str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::COOKIE, cookie)
            .body(Body::empty())
            .unwrap()
    }

    fn bearer_get(uri: &str, token: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap()
    }

    /// 取出 `refreshToken=...` 这一段（不含属性）
    fn refresh_cookie(response: &Response) -> String {
        response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find(|v| v.starts_with("refreshToken="))
            .and_then(|v| v.split(';').next())
            .unwrap()
            .to_string()
    }

    fn signup_body(email: &str) -> Value {
        json!({
            "name": "Asha",
            "email": email,
            "password": TEST_PASSWORD,
            "passwordConfirm": TEST_PASSWORD,
        })
    }

    #[tokio::test]
    async fn session_lifecycle() {
        let (state, _) = test_state();
        let app = create_router(state);

        // 注册
        let response = app
            .clone()
            .oneshot(json_request(Method::POST, "/api/v1/auth/signup", signup_body("asha@example.com")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let cookie = refresh_cookie(&response);
        let body = read_json(response).await;
        assert_eq!(body["status"], "success");
        assert!(body["data"]["user"].get("passwordHash").is_none());
        let access = body["token"].as_str().unwrap().to_string();

        // 当前用户
        let response = app.clone().oneshot(bearer_get("/api/v1/auth/me", &access)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(read_json(response).await["data"]["user"]["email"], "asha@example.com");

        // 刷新：旧 Cookie 换新 Cookie
        let response = app.clone().oneshot(with_cookie("/api/v1/auth/refresh", &cookie)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let rotated = refresh_cookie(&response);
        assert_ne!(rotated, cookie);

        // 旧令牌已被轮换掉
        let response = app.clone().oneshot(with_cookie("/api/v1/auth/refresh", &cookie)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        // 登出后新令牌也失效
        let response = app.clone().oneshot(with_cookie("/api/v1/auth/logout", &rotated)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(refresh_cookie(&response).starts_with("refreshToken="));

        let response = app.oneshot(with_cookie("/api/v1/auth/refresh", &rotated)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn logout_clears_cookie_even_when_token_store_is_down() {
        let state = test_state_with_store(Arc::new(FailingRefreshTokenStore));
        let token = state
            .tokens
            .sign_token(&Uuid::new_v4().to_string(), TokenType::Refresh, None)
            .unwrap();
        let app = create_router(state);

        let response = app
            .oneshot(with_cookie("/api/v1/auth/logout", &format!("refreshToken={token}")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let set_cookie = response.headers().get(header::SET_COOKIE).unwrap().to_str().unwrap();
        assert!(set_cookie.starts_with("refreshToken="));
        assert!(set_cookie.contains("Max-Age=0"));
    }

    #[tokio::test]
    async fn login_sets_secure_cookie_behind_tls_proxy() {
        let (state, store) = test_state();
        let user = insert_user(&state, "asha@example.com", UserRole::User).await;
        let app = create_router(state);

        let mut request = json_request(
            Method::POST,
            "/api/v1/auth/login",
            json!({ "email": "ASHA@example.com", "password": TEST_PASSWORD }),
        );
        request.headers_mut().insert("x-forwarded-proto", "https".parse().unwrap());

        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let set_cookie = response.headers().get(header::SET_COOKIE).unwrap().to_str().unwrap();
        assert!(set_cookie.contains("Secure"));
        assert!(set_cookie.contains("HttpOnly"));
        assert!(set_cookie.contains("SameSite=Strict"));
        assert_eq!(store.count(&user.id.to_string()), 1);

        let response = app
            .oneshot(json_request(
                Method::POST,
                "/api/v1/auth/login",
                json!({ "email": "asha@example.com", "password": "wrong-password" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = read_json(response).await;
        assert_eq!(body["status"], "fail");
        assert_eq!(body["message"], "Incorrect email or password");
    }

    #[tokio::test]
    async fn signup_validation_and_conflict() {
        let (state, _) = test_state();
        let app = create_router(state);

        let mut bad = signup_body("asha@example.com");
        bad["passwordConfirm"] = json!("something-else");
        let response = app.clone().oneshot(json_request(Method::POST, "/api/v1/auth/signup", bad)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app
            .clone()
            .oneshot(json_request(Method::POST, "/api/v1/auth/signup", signup_body("not-an-email")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let ok = app
            .clone()
            .oneshot(json_request(Method::POST, "/api/v1/auth/signup", signup_body("asha@example.com")))
            .await
            .unwrap();
        assert_eq!(ok.status(), StatusCode::CREATED);

        let dup = app
            .oneshot(json_request(Method::POST, "/api/v1/auth/signup", signup_body("asha@example.com")))
            .await
            .unwrap();
        assert_eq!(dup.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn refresh_without_cookie_is_unauthorized() {
        let (state, _) = test_state();
        let app = create_router(state);

        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/v1/auth/refresh")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn admin_panel_is_role_gated() {
        let (state, _) = test_state();
        let user = insert_user(&state, "u@example.com", UserRole::User).await;
        let moderator = insert_user(&state, "m@example.com", UserRole::Moderator).await;
        let app = create_router(state.clone());

        let response = app
            .clone()
            .oneshot(bearer_get("/api/v1/admin/users", &access_token_for(&state, &user)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = app
            .clone()
            .oneshot(bearer_get("/api/v1/admin/users", &access_token_for(&state, &moderator)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["data"]["results"], 2);
        assert!(body["data"]["users"][0].get("passwordHash").is_none());

        let response = app.oneshot(
            Request::builder().uri("/api/v1/admin/users").body(Body::empty()).unwrap(),
        ).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn public_profile_is_cached_until_flushed() {
        let (state, _) = test_state();
        let user = insert_user(&state, "asha@example.com", UserRole::User).await;
        let admin = insert_user(&state, "admin@example.com", UserRole::Admin).await;
        let app = create_router(state.clone());
        let uri = format!("/api/v1/users/{}", user.id);

        let response = app
            .clone()
            .oneshot(Request::builder().uri(&uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["data"]["user"]["name"], "Test User");
        assert!(body["data"]["user"].get("email").is_none());
        assert_eq!(state.cache.len(), 1);

        let flush = || {
            Request::builder()
                .method(Method::DELETE)
                .uri("/api/v1/admin/cache")
                .header(header::AUTHORIZATION, format!("Bearer {}", access_token_for(&state, &admin)))
                .body(Body::empty())
                .unwrap()
        };
        let response = app.clone().oneshot(flush()).await.unwrap();
        assert_eq!(read_json(response).await["data"]["cleared"], 1);
        assert!(state.cache.is_empty());

        let response = app.oneshot(flush()).await.unwrap();
        assert_eq!(read_json(response).await["data"]["cleared"], 0);
    }

    #[tokio::test]
    async fn route_access_uses_signed_role() {
        let (state, _) = test_state();
        let user = insert_user(&state, "asha@example.com", UserRole::User).await;
        let app = create_router(state.clone());

        let stored = json!({ "id": user.id.to_string(), "name": "Asha", "role": "admin" }).to_string();
        let mut request = json_request(
            Method::POST,
            "/api/v1/auth/route-access",
            json!({ "path": "/admin/stories", "storedUser": stored }),
        );
        request.headers_mut().insert(
            header::AUTHORIZATION,
            format!("Bearer {}", access_token_for(&state, &user)).parse().unwrap(),
        );

        let response = app.clone().oneshot(request).await.unwrap();
        let body = read_json(response).await;
        assert_eq!(body["data"]["decision"], "redirectToHome");
        assert_eq!(body["data"]["redirectTo"], "/");
        assert_eq!(body["data"]["user"]["role"], "user");

        let anonymous = app
            .oneshot(json_request(Method::POST, "/api/v1/auth/route-access", json!({ "path": "/profile" })))
            .await
            .unwrap();
        let body = read_json(anonymous).await;
        assert_eq!(body["data"]["decision"], "redirectToLogin");
        assert_eq!(body["data"]["redirectTo"], "/login");
    }
}
