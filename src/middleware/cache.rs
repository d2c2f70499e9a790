use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::{core::error::AppError, utils::cache::ResponseCache};

fn is_json(response: &Response) -> bool {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/json"))
}

/// 响应缓存中间件，挂在最外层路由上（此时看到的是未被嵌套路由截断的路径）。
///
/// 1. 非 GET 请求，或带有 `Authorization` 头的请求：直接放行，既不读也不写缓存。
/// 2. 以完整 URI（路径 + 查询串）为 key，命中且未过期：直接返回缓存的 JSON，不再调用处理器。
/// 3. 未命中：调用处理器；只有 2xx 的 JSON 响应才会被写入缓存，错误原样透传。
pub async fn cache_middleware(
    State(cache): State<Arc<ResponseCache>>,
    req: Request,
    next: Next,
) -> Response {
    if req.method() != Method::GET || req.headers().contains_key(header::AUTHORIZATION) {
        return next.run(req).await;
    }

    // 绝对形式 / HTTP/2 的 URI 带有协议和主机，key 只取路径 + 查询串
    let key = req
        .uri()
        .path_and_query()
        .map_or_else(|| req.uri().path().to_string(), |pq| pq.as_str().to_string());
    if let Some(data) = cache.get(&key) {
        tracing::debug!("✅ Cache hit: {}", key);
        return (
            StatusCode::OK,
            [(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))],
            data,
        )
            .into_response();
    }

    let response = next.run(req).await;
    if !response.status().is_success() || !is_json(&response) {
        return response;
    }

    let (parts, body) = response.into_parts();
    match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => {
            tracing::debug!("💾 Cache set: {}", key);
            cache.insert(key, bytes.clone());
            Response::from_parts(parts, Body::from(bytes))
        }
        Err(e) => {
            AppError::InternalServerError(format!("Failed to buffer response body: {}", e)).into_response()
        }
    }
}
