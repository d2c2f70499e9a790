use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// 响应状态：2xx 为 success，4xx 为 fail，5xx 为 error。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResStatus {
    Success,
    Fail,
    Error,
}

impl From<StatusCode> for ResStatus {
    fn from(code: StatusCode) -> Self {
        if code.is_server_error() {
            ResStatus::Error
        } else if code.is_client_error() {
            ResStatus::Fail
        } else {
            ResStatus::Success
        }
    }
}

/// 统一响应信封：`{status, token?, message?, data?}`。
#[derive(Debug, Serialize)]
pub struct Res<T> {
    #[serde(skip)]
    pub code: StatusCode,
    pub status: ResStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> Res<T>
where
    T: Serialize,
{
    pub fn with_data(data: T) -> Self {
        Self::with_code(StatusCode::OK, data)
    }

    pub fn with_code(code: StatusCode, data: T) -> Self {
        Self {
            code,
            status: code.into(),
            token: None,
            message: None,
            data: Some(data),
        }
    }

    /// 认证成功的响应：Access Token 放在信封顶层。
    pub fn with_token(code: StatusCode, token: String, data: T) -> Self {
        Self {
            token: Some(token),
            ..Self::with_code(code, data)
        }
    }
}

impl Res<()> {
    pub fn with_msg(msg: &str) -> Self {
        Self {
            code: StatusCode::OK,
            status: ResStatus::Success,
            token: None,
            message: Some(msg.to_string()),
            data: None,
        }
    }

    pub fn with_error(code: StatusCode, msg: &str) -> Self {
        Self {
            code,
            status: code.into(),
            token: None,
            message: Some(msg.to_string()),
            data: None,
        }
    }
}

impl<T> IntoResponse for Res<T>
where
    T: Serialize,
{
    fn into_response(self) -> Response {
        (self.code, Json(self)).into_response()
    }
}
