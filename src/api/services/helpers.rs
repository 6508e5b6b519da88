//! API 帮助函数：统一响应信封 `{code, message, data}`

use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::errors::SalatError;
use crate::services::FetchState;

use super::error_code::ErrorCode;

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ApiResponse<T> {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// 构建 JSON 响应
pub fn json_response<T: Serialize>(
    status: StatusCode,
    code: ErrorCode,
    message: impl Into<String>,
    data: Option<T>,
) -> HttpResponse {
    HttpResponse::build(status)
        .append_header(("Content-Type", "application/json; charset=utf-8"))
        .json(ApiResponse {
            code,
            message: message.into(),
            data,
        })
}

/// 构建成功响应
pub fn success_response<T: Serialize>(data: T) -> HttpResponse {
    json_response(StatusCode::OK, ErrorCode::Success, "OK", Some(data))
}

/// 构建错误响应
pub fn error_response(status: StatusCode, error_code: ErrorCode, message: &str) -> HttpResponse {
    json_response::<()>(status, error_code, message, None)
}

/// 从 SalatError 构建错误响应（自动映射 HTTP 状态码和 ErrorCode）
pub fn error_from_salat(err: &SalatError) -> HttpResponse {
    error_response(err.http_status(), ErrorCode::from(err), err.message())
}

/// 统一 Result → HttpResponse 转换
pub fn api_result<T: Serialize>(result: Result<T, SalatError>) -> HttpResponse {
    match result {
        Ok(data) => success_response(data),
        Err(e) => error_from_salat(&e),
    }
}

/// 把数据槽状态整体放进 data，code 与状态对应
///
/// 空态返回 200，失败返回 502；两种情况 message 都是展示文案。
pub fn fetch_response<T: Serialize>(state: FetchState<T>) -> HttpResponse {
    let (status, code) = match &state {
        FetchState::Empty(_) => (StatusCode::OK, ErrorCode::NoResults),
        FetchState::Failed(_) => (StatusCode::BAD_GATEWAY, ErrorCode::UpstreamFailed),
        _ => (StatusCode::OK, ErrorCode::Success),
    };
    let message = state.message().unwrap_or("OK").to_string();
    json_response(status, code, message, Some(state))
}
