//! 统一 API 错误码定义

use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::errors::SalatError;

/// API 错误码枚举
///
/// 使用 serde_repr 序列化为数字。按千位分域：
/// - 0: 成功
/// - 1000-1099: 通用错误
/// - 2000-2099: 空态（无结果、不支持），HTTP 状态仍为 200
/// - 3000-3099: 上游数据源错误
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    // 通用错误 1000-1099
    BadRequest = 1000,
    PermissionDenied = 1003,
    NotFound = 1004,
    InternalServerError = 1005,
    InvalidDateFormat = 1012,

    // 空态 2000-2099
    NoResults = 2000,
    Unsupported = 2001,

    // 上游错误 3000-3099
    UpstreamFailed = 3000,
    UpstreamTimeout = 3001,
}

impl From<&SalatError> for ErrorCode {
    fn from(err: &SalatError) -> Self {
        match err {
            SalatError::Validation(_) => ErrorCode::BadRequest,
            SalatError::NotFound(_) => ErrorCode::NotFound,
            SalatError::PermissionDenied(_) => ErrorCode::PermissionDenied,
            SalatError::Upstream(_) => ErrorCode::UpstreamFailed,
            SalatError::Timeout(_) => ErrorCode::UpstreamTimeout,
            SalatError::Unsupported(_) => ErrorCode::Unsupported,
            SalatError::NoResults(_) => ErrorCode::NoResults,
            SalatError::DateParse(_) => ErrorCode::InvalidDateFormat,
            SalatError::Serialization(_) | SalatError::FileOperation(_) | SalatError::Config(_) => {
                ErrorCode::InternalServerError
            }
        }
    }
}

impl From<SalatError> for ErrorCode {
    fn from(err: SalatError) -> Self {
        ErrorCode::from(&err)
    }
}
