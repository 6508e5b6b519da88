//! API 端点
//!
//! 所有端点挂在 `server.api_prefix`（默认 `/api/v1`）下，统一返回
//! `{code, message, data}` 信封。

pub mod content;
pub mod error_code;
pub mod health;
mod helpers;
pub mod location;
pub mod mosques;
pub mod notifications;
pub mod prayer;
pub mod preferences;
pub mod reminders;

use actix_web::web;

pub use error_code::ErrorCode;
pub use health::{AppStartTime, HealthService, health_routes};
pub use helpers::{
    ApiResponse, api_result, error_from_salat, error_response, fetch_response, json_response,
    success_response,
};

/// 注册全部 API 路由
///
/// 调用方负责提供 `web::Data<AppServices>` 与 `web::Data<AppStartTime>`。
pub fn api_routes(api_prefix: &str) -> actix_web::Scope {
    web::scope(api_prefix)
        .service(health_routes())
        .service(location::location_routes())
        .service(prayer::prayer_routes())
        .service(content::content_routes())
        .service(notifications::notification_routes())
        .service(reminders::reminder_routes())
        .service(preferences::preferences_routes())
        .configure(mosques::mosque_routes)
}
