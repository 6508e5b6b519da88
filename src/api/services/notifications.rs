//! 通知端点 `/notifications`
//!
//! toast 通过 Server-Sent Events 推送，每条事件为 `event: toast` + JSON。

use actix_web::http::header::{self, ContentEncoding};
use actix_web::{HttpResponse, Responder, web};
use futures_util::stream;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use crate::errors::SalatError;
use crate::services::{
    AppServices, NewNotification, NotificationItem, NotificationPermission, Toast,
};

use super::helpers::{api_result, success_response};

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// 返回全部历史，而不只是最近几条
    #[serde(default)]
    pub all: bool,
}

#[derive(Debug, Serialize)]
pub struct NotificationList {
    pub items: Vec<NotificationItem>,
    pub total: usize,
    pub permission: NotificationPermission,
}

#[derive(Debug, Serialize)]
pub struct PermissionResponse {
    pub permission: NotificationPermission,
}

pub async fn list_notifications(
    services: web::Data<AppServices>,
    query: web::Query<ListQuery>,
) -> impl Responder {
    let center = &services.notifications;
    let items = if query.all { center.all() } else { center.recent() };
    success_response(NotificationList {
        items,
        total: center.len(),
        permission: center.permission(),
    })
}

pub async fn clear_notifications(services: web::Data<AppServices>) -> impl Responder {
    services.notifications.clear();
    success_response(NotificationList {
        items: Vec::new(),
        total: 0,
        permission: services.notifications.permission(),
    })
}

pub async fn post_notification(
    services: web::Data<AppServices>,
    body: web::Json<NewNotification>,
) -> impl Responder {
    let request = body.into_inner();
    if request.title.trim().is_empty() {
        return api_result::<()>(Err(SalatError::validation(
            "Notification title must not be empty",
        )));
    }
    success_response(services.notifications.show(request))
}

/// 显式请求桌面通知权限
pub async fn request_permission(services: web::Data<AppServices>) -> impl Responder {
    let permission = services.notifications.request_permission();
    info!("API: desktop notification permission is {:?}", permission);
    success_response(PermissionResponse { permission })
}

/// 单条 toast 编码为 SSE 帧
pub fn sse_frame(toast: &Toast) -> Result<web::Bytes, serde_json::Error> {
    let payload = serde_json::to_string(toast)?;
    Ok(web::Bytes::from(format!("event: toast\ndata: {}\n\n", payload)))
}

pub async fn stream_toasts(services: web::Data<AppServices>) -> HttpResponse {
    let receiver = services.notifications.subscribe();
    debug!("API: new toast stream subscriber");

    let toasts = stream::unfold(receiver, |mut receiver| async move {
        loop {
            match receiver.recv().await {
                Ok(toast) => match sse_frame(&toast) {
                    Ok(frame) => return Some((Ok::<_, actix_web::Error>(frame), receiver)),
                    Err(e) => warn!("Failed to encode toast: {}", e),
                },
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Toast stream lagged, {} toasts skipped", skipped);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });

    HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, "text/event-stream"))
        .insert_header((header::CACHE_CONTROL, "no-cache"))
        // 压缩会缓冲事件，SSE 必须原样输出
        .insert_header(ContentEncoding::Identity)
        .streaming(toasts)
}

/// 通知路由 `/notifications`
pub fn notification_routes() -> actix_web::Scope {
    web::scope("/notifications")
        .route("", web::get().to(list_notifications))
        .route("", web::post().to(post_notification))
        .route("", web::delete().to(clear_notifications))
        .route("/permission", web::post().to(request_permission))
        .route("/stream", web::get().to(stream_toasts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{NotificationKind, ToastLevel};
    use chrono::Utc;
    use uuid::Uuid;

    #[test]
    fn test_sse_frame_shape() {
        let toast = Toast {
            item: NotificationItem {
                id: Uuid::new_v4(),
                title: "Daily Adkar".into(),
                message: "سبحان الله - Glory be to Allah...".into(),
                kind: NotificationKind::Adkar,
                timestamp: Utc::now(),
            },
            level: ToastLevel::Success,
        };
        let frame = sse_frame(&toast).unwrap();
        let text = std::str::from_utf8(&frame).unwrap();
        assert!(text.starts_with("event: toast\ndata: {"));
        assert!(text.ends_with("\n\n"));
        assert!(text.contains("\"level\":\"success\""));
        assert!(text.contains("\"kind\":\"adkar\""));
    }
}
