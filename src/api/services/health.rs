use actix_web::{HttpResponse, Responder, web};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::trace;

use crate::content;
use crate::services::AppServices;

use super::helpers::success_response;

// 应用启动时间
#[derive(Clone, Debug)]
pub struct AppStartTime {
    pub start_datetime: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub uptime: u64,
    pub checks: HealthChecks,
}

#[derive(Debug, Serialize)]
pub struct HealthChecks {
    pub content: ContentCheck,
    pub reminders_active: bool,
    pub prayer_alerts_running: bool,
    pub notifications: usize,
}

#[derive(Debug, Serialize)]
pub struct ContentCheck {
    pub adkar: usize,
    pub verses: usize,
    pub hadiths: usize,
}

pub struct HealthService;

impl HealthService {
    /// 外部数据源不参与健康检查，只报告本地状态
    pub async fn health_check(
        services: web::Data<AppServices>,
        app_start_time: web::Data<AppStartTime>,
    ) -> impl Responder {
        trace!("Received health check request");

        let library = content::library();
        let now = Utc::now();
        let uptime = (now - app_start_time.start_datetime).num_seconds().max(0) as u64;

        success_response(HealthResponse {
            status: "healthy",
            timestamp: now.to_rfc3339(),
            uptime,
            checks: HealthChecks {
                content: ContentCheck {
                    adkar: library.all_adkar().len(),
                    verses: library.verses().len(),
                    hadiths: library.hadiths().len(),
                },
                reminders_active: services.reminders.is_active(),
                prayer_alerts_running: services.alerts.is_running(),
                notifications: services.notifications.len(),
            },
        })
    }

    // 活跃性检查
    pub async fn liveness_check() -> impl Responder {
        trace!("Received liveness check request");
        HttpResponse::NoContent().finish()
    }
}

/// Health 路由 `/health`
pub fn health_routes() -> actix_web::Scope {
    web::scope("/health")
        .route("", web::get().to(HealthService::health_check))
        .route("", web::head().to(HealthService::health_check))
        .route("/live", web::get().to(HealthService::liveness_check))
        .route("/live", web::head().to(HealthService::liveness_check))
}
