//! 提醒端点 `/reminders`

use std::str::FromStr;

use actix_web::{Responder, web};
use tracing::info;

use crate::errors::SalatError;
use crate::services::{AppServices, ReminderKind};

use super::helpers::{api_result, success_response};

pub async fn get_status(services: web::Data<AppServices>) -> impl Responder {
    success_response(services.reminders.status())
}

pub async fn toggle(services: web::Data<AppServices>) -> impl Responder {
    let active = services.reminders.toggle();
    info!("API: reminders toggled, active = {}", active);
    success_response(services.reminders.status())
}

/// 立即推送一条指定类型的提醒（adkar | quran）
pub async fn trigger(services: web::Data<AppServices>, path: web::Path<String>) -> impl Responder {
    let raw = path.into_inner();
    let result = ReminderKind::from_str(&raw.to_lowercase())
        .map_err(|_| SalatError::validation(format!("Unknown reminder kind: {}", raw)))
        .and_then(|kind| {
            services
                .reminders
                .trigger(kind)
                .ok_or_else(|| SalatError::not_found("No content available for this reminder"))
        });
    api_result(result)
}

/// 提醒路由 `/reminders`
pub fn reminder_routes() -> actix_web::Scope {
    web::scope("/reminders")
        .route("", web::get().to(get_status))
        .route("/toggle", web::post().to(toggle))
        .route("/trigger/{kind}", web::post().to(trigger))
}
