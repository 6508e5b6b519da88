//! 界面偏好端点 `/preferences`

use actix_web::{Responder, web};
use serde::Serialize;

use crate::services::{AppServices, Preferences, PreferencesUpdate};

use super::helpers::success_response;

#[derive(Debug, Serialize)]
pub struct PreferencesView {
    #[serde(flatten)]
    pub preferences: Preferences,
    pub language_name: &'static str,
    pub rtl: bool,
}

impl From<Preferences> for PreferencesView {
    fn from(preferences: Preferences) -> Self {
        Self {
            language_name: preferences.language.native_name(),
            rtl: preferences.language.is_rtl(),
            preferences,
        }
    }
}

pub async fn get_preferences(services: web::Data<AppServices>) -> impl Responder {
    success_response(PreferencesView::from(services.preferences.get()))
}

pub async fn put_preferences(
    services: web::Data<AppServices>,
    body: web::Json<PreferencesUpdate>,
) -> impl Responder {
    success_response(PreferencesView::from(
        services.preferences.update(body.into_inner()),
    ))
}

pub async fn toggle_theme(services: web::Data<AppServices>) -> impl Responder {
    services.preferences.toggle_theme();
    success_response(PreferencesView::from(services.preferences.get()))
}

/// 偏好路由 `/preferences`
pub fn preferences_routes() -> actix_web::Scope {
    web::scope("/preferences")
        .route("", web::get().to(get_preferences))
        .route("", web::put().to(put_preferences))
        .route("/theme/toggle", web::post().to(toggle_theme))
}
