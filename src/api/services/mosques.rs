//! 清真寺与路线端点

use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use tracing::trace;

use crate::errors::{Result, SalatError};
use crate::geo::Coordinates;
use crate::providers::openroute::travel_modes;
use crate::services::AppServices;

use super::helpers::{error_from_salat, fetch_response, success_response};

#[derive(Debug, Default, Deserialize)]
pub struct NearbyQuery {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct RouteQuery {
    pub mosque_lat: f64,
    pub mosque_lon: f64,
    /// 默认 driving-car
    pub mode: Option<String>,
    pub from_lat: Option<f64>,
    pub from_lon: Option<f64>,
}

/// 指定坐标，缺省时使用当前位置（或兜底位置）
fn origin(services: &AppServices, lat: Option<f64>, lon: Option<f64>) -> Result<Coordinates> {
    match (lat, lon) {
        (Some(lat), Some(lon)) => Coordinates::validated(lat, lon),
        (None, None) => Ok(services.location.coordinates_or_fallback()),
        _ => Err(SalatError::validation("Both latitude and longitude are required")),
    }
}

const DEFAULT_MODE: &str = "driving-car";

/// 出行方式名称，缺省为 driving-car；未知名称交给服务层按暂不支持处理
pub fn mode_name(raw: Option<&str>) -> &str {
    match raw.map(str::trim) {
        Some(raw) if !raw.is_empty() => raw,
        _ => DEFAULT_MODE,
    }
}

pub async fn nearby(
    services: web::Data<AppServices>,
    query: web::Query<NearbyQuery>,
) -> HttpResponse {
    let center = match origin(&services, query.lat, query.lon) {
        Ok(c) => c,
        Err(e) => return error_from_salat(&e),
    };
    trace!("API: mosques around {:?}", center);
    fetch_response(services.mosques.search(center).await)
}

fn prepare_route(services: &AppServices, query: &RouteQuery) -> Result<(Coordinates, Coordinates)> {
    let to = Coordinates::validated(query.mosque_lat, query.mosque_lon)?;
    let from = origin(services, query.from_lat, query.from_lon)?;
    Ok((from, to))
}

pub async fn route(
    services: web::Data<AppServices>,
    query: web::Query<RouteQuery>,
) -> HttpResponse {
    match prepare_route(&services, &query) {
        Ok((from, to)) => {
            let mode = mode_name(query.mode.as_deref());
            trace!("API: route ({}) {:?} -> {:?}", mode, from, to);
            fetch_response(services.mosques.route_named(mode, from, to).await)
        }
        Err(e) => error_from_salat(&e),
    }
}

pub async fn list_travel_modes() -> impl Responder {
    success_response(travel_modes())
}

/// 清真寺路由 `/mosques` 与 `/travel-modes`
pub fn mosque_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/mosques")
            .route("", web::get().to(nearby))
            .route("/route", web::get().to(route)),
    )
    .route("/travel-modes", web::get().to(list_travel_modes));
}
