//! 位置端点 `/location`

use actix_web::{Responder, web};
use serde::{Deserialize, Serialize};
use tracing::{info, trace};

use crate::geo::Coordinates;
use crate::providers::{CitySuggestion, ReportedPosition};
use crate::services::{AppServices, FallbackLocation, Location};

use super::helpers::{api_result, success_response};

#[derive(Debug, Deserialize)]
pub struct CityRequest {
    pub city: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
}

#[derive(Debug, Serialize)]
pub struct LocationView {
    #[serde(flatten)]
    pub location: Location,
    pub fallback: FallbackLocation,
}

fn view(services: &AppServices, location: Location) -> LocationView {
    LocationView {
        location,
        fallback: services.location.fallback().clone(),
    }
}

pub async fn get_location(services: web::Data<AppServices>) -> impl Responder {
    trace!("API: get current location");
    success_response(view(&services, services.location.snapshot()))
}

/// 手动输入城市名
pub async fn put_city(
    services: web::Data<AppServices>,
    body: web::Json<CityRequest>,
) -> impl Responder {
    api_result(
        services
            .location
            .set_city(&body.city)
            .map(|loc| view(&services, loc)),
    )
}

/// 地图点选坐标
pub async fn put_coordinates(
    services: web::Data<AppServices>,
    body: web::Json<Coordinates>,
) -> impl Responder {
    let result = services.location.set_coordinates(body.into_inner()).await;
    api_result(result.map(|loc| view(&services, loc)))
}

/// 选择一个联想结果
pub async fn post_suggestion(
    services: web::Data<AppServices>,
    body: web::Json<CitySuggestion>,
) -> impl Responder {
    let location = services.location.choose_suggestion(&body);
    success_response(view(&services, location))
}

/// 客户端上报的定位结果
pub async fn post_geolocate(
    services: web::Data<AppServices>,
    body: web::Json<ReportedPosition>,
) -> impl Responder {
    let reported = body.into_inner();
    trace!("API: client reported geolocation {:?}", reported);
    let location = services.location.acquire(&reported).await;
    success_response(view(&services, location))
}

/// 服务端按 IP 定位
pub async fn post_locate_ip(services: web::Data<AppServices>) -> impl Responder {
    let location = services.location.acquire(services.position.as_ref()).await;
    info!("API: IP-based location resolved to '{}'", location.city);
    success_response(view(&services, location))
}

pub async fn search_cities(
    services: web::Data<AppServices>,
    query: web::Query<SearchQuery>,
) -> impl Responder {
    api_result(services.location.search(&query.q).await)
}

/// 位置路由 `/location`
pub fn location_routes() -> actix_web::Scope {
    web::scope("/location")
        .route("", web::get().to(get_location))
        .route("/city", web::put().to(put_city))
        .route("/coordinates", web::put().to(put_coordinates))
        .route("/suggestion", web::post().to(post_suggestion))
        .route("/geolocate", web::post().to(post_geolocate))
        .route("/ip", web::post().to(post_locate_ip))
        .route("/search", web::get().to(search_cities))
}
