//! 礼拜时间端点 `/prayers`

use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use tracing::trace;

use crate::errors::{Result, SalatError};
use crate::geo::Coordinates;
use crate::services::prayer::MSG_PRAYER_FETCH_FAILED;
use crate::services::{AppServices, FetchState, PrayerDay, PrayerQuery};

use super::helpers::{api_result, error_from_salat, fetch_response, success_response};

/// 可选的位置覆盖参数
#[derive(Debug, Default, Deserialize)]
pub struct PlaceQuery {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub city: Option<String>,
}

impl PlaceQuery {
    pub fn coordinates(&self) -> Result<Option<Coordinates>> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Coordinates::validated(lat, lon).map(Some),
            (None, None) => Ok(None),
            _ => Err(SalatError::validation(
                "Both lat and lon are required when overriding coordinates",
            )),
        }
    }

    /// 显式指定的查询目标；未指定时返回 None
    pub fn to_query(&self) -> Result<Option<PrayerQuery>> {
        if let Some(coords) = self.coordinates()? {
            return Ok(Some(PrayerQuery::Coordinates(coords)));
        }
        Ok(self
            .city
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(|c| PrayerQuery::City(c.to_string())))
    }
}

fn coordinates_or_current(services: &AppServices, query: &PlaceQuery) -> Result<Coordinates> {
    Ok(query
        .coordinates()?
        .unwrap_or_else(|| services.location.coordinates_or_fallback()))
}

/// 当天礼拜时间 + 当前/下一次
///
/// 不带参数时按当前位置查询并刷新共享的当天列表（到点提醒使用该列表）。
/// 当前/下一次按查询地点的当地时间计算。
pub async fn get_prayers(
    services: web::Data<AppServices>,
    query: web::Query<PlaceQuery>,
) -> HttpResponse {
    let explicit = match query.to_query() {
        Ok(q) => q,
        Err(e) => return error_from_salat(&e),
    };

    let state: FetchState<PrayerDay> = match explicit {
        Some(q) => {
            trace!("API: prayer times for explicit query {:?}", q);
            FetchState::from_result(services.prayer.prayer_day(&q).await, MSG_PRAYER_FETCH_FAILED)
        }
        None => {
            let q = PrayerQuery::resolve(
                &services.location.snapshot(),
                services.prayer.default_city(),
            );
            let (state, now) =
                tokio::join!(services.prayer.refresh(&q), services.prayer.clock_for(&q));
            state.map(|prayers| PrayerDay::build(prayers, now.date(), now.time()))
        }
    };

    fetch_response(state)
}

/// 从今天起 7 天的时间表
pub async fn get_weekly(
    services: web::Data<AppServices>,
    query: web::Query<PlaceQuery>,
) -> impl Responder {
    let coords = match coordinates_or_current(&services, &query) {
        Ok(c) => c,
        Err(e) => return error_from_salat(&e),
    };
    let today = services
        .prayer
        .clock_for(&PrayerQuery::Coordinates(coords))
        .await
        .date();
    api_result(services.prayer.weekly(coords, today).await)
}

/// 时区与 GMT 偏移；失败时 data 为空字段
pub async fn get_timezone(
    services: web::Data<AppServices>,
    query: web::Query<PlaceQuery>,
) -> impl Responder {
    let coords = match coordinates_or_current(&services, &query) {
        Ok(c) => c,
        Err(e) => return error_from_salat(&e),
    };
    success_response(services.prayer.timezone(coords).await)
}

/// 礼拜时间路由 `/prayers`
pub fn prayer_routes() -> actix_web::Scope {
    web::scope("/prayers")
        .route("", web::get().to(get_prayers))
        .route("/weekly", web::get().to(get_weekly))
        .route("/timezone", web::get().to(get_timezone))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_place_query_precedence() {
        let q = PlaceQuery {
            lat: Some(21.4),
            lon: Some(39.8),
            city: Some("Cairo".into()),
        };
        assert!(matches!(q.to_query().unwrap(), Some(PrayerQuery::Coordinates(_))));

        let q = PlaceQuery {
            city: Some("  Cairo ".into()),
            ..Default::default()
        };
        assert_eq!(q.to_query().unwrap(), Some(PrayerQuery::City("Cairo".into())));

        let q = PlaceQuery {
            city: Some("   ".into()),
            ..Default::default()
        };
        assert_eq!(q.to_query().unwrap(), None);
    }

    #[test]
    fn test_place_query_rejects_half_coordinates() {
        let q = PlaceQuery {
            lat: Some(10.0),
            ..Default::default()
        };
        assert!(q.to_query().is_err());

        let q = PlaceQuery {
            lat: Some(100.0),
            lon: Some(0.0),
            city: None,
        };
        assert!(q.coordinates().is_err());
    }
}
