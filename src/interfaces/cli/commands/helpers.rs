//! 命令间共享的位置解析与输出辅助

use colored::Colorize;

use crate::cli::PlaceArgs;
use crate::errors::SalatError;
use crate::geo::Coordinates;
use crate::interfaces::cli::CliError;
use crate::services::{AppServices, Location, PrayerQuery};

pub fn info_line(message: &str) {
    println!("{} {}", "ℹ".bold().blue(), message);
}

pub fn warn_line(message: &str) {
    println!("{} {}", "⚠".bold().yellow(), message.yellow());
}

/// IP 自动定位；失败时提示并继续使用兜底位置
pub async fn auto_locate(services: &AppServices) -> Location {
    let location = services.location.acquire(services.position.as_ref()).await;
    if let Some(error) = &location.error {
        warn_line(error);
    }
    location
}

/// 解析为礼拜时间查询目标
pub async fn resolve_query(
    services: &AppServices,
    place: &PlaceArgs,
) -> Result<PrayerQuery, CliError> {
    if let (Some(lat), Some(lon)) = (place.lat, place.lon) {
        return Ok(PrayerQuery::Coordinates(Coordinates::validated(lat, lon)?));
    }
    if let Some(city) = place.city.as_deref() {
        let location = services.location.set_city(city)?;
        return Ok(PrayerQuery::City(location.city));
    }

    let location = if place.auto {
        auto_locate(services).await
    } else {
        services.location.snapshot()
    };
    Ok(PrayerQuery::resolve(&location, services.prayer.default_city()))
}

/// 解析为坐标；给出城市名时取联想结果的第一项
pub async fn resolve_coordinates(
    services: &AppServices,
    place: &PlaceArgs,
) -> Result<(String, Coordinates), CliError> {
    match resolve_query(services, place).await? {
        PrayerQuery::Coordinates(coords) => {
            let label = if place.lat.is_some() {
                format!("{:.4}, {:.4}", coords.latitude, coords.longitude)
            } else {
                services.location.snapshot().city
            };
            Ok((label, coords))
        }
        PrayerQuery::City(city) => {
            let suggestion = services
                .location
                .search(&city)
                .await?
                .into_iter()
                .next()
                .ok_or_else(|| SalatError::no_results(format!("No city matches '{}'", city)))?;
            Ok((suggestion.name, suggestion.coordinates))
        }
    }
}

pub fn print_json<T: serde::Serialize>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
