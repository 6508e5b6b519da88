//! OpenRouteService 路线规划
//!
//! 请求与响应中的坐标顺序都是 `lon,lat`，进出本模块时统一转换为 `Coordinates`。

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter, EnumString, IntoEnumIterator};
use tracing::debug;

use super::http::{build_url, get_json, run_blocking};
use crate::config::StaticConfig;
use crate::errors::{Result, SalatError};
use crate::geo::Coordinates;

/// 未定义颜色的出行方式使用的路线颜色
pub const DEFAULT_ROUTE_COLOR: &str = "blue";

/// 出行方式
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, AsRefStr, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum TravelMode {
    DrivingCar,
    CyclingRegular,
    FootWalking,
    DrivingHgv,
    PublicTransport,
    Scooter,
    Taxi,
}

impl TravelMode {
    pub fn label(&self) -> &'static str {
        match self {
            Self::DrivingCar => "Car",
            Self::CyclingRegular => "Bike",
            Self::FootWalking => "Walking",
            Self::DrivingHgv => "Bus",
            Self::PublicTransport => "Train",
            Self::Scooter => "Scooter",
            Self::Taxi => "Taxi",
        }
    }

    /// 路线服务是否支持该方式
    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Scooter | Self::Taxi)
    }

    pub fn color(&self) -> &'static str {
        match self {
            Self::DrivingCar => "#2563eb",
            Self::CyclingRegular => "#22c55e",
            Self::FootWalking => "#f59e42",
            Self::DrivingHgv => "#a21caf",
            Self::PublicTransport => "#0ea5e9",
            Self::Scooter | Self::Taxi => DEFAULT_ROUTE_COLOR,
        }
    }
}

impl std::fmt::Display for TravelMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_ref())
    }
}

/// `/travel-modes` 的展示项
#[derive(Debug, Clone, Serialize)]
pub struct TravelModeInfo {
    pub key: TravelMode,
    pub label: &'static str,
    pub supported: bool,
    pub color: &'static str,
}

pub fn travel_modes() -> Vec<TravelModeInfo> {
    TravelMode::iter()
        .map(|mode| TravelModeInfo {
            key: mode,
            label: mode.label(),
            supported: mode.is_supported(),
            color: mode.color(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteStep {
    pub instruction: String,
    pub name: Option<String>,
    pub distance_m: f64,
}

/// 路线
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub mode: TravelMode,
    /// 路径点（lat/lon）
    pub path: Vec<Coordinates>,
    pub distance_m: f64,
    pub duration_s: f64,
    pub steps: Vec<RouteStep>,
}

/// 路线摘要（展示用）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteSummary {
    /// 两位小数的公里数
    pub distance_km: String,
    /// 向上取整的分钟数
    pub duration_min: u64,
    pub color: &'static str,
}

impl Route {
    pub fn summary(&self) -> RouteSummary {
        RouteSummary {
            distance_km: format!("{:.2}", self.distance_m / 1000.0),
            duration_min: (self.duration_s / 60.0).ceil().max(0.0) as u64,
            color: self.mode.color(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawStep {
    #[serde(default)]
    instruction: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    distance: f64,
}

#[derive(Debug, Deserialize)]
struct Segment {
    #[serde(default)]
    distance: f64,
    #[serde(default)]
    duration: f64,
    #[serde(default)]
    steps: Vec<RawStep>,
}

#[derive(Debug, Deserialize)]
struct Properties {
    #[serde(default)]
    segments: Vec<Segment>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    coordinates: Vec<[f64; 2]>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    geometry: Geometry,
    properties: Properties,
}

#[derive(Debug, Deserialize)]
struct Directions {
    #[serde(default)]
    features: Vec<Feature>,
}

#[async_trait]
pub trait RouteSource: Send + Sync {
    async fn route(&self, mode: TravelMode, from: Coordinates, to: Coordinates) -> Result<Route>;
}

/// `lon,lat` 形式的坐标参数
fn lon_lat(c: Coordinates) -> String {
    format!("{},{}", c.longitude, c.latitude)
}

/// 解析 GeoJSON 响应；没有 feature 时返回 NoResults
pub fn parse_directions(body: serde_json::Value, mode: TravelMode) -> Result<Route> {
    let directions: Directions = serde_json::from_value(body)?;
    let feature = directions
        .features
        .into_iter()
        .next()
        .ok_or_else(|| SalatError::no_results("No route found."))?;

    let path = feature
        .geometry
        .coordinates
        .iter()
        .map(|[lon, lat]| Coordinates::new(*lat, *lon))
        .collect();

    let (distance_m, duration_s, steps) = match feature.properties.segments.into_iter().next() {
        Some(segment) => (
            segment.distance,
            segment.duration,
            segment
                .steps
                .into_iter()
                .map(|s| RouteStep {
                    instruction: s.instruction,
                    // ORS 用 "-" 表示无名道路
                    name: s.name.filter(|n| !n.is_empty() && n != "-"),
                    distance_m: s.distance,
                })
                .collect(),
        ),
        None => (0.0, 0.0, Vec::new()),
    };

    Ok(Route {
        mode,
        path,
        distance_m,
        duration_s,
        steps,
    })
}

pub struct OpenRouteClient {
    base_url: String,
    api_key: Option<String>,
}

impl OpenRouteClient {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key,
        }
    }

    pub fn from_config(config: &StaticConfig) -> Self {
        Self::new(
            config.providers.openroute_url.clone(),
            config.providers.openroute_api_key.clone(),
        )
    }
}

#[async_trait]
impl RouteSource for OpenRouteClient {
    async fn route(&self, mode: TravelMode, from: Coordinates, to: Coordinates) -> Result<Route> {
        let api_key = self
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| SalatError::config("OpenRouteService API key is not configured"))?;

        let url = build_url(
            &self.base_url,
            &format!("v2/directions/{}", mode),
            &[
                ("api_key", api_key),
                ("start", lon_lat(from)),
                ("end", lon_lat(to)),
            ],
        )?;
        debug!("Requesting {} route {:?} -> {:?}", mode, from, to);
        let body = run_blocking("OpenRouteService", move || get_json(&url)).await?;
        parse_directions(body, mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    #[test]
    fn test_travel_mode_support_table() {
        let supported: Vec<_> = TravelMode::iter().filter(|m| m.is_supported()).collect();
        assert_eq!(
            supported,
            vec![
                TravelMode::DrivingCar,
                TravelMode::CyclingRegular,
                TravelMode::FootWalking,
                TravelMode::DrivingHgv,
                TravelMode::PublicTransport,
            ]
        );
        assert!(!TravelMode::Scooter.is_supported());
        assert!(!TravelMode::Taxi.is_supported());
    }

    #[test]
    fn test_travel_mode_strings() {
        assert_eq!(TravelMode::FootWalking.to_string(), "foot-walking");
        assert_eq!(TravelMode::from_str("driving-hgv").unwrap(), TravelMode::DrivingHgv);
        assert!(TravelMode::from_str("wheelchair").is_err());
        assert_eq!(
            serde_json::to_value(TravelMode::PublicTransport).unwrap(),
            "public-transport"
        );
        assert_eq!(TravelMode::Taxi.color(), DEFAULT_ROUTE_COLOR);
        assert_eq!(travel_modes().len(), 7);
    }

    #[test]
    fn test_parse_directions_swaps_coordinates() {
        let body = json!({
            "type": "FeatureCollection",
            "features": [{
                "geometry": {"coordinates": [[39.82, 21.42], [39.83, 21.43]], "type": "LineString"},
                "properties": {
                    "segments": [{
                        "distance": 1534.7,
                        "duration": 301.2,
                        "steps": [
                            {"instruction": "Head north", "name": "King Fahd Rd", "distance": 800.4},
                            {"instruction": "Arrive", "name": "-", "distance": 0.0}
                        ]
                    }]
                }
            }]
        });
        let route = parse_directions(body, TravelMode::FootWalking).unwrap();
        assert_eq!(route.path[0], Coordinates::new(21.42, 39.82));
        assert_eq!(route.steps.len(), 2);
        assert_eq!(route.steps[0].name.as_deref(), Some("King Fahd Rd"));
        assert_eq!(route.steps[1].name, None);

        let summary = route.summary();
        assert_eq!(summary.distance_km, "1.53");
        assert_eq!(summary.duration_min, 6);
        assert_eq!(summary.color, "#f59e42");
    }

    #[test]
    fn test_parse_directions_without_features() {
        let err = parse_directions(json!({"features": []}), TravelMode::DrivingCar).unwrap_err();
        assert!(matches!(err, SalatError::NoResults(ref m) if m == "No route found."));

        let err = parse_directions(json!({"error": "x"}), TravelMode::DrivingCar).unwrap_err();
        assert!(err.is_empty_state());
    }

    #[tokio::test]
    async fn test_missing_api_key_is_config_error() {
        let client = OpenRouteClient::new("http://127.0.0.1:9", None);
        let err = client
            .route(
                TravelMode::DrivingCar,
                Coordinates::new(0.0, 0.0),
                Coordinates::new(0.1, 0.1),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, SalatError::Config(_)));
    }
}
