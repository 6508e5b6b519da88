//! Nominatim 地理编码：坐标反查地名、城市名联想搜索
//!
//! Nominatim 的使用政策要求携带可识别的 User-Agent，由 `http` 模块统一添加。

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::http::{build_url, get_json, run_blocking};
use crate::config::StaticConfig;
use crate::errors::{Result, SalatError};
use crate::geo::Coordinates;

/// 反查失败或地址中没有可用字段时的地名
pub const UNKNOWN_PLACE: &str = "Unknown";

/// 联想搜索返回的最大条数
const SEARCH_LIMIT: u32 = 5;

/// 城市联想结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitySuggestion {
    pub name: String,
    pub display_name: String,
    pub coordinates: Coordinates,
}

/// Nominatim 返回的 address 对象（只保留地名回退链用到的字段）
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Address {
    pub city: Option<String>,
    pub town: Option<String>,
    pub village: Option<String>,
    pub hamlet: Option<String>,
    pub county: Option<String>,
    pub state: Option<String>,
}

impl Address {
    /// 地名回退链：city → town → village → hamlet → county → state
    pub fn place_name(&self) -> Option<&str> {
        [
            &self.city,
            &self.town,
            &self.village,
            &self.hamlet,
            &self.county,
            &self.state,
        ]
        .into_iter()
        .flatten()
        .map(String::as_str)
        .find(|s| !s.trim().is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    #[serde(default)]
    address: Option<Address>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    display_name: String,
    lat: String,
    lon: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    address: Option<Address>,
}

/// 地理编码
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// 坐标反查地名
    async fn reverse(&self, coords: Coordinates) -> Result<String>;

    /// 城市名联想
    async fn search(&self, query: &str) -> Result<Vec<CitySuggestion>>;
}

/// 解析反查响应，缺少 address 时返回 "Unknown"
pub fn parse_reverse(body: serde_json::Value) -> Result<String> {
    let resp: ReverseResponse = serde_json::from_value(body)?;
    Ok(resp
        .address
        .as_ref()
        .and_then(Address::place_name)
        .unwrap_or(UNKNOWN_PLACE)
        .to_string())
}

/// 解析搜索响应，坐标无法解析的条目会被跳过
pub fn parse_search(body: serde_json::Value) -> Result<Vec<CitySuggestion>> {
    let hits: Vec<SearchHit> = serde_json::from_value(body)?;
    Ok(hits
        .into_iter()
        .filter_map(|hit| {
            let latitude = hit.lat.parse::<f64>().ok()?;
            let longitude = hit.lon.parse::<f64>().ok()?;
            let name = hit
                .address
                .as_ref()
                .and_then(Address::place_name)
                .map(str::to_string)
                .or_else(|| hit.name.clone().filter(|n| !n.is_empty()))
                .unwrap_or_else(|| {
                    hit.display_name
                        .split(',')
                        .next()
                        .unwrap_or_default()
                        .trim()
                        .to_string()
                });
            Some(CitySuggestion {
                name,
                display_name: hit.display_name,
                coordinates: Coordinates::new(latitude, longitude),
            })
        })
        .collect())
}

pub struct NominatimClient {
    base_url: String,
}

impl NominatimClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    pub fn from_config(config: &StaticConfig) -> Self {
        Self::new(config.providers.nominatim_url.clone())
    }
}

#[async_trait]
impl Geocoder for NominatimClient {
    async fn reverse(&self, coords: Coordinates) -> Result<String> {
        let url = build_url(
            &self.base_url,
            "reverse",
            &[
                ("lat", coords.latitude.to_string()),
                ("lon", coords.longitude.to_string()),
                ("format", "json".to_string()),
            ],
        )?;
        let body = run_blocking("Nominatim", move || get_json(&url)).await?;
        let place = parse_reverse(body)?;
        trace!("Reverse geocoded {:?} to {}", coords, place);
        Ok(place)
    }

    async fn search(&self, query: &str) -> Result<Vec<CitySuggestion>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SalatError::validation("Search query must not be empty"));
        }

        let url = build_url(
            &self.base_url,
            "search",
            &[
                ("q", query.to_string()),
                ("format", "json".to_string()),
                ("addressdetails", "1".to_string()),
                ("limit", SEARCH_LIMIT.to_string()),
            ],
        )?;
        let body = run_blocking("Nominatim", move || get_json(&url)).await?;
        let suggestions = parse_search(body)?;
        debug!("City search '{}' returned {} suggestions", query, suggestions.len());
        Ok(suggestions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_place_name_fallback_chain() {
        let body = json!({"address": {"town": "Ifrane", "state": "Fès-Meknès"}});
        assert_eq!(parse_reverse(body).unwrap(), "Ifrane");

        let body = json!({"address": {"hamlet": "Tiznit", "county": "X"}});
        assert_eq!(parse_reverse(body).unwrap(), "Tiznit");

        let body = json!({"address": {"state": "Makkah Province"}});
        assert_eq!(parse_reverse(body).unwrap(), "Makkah Province");
    }

    #[test]
    fn test_place_name_prefers_city() {
        let body = json!({"address": {"city": "Rabat", "town": "Other", "village": "V"}});
        assert_eq!(parse_reverse(body).unwrap(), "Rabat");
    }

    #[test]
    fn test_reverse_without_address_is_unknown() {
        assert_eq!(parse_reverse(json!({"error": "Unable to geocode"})).unwrap(), UNKNOWN_PLACE);
        assert_eq!(parse_reverse(json!({"address": {"road": "Main St"}})).unwrap(), UNKNOWN_PLACE);
    }

    #[test]
    fn test_parse_search() {
        let body = json!([
            {
                "display_name": "Casablanca, Casablanca-Settat, Morocco",
                "lat": "33.5950627",
                "lon": "-7.6187768",
                "name": "Casablanca",
                "address": {"city": "Casablanca", "state": "Casablanca-Settat"}
            },
            {
                "display_name": "Somewhere, Nowhere",
                "lat": "not-a-number",
                "lon": "1.0"
            },
            {
                "display_name": "Little Place, Region",
                "lat": "10.5",
                "lon": "20.25"
            }
        ]);
        let results = parse_search(body).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].name, "Casablanca");
        assert_eq!(results[0].coordinates.latitude, 33.5950627);
        assert_eq!(results[1].name, "Little Place");
    }

    #[tokio::test]
    async fn test_empty_search_is_rejected_without_network() {
        let client = NominatimClient::new("http://127.0.0.1:9");
        let err = client.search("   ").await.unwrap_err();
        assert!(matches!(err, SalatError::Validation(_)));
    }

    /// 依赖外部网络服务，CI 环境可能失败
    #[tokio::test]
    #[ignore]
    async fn test_real_reverse() {
        let client = NominatimClient::new("https://nominatim.openstreetmap.org");
        let place = client
            .reverse(Coordinates::new(21.422510, 39.826168))
            .await
            .unwrap();
        assert_ne!(place, UNKNOWN_PLACE);
    }
}
