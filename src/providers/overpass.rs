//! Overpass API：按半径查找附近清真寺
//!
//! 查询 `amenity=place_of_worship` + `religion=muslim` 的 node/way/relation，
//! 使用 `out center` 让 way/relation 也带上中心点坐标。

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::http::{post_json, run_blocking};
use crate::config::StaticConfig;
use crate::errors::Result;
use crate::geo::Coordinates;

/// 没有 name 标签时的显示名称
pub const UNNAMED_MOSQUE: &str = "Unnamed Mosque";

/// OSM 元素类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    Node,
    Way,
    Relation,
}

/// 清真寺
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mosque {
    pub id: u64,
    pub element_type: ElementType,
    pub coordinates: Coordinates,
    pub name: String,
    pub address: Option<String>,
    pub tags: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct LatLon {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct Element {
    #[serde(rename = "type")]
    element_type: ElementType,
    id: u64,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
    #[serde(default)]
    center: Option<LatLon>,
    #[serde(default)]
    tags: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<Element>,
}

#[async_trait]
pub trait MosqueSource: Send + Sync {
    async fn nearby(&self, center: Coordinates, radius_m: u32) -> Result<Vec<Mosque>>;
}

/// 构造 Overpass QL 查询
pub fn build_query(center: Coordinates, radius_m: u32, timeout_secs: u32) -> String {
    let around = format!(
        "(around:{},{},{})",
        radius_m, center.latitude, center.longitude
    );
    let filter = r#"["amenity"="place_of_worship"]["religion"="muslim"]"#;
    format!(
        "[out:json][timeout:{timeout}];\n(\n  node{f}{a};\n  way{f}{a};\n  relation{f}{a};\n);\nout center;",
        timeout = timeout_secs,
        f = filter,
        a = around
    )
}

/// 地址：addr:full → addr:street → addr:city
fn address_of(tags: &BTreeMap<String, String>) -> Option<String> {
    ["addr:full", "addr:street", "addr:city"]
        .iter()
        .filter_map(|key| tags.get(*key))
        .find(|v| !v.trim().is_empty())
        .cloned()
}

impl Element {
    fn into_mosque(self) -> Option<Mosque> {
        // 自身坐标优先，其次 center
        let coordinates = match (self.lat, self.lon, &self.center) {
            (Some(lat), Some(lon), _) => Coordinates::new(lat, lon),
            (_, _, Some(c)) => Coordinates::new(c.lat, c.lon),
            _ => return None,
        };
        let name = self
            .tags
            .get("name")
            .filter(|n| !n.trim().is_empty())
            .cloned()
            .unwrap_or_else(|| UNNAMED_MOSQUE.to_string());

        Some(Mosque {
            id: self.id,
            element_type: self.element_type,
            coordinates,
            name,
            address: address_of(&self.tags),
            tags: self.tags,
        })
    }
}

/// 解析响应，没有坐标的元素会被跳过
pub fn parse_elements(body: serde_json::Value) -> Result<Vec<Mosque>> {
    let resp: OverpassResponse = serde_json::from_value(body)?;
    Ok(resp
        .elements
        .into_iter()
        .filter_map(Element::into_mosque)
        .collect())
}

pub struct OverpassClient {
    url: String,
    timeout_secs: u32,
}

impl OverpassClient {
    pub fn new(url: impl Into<String>, timeout_secs: u32) -> Self {
        Self {
            url: url.into(),
            timeout_secs,
        }
    }

    pub fn from_config(config: &StaticConfig) -> Self {
        Self::new(
            config.providers.overpass_url.clone(),
            config.mosques.query_timeout_secs,
        )
    }
}

#[async_trait]
impl MosqueSource for OverpassClient {
    async fn nearby(&self, center: Coordinates, radius_m: u32) -> Result<Vec<Mosque>> {
        let query = build_query(center, radius_m, self.timeout_secs);
        let url = self.url.clone();
        let body = run_blocking("Overpass", move || post_json(&url, query)).await?;
        let mosques = parse_elements(body)?;
        debug!(
            "Overpass returned {} mosques within {} m of {:?}",
            mosques.len(),
            radius_m,
            center
        );
        Ok(mosques)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_build_query() {
        let q = build_query(Coordinates::new(31.7917, -7.0926), 4000, 25);
        assert!(q.starts_with("[out:json][timeout:25];"));
        assert!(q.contains(
            r#"node["amenity"="place_of_worship"]["religion"="muslim"](around:4000,31.7917,-7.0926);"#
        ));
        assert!(q.contains("way["));
        assert!(q.contains("relation["));
        assert!(q.ends_with("out center;"));
    }

    #[test]
    fn test_parse_elements() {
        let body = json!({
            "version": 0.6,
            "elements": [
                {
                    "type": "node", "id": 1, "lat": 21.42, "lon": 39.82,
                    "tags": {"name": "Masjid al-Haram", "addr:city": "Mecca",
                             "amenity": "place_of_worship", "religion": "muslim"}
                },
                {
                    "type": "way", "id": 2,
                    "center": {"lat": 21.43, "lon": 39.83},
                    "tags": {"addr:street": "King Fahd Rd", "addr:city": "Mecca"}
                },
                {"type": "relation", "id": 3}
            ]
        });
        let mosques = parse_elements(body).unwrap();
        assert_eq!(mosques.len(), 2);

        assert_eq!(mosques[0].name, "Masjid al-Haram");
        assert_eq!(mosques[0].address.as_deref(), Some("Mecca"));
        assert_eq!(mosques[0].element_type, ElementType::Node);

        assert_eq!(mosques[1].name, UNNAMED_MOSQUE);
        assert_eq!(mosques[1].coordinates, Coordinates::new(21.43, 39.83));
        assert_eq!(mosques[1].address.as_deref(), Some("King Fahd Rd"));
    }

    #[test]
    fn test_parse_empty_response() {
        assert!(parse_elements(json!({"elements": []})).unwrap().is_empty());
        assert!(parse_elements(json!({})).unwrap().is_empty());
    }

    /// 依赖外部网络服务，CI 环境可能失败
    #[tokio::test]
    #[ignore]
    async fn test_real_overpass_query() {
        let client = OverpassClient::new("https://overpass-api.de/api/interpreter", 25);
        let mosques = client
            .nearby(Coordinates::new(21.422510, 39.826168), 1000)
            .await
            .unwrap();
        assert!(!mosques.is_empty());
    }
}
