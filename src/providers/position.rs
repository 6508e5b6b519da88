//! 自动定位数据源
//!
//! - `ReportedPosition`：客户端（浏览器）完成定位后把结果上报给 API
//! - `IpPositionSource`：基于外部 IP 定位 API（ip-api.com），CLI 使用

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use super::http::{get_json, run_blocking};
use crate::config::StaticConfig;
use crate::geo::Coordinates;

/// 定位权限状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionState {
    Granted,
    Prompt,
    Denied,
}

/// 获取位置失败的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionError {
    PermissionDenied,
    Timeout,
    Unavailable,
}

/// 自动定位能力
#[async_trait]
pub trait PositionSource: Send + Sync {
    /// 设备是否具备定位能力
    fn is_supported(&self) -> bool {
        true
    }

    /// 权限预检查；无法检查时视为 prompt
    async fn permission(&self) -> PermissionState {
        PermissionState::Prompt
    }

    async fn current_position(&self) -> Result<Coordinates, PositionError>;

    /// 获取 source 名称（用于日志）
    fn name(&self) -> &'static str;
}

/// 客户端上报的一次定位结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportedPosition {
    #[serde(default = "default_supported")]
    pub supported: bool,
    #[serde(default)]
    pub permission: Option<PermissionState>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub error: Option<PositionError>,
}

fn default_supported() -> bool {
    true
}

impl ReportedPosition {
    pub fn fix(latitude: f64, longitude: f64) -> Self {
        Self {
            supported: true,
            permission: Some(PermissionState::Granted),
            latitude: Some(latitude),
            longitude: Some(longitude),
            error: None,
        }
    }

    pub fn failed(error: PositionError) -> Self {
        Self {
            supported: true,
            permission: None,
            latitude: None,
            longitude: None,
            error: Some(error),
        }
    }
}

#[async_trait]
impl PositionSource for ReportedPosition {
    fn is_supported(&self) -> bool {
        self.supported
    }

    async fn permission(&self) -> PermissionState {
        self.permission.unwrap_or(PermissionState::Prompt)
    }

    async fn current_position(&self) -> Result<Coordinates, PositionError> {
        if let Some(error) = self.error {
            return Err(error);
        }
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Coordinates::validated(lat, lon).map_err(|e| {
                warn!("Rejected reported position: {}", e);
                PositionError::Unavailable
            }),
            _ => Err(PositionError::Unavailable),
        }
    }

    fn name(&self) -> &'static str {
        "ClientReported"
    }
}

/// 基于 IP 的定位
pub struct IpPositionSource {
    api_url: String,
}

impl IpPositionSource {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
        }
    }

    pub fn from_config(config: &StaticConfig) -> Self {
        Self::new(config.providers.ip_geolocation_url.clone())
    }
}

/// 解析 ip-api.com 响应：`{"status":"success","lat":..,"lon":..}`，失败时 status 为 "fail"
pub fn parse_ip_position(json: &serde_json::Value) -> Option<Coordinates> {
    if json["status"].as_str() == Some("fail") {
        trace!(
            "IP geolocation returned fail status: {}",
            json["message"].as_str().unwrap_or("")
        );
        return None;
    }

    let lat = json["lat"].as_f64().or_else(|| json["latitude"].as_f64())?;
    let lon = json["lon"].as_f64().or_else(|| json["longitude"].as_f64())?;
    Coordinates::validated(lat, lon).ok()
}

#[async_trait]
impl PositionSource for IpPositionSource {
    async fn current_position(&self) -> Result<Coordinates, PositionError> {
        let url = self.api_url.clone();
        let json: serde_json::Value = run_blocking("IP geolocation", move || get_json(&url))
            .await
            .map_err(|e| match e {
                crate::errors::SalatError::Timeout(_) => PositionError::Timeout,
                _ => PositionError::Unavailable,
            })?;
        parse_ip_position(&json).ok_or(PositionError::Unavailable)
    }

    fn name(&self) -> &'static str {
        "IpGeolocation"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_ip_position() {
        let ok = json!({"status": "success", "lat": 33.59, "lon": -7.61, "city": "Casablanca"});
        assert_eq!(parse_ip_position(&ok), Some(Coordinates::new(33.59, -7.61)));

        let fail = json!({"status": "fail", "message": "private range"});
        assert_eq!(parse_ip_position(&fail), None);

        let alt = json!({"latitude": 10.0, "longitude": 20.0});
        assert_eq!(parse_ip_position(&alt), Some(Coordinates::new(10.0, 20.0)));

        assert_eq!(parse_ip_position(&json!({"lat": 95.0, "lon": 0.0})), None);
    }

    #[tokio::test]
    async fn test_reported_position_outcomes() {
        let fix = ReportedPosition::fix(21.4, 39.8);
        assert_eq!(fix.permission().await, PermissionState::Granted);
        assert_eq!(fix.current_position().await, Ok(Coordinates::new(21.4, 39.8)));

        let timeout = ReportedPosition::failed(PositionError::Timeout);
        assert_eq!(timeout.permission().await, PermissionState::Prompt);
        assert_eq!(timeout.current_position().await, Err(PositionError::Timeout));

        let bogus = ReportedPosition::fix(123.0, 0.0);
        assert_eq!(bogus.current_position().await, Err(PositionError::Unavailable));
    }

    #[test]
    fn test_reported_position_deserialize_defaults() {
        let report: ReportedPosition =
            serde_json::from_value(json!({"permission": "denied"})).unwrap();
        assert!(report.supported);
        assert_eq!(report.permission, Some(PermissionState::Denied));

        let report: ReportedPosition =
            serde_json::from_value(json!({"error": "permission_denied"})).unwrap();
        assert_eq!(report.error, Some(PositionError::PermissionDenied));
    }

    /// 依赖外部网络服务，CI 环境可能失败
    #[tokio::test]
    #[ignore]
    async fn test_real_ip_position() {
        let source = IpPositionSource::new("http://ip-api.com/json/?fields=status,message,lat,lon,city");
        assert!(source.current_position().await.is_ok());
    }
}
