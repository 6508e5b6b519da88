//! 位置状态
//!
//! 保存当前城市、坐标、加载状态、错误文案和定位权限。支持两种方式：
//! - 自动：通过 `PositionSource` 获取坐标并反查地名
//! - 手动：输入城市名、选择联想结果、或直接给出坐标（地图点选）
//!
//! 兜底位置始终可用，自动定位失败时其余模块仍按兜底位置查询。

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::LocationConfig;
use crate::errors::{Result, SalatError};
use crate::geo::Coordinates;
use crate::providers::nominatim::UNKNOWN_PLACE;
use crate::providers::{
    CitySuggestion, Geocoder, PermissionState, PositionError, PositionSource,
};

pub const MSG_UNSUPPORTED: &str = "Geolocation is not supported on this device.";
pub const MSG_PERMISSION_SETTINGS: &str =
    "Please enable location access in your settings to get accurate prayer times for your location.";
pub const MSG_PERMISSION_DENIED: &str =
    "Please enable location access to get accurate prayer times for your location.";

pub fn timeout_message(fallback_city: &str) -> String {
    format!(
        "Timed out while retrieving your location. Using {}'s coordinates as fallback.",
        fallback_city
    )
}

pub fn unavailable_message(fallback_city: &str) -> String {
    format!(
        "Unable to retrieve your location. Using {}'s coordinates as fallback.",
        fallback_city
    )
}

/// 当前位置状态
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Location {
    pub city: String,
    /// 手动输入城市名后清空，礼拜时间改为按城市查询
    pub coordinates: Option<Coordinates>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub permission_status: Option<PermissionState>,
}

/// 兜底位置
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FallbackLocation {
    pub city: String,
    pub coordinates: Coordinates,
}

impl From<&LocationConfig> for FallbackLocation {
    fn from(config: &LocationConfig) -> Self {
        Self {
            city: config.default_city.clone(),
            coordinates: Coordinates::new(config.default_latitude, config.default_longitude),
        }
    }
}

pub struct LocationService {
    state: RwLock<Location>,
    fallback: FallbackLocation,
    geocoder: Arc<dyn Geocoder>,
    /// 每次写入位置都会递增，自动定位完成时据此判断是否已被手动操作覆盖
    generation: AtomicU64,
}

impl LocationService {
    pub fn new(config: &LocationConfig, geocoder: Arc<dyn Geocoder>) -> Self {
        let fallback = FallbackLocation::from(config);
        Self {
            state: RwLock::new(Location {
                city: fallback.city.clone(),
                coordinates: Some(fallback.coordinates),
                is_loading: false,
                error: None,
                permission_status: None,
            }),
            fallback,
            geocoder,
            generation: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self) -> Location {
        self.state.read().clone()
    }

    pub fn fallback(&self) -> &FallbackLocation {
        &self.fallback
    }

    /// 查询用坐标：当前坐标，缺失时使用兜底坐标
    pub fn coordinates_or_fallback(&self) -> Coordinates {
        self.state
            .read()
            .coordinates
            .unwrap_or(self.fallback.coordinates)
    }

    fn bump(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    /// 手动输入城市名，清空坐标
    pub fn set_city(&self, city: &str) -> Result<Location> {
        let city = city.trim();
        if city.is_empty() {
            return Err(SalatError::validation("City name must not be empty"));
        }

        self.bump();
        let mut state = self.state.write();
        state.city = city.to_string();
        state.coordinates = None;
        state.is_loading = false;
        state.error = None;
        info!("Location set manually to city '{}'", city);
        Ok(state.clone())
    }

    /// 选择联想结果：同时设置城市名和坐标
    pub fn choose_suggestion(&self, suggestion: &CitySuggestion) -> Location {
        self.bump();
        let mut state = self.state.write();
        state.city = suggestion.name.clone();
        state.coordinates = Some(suggestion.coordinates);
        state.is_loading = false;
        state.error = None;
        info!(
            "Location set from suggestion '{}' ({:?})",
            suggestion.name, suggestion.coordinates
        );
        state.clone()
    }

    /// 直接设置坐标（地图点选），随后反查地名
    pub async fn set_coordinates(&self, coords: Coordinates) -> Result<Location> {
        let coords = Coordinates::validated(coords.latitude, coords.longitude)?;
        let generation = self.bump();
        {
            let mut state = self.state.write();
            state.coordinates = Some(coords);
            state.is_loading = false;
            state.error = None;
        }
        self.apply_place_name(generation, coords).await;
        Ok(self.snapshot())
    }

    /// 城市名联想搜索
    pub async fn search(&self, query: &str) -> Result<Vec<CitySuggestion>> {
        self.geocoder.search(query).await
    }

    /// 自动定位
    pub async fn acquire(&self, source: &dyn PositionSource) -> Location {
        if !source.is_supported() {
            let mut state = self.state.write();
            state.error = Some(MSG_UNSUPPORTED.to_string());
            state.is_loading = false;
            return state.clone();
        }

        let generation = self.bump();
        {
            let mut state = self.state.write();
            state.is_loading = true;
            state.error = None;
        }

        let permission = source.permission().await;
        debug!("{} permission pre-check: {:?}", source.name(), permission);
        if !self.is_current(generation) {
            return self.snapshot();
        }
        {
            let mut state = self.state.write();
            state.permission_status = Some(permission);
            if permission == PermissionState::Denied {
                state.error = Some(MSG_PERMISSION_SETTINGS.to_string());
                state.is_loading = false;
                return state.clone();
            }
        }

        let outcome = source.current_position().await;
        if !self.is_current(generation) {
            debug!("Discarding geolocation result superseded by a newer location");
            return self.snapshot();
        }

        match outcome {
            Ok(coords) => {
                {
                    let mut state = self.state.write();
                    state.coordinates = Some(coords);
                    state.is_loading = false;
                    state.error = None;
                }
                info!("Position acquired via {}: {:?}", source.name(), coords);
                self.apply_place_name(generation, coords).await;
            }
            Err(error) => {
                let message = match error {
                    PositionError::PermissionDenied => MSG_PERMISSION_DENIED.to_string(),
                    PositionError::Timeout => timeout_message(&self.fallback.city),
                    PositionError::Unavailable => unavailable_message(&self.fallback.city),
                };
                warn!("Geolocation via {} failed: {:?}", source.name(), error);
                let mut state = self.state.write();
                if error == PositionError::PermissionDenied {
                    state.permission_status = Some(PermissionState::Denied);
                }
                state.error = Some(message);
                state.is_loading = false;
            }
        }

        self.snapshot()
    }

    /// 反查地名并写入（期间位置被改写则放弃）；反查失败记为 "Unknown"
    async fn apply_place_name(&self, generation: u64, coords: Coordinates) {
        let place = match self.geocoder.reverse(coords).await {
            Ok(place) => place,
            Err(e) => {
                warn!("Reverse geocoding {:?} failed: {}", coords, e);
                UNKNOWN_PLACE.to_string()
            }
        };

        if self.is_current(generation) {
            self.state.write().city = place;
        }
    }
}
