//! 第三方 HTTP 数据源
//!
//! 每个数据源都有一个 trait（便于在服务层替换为测试实现）和一个基于
//! ureq 的默认实现。所有请求都不缓存、不重试。

mod http;

pub mod aladhan;
pub mod nominatim;
pub mod openroute;
pub mod overpass;
pub mod position;
pub mod timeapi;

pub use aladhan::{AladhanClient, PrayerTimesSource};
pub use nominatim::{CitySuggestion, Geocoder, NominatimClient};
pub use openroute::{OpenRouteClient, Route, RouteSource, RouteStep, RouteSummary, TravelMode};
pub use overpass::{ElementType, Mosque, MosqueSource, OverpassClient};
pub use position::{
    IpPositionSource, PermissionState, PositionError, PositionSource, ReportedPosition,
};
pub use timeapi::{TimeApiClient, TimezoneInfo, TimezoneSource};
