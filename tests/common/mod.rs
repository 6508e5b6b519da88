//! 集成测试共用的桩数据源

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::NaiveTime;
use parking_lot::Mutex;

use salatlink::config::StaticConfig;
use salatlink::errors::{Result, SalatError};
use salatlink::geo::Coordinates;
use salatlink::prayer::{Prayer, PrayerName, PrayerTimes};
use salatlink::providers::{
    CitySuggestion, ElementType, Geocoder, Mosque, MosqueSource, PositionError, PositionSource,
    PrayerTimesSource, Route, RouteSource, RouteStep, TimezoneInfo, TimezoneSource, TravelMode,
};
use salatlink::services::{AppServices, NullNotifier, Providers};

pub fn hm(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

pub fn sample_prayers() -> Vec<Prayer> {
    vec![
        Prayer::new(PrayerName::Fajr, hm(4, 30)),
        Prayer::new(PrayerName::Sunrise, hm(6, 0)),
        Prayer::new(PrayerName::Dhuhr, hm(12, 15)),
        Prayer::new(PrayerName::Asr, hm(15, 40)),
        Prayer::new(PrayerName::Maghrib, hm(18, 20)),
        Prayer::new(PrayerName::Isha, hm(19, 45)),
    ]
}

fn sample_row(day: u32) -> PrayerTimes {
    PrayerTimes {
        fajr: "04:30".into(),
        sunrise: "06:00".into(),
        dhuhr: "12:15".into(),
        asr: "15:40".into(),
        maghrib: "18:20".into(),
        isha: "19:45".into(),
        date: format!("{:02}-01-2026", day),
    }
}

/// 礼拜时间桩：记录查询方式，可切换为失败
#[derive(Default)]
pub struct StubPrayerTimes {
    pub fail: std::sync::atomic::AtomicBool,
    pub city_queries: Mutex<Vec<String>>,
    pub coordinate_queries: AtomicUsize,
}

#[async_trait]
impl PrayerTimesSource for StubPrayerTimes {
    async fn timings_by_coordinates(&self, _coords: Coordinates) -> Result<Vec<Prayer>> {
        self.coordinate_queries.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(SalatError::upstream("stub down"));
        }
        Ok(sample_prayers())
    }

    async fn timings_by_city(&self, city: &str) -> Result<Vec<Prayer>> {
        self.city_queries.lock().push(city.to_string());
        if self.fail.load(Ordering::SeqCst) {
            return Err(SalatError::upstream("stub down"));
        }
        Ok(sample_prayers())
    }

    async fn calendar(&self, _coords: Coordinates, _month: u32, _year: i32) -> Result<Vec<PrayerTimes>> {
        Ok((1..=31).map(sample_row).collect())
    }
}

pub struct StubTimezone;

#[async_trait]
impl TimezoneSource for StubTimezone {
    async fn current(&self, _coords: Coordinates) -> Result<TimezoneInfo> {
        Ok(TimezoneInfo {
            timezone: "Asia/Riyadh".into(),
            local_time: "2026-01-10T12:00:00".into(),
            gmt_offset: "GMT+3".into(),
        })
    }
}

pub struct StubGeocoder;

#[async_trait]
impl Geocoder for StubGeocoder {
    async fn reverse(&self, _coords: Coordinates) -> Result<String> {
        Ok("Medina".into())
    }

    async fn search(&self, query: &str) -> Result<Vec<CitySuggestion>> {
        if query.trim().len() < 2 {
            return Ok(Vec::new());
        }
        Ok(vec![CitySuggestion {
            name: "Cairo".into(),
            display_name: "Cairo, Egypt".into(),
            coordinates: Coordinates::new(30.0444, 31.2357),
        }])
    }
}

/// 清真寺桩：`empty` 为 true 时返回空列表
#[derive(Default)]
pub struct StubMosques {
    pub empty: std::sync::atomic::AtomicBool,
}

#[async_trait]
impl MosqueSource for StubMosques {
    async fn nearby(&self, center: Coordinates, _radius_m: u32) -> Result<Vec<Mosque>> {
        if self.empty.load(Ordering::SeqCst) {
            return Ok(Vec::new());
        }
        Ok(vec![Mosque {
            id: 42,
            element_type: ElementType::Node,
            coordinates: Coordinates::new(center.latitude + 0.01, center.longitude),
            name: "Masjid Al-Noor".into(),
            address: Some("1 Main Street".into()),
            tags: Default::default(),
        }])
    }
}

#[derive(Default)]
pub struct StubRoutes {
    pub calls: AtomicUsize,
}

#[async_trait]
impl RouteSource for StubRoutes {
    async fn route(&self, mode: TravelMode, from: Coordinates, to: Coordinates) -> Result<Route> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Route {
            mode,
            path: vec![from, to],
            distance_m: 2500.0,
            duration_s: 600.0,
            steps: vec![RouteStep {
                instruction: "Head north".into(),
                name: None,
                distance_m: 2500.0,
            }],
        })
    }
}

/// 固定结果的定位源
pub struct StubPosition(pub std::result::Result<Coordinates, PositionError>);

#[async_trait]
impl PositionSource for StubPosition {
    async fn current_position(&self) -> std::result::Result<Coordinates, PositionError> {
        self.0
    }

    fn name(&self) -> &'static str {
        "Stub"
    }
}

pub struct Stubs {
    pub prayer_times: Arc<StubPrayerTimes>,
    pub mosques: Arc<StubMosques>,
    pub routes: Arc<StubRoutes>,
}

/// 测试配置：关闭后台计时器和延迟
pub fn test_config() -> StaticConfig {
    let mut config = StaticConfig::default();
    config.reminders.enabled = false;
    config.prayer.alerts_enabled = false;
    config.notifications.desktop_enabled = false;
    config.mosques.unsupported_mode_delay_ms = 0;
    config
}

pub fn build_services() -> (AppServices, Stubs) {
    build_services_with(&test_config())
}

pub fn build_services_with(config: &StaticConfig) -> (AppServices, Stubs) {
    let stubs = Stubs {
        prayer_times: Arc::new(StubPrayerTimes::default()),
        mosques: Arc::new(StubMosques::default()),
        routes: Arc::new(StubRoutes::default()),
    };
    let providers = Providers {
        prayer_times: stubs.prayer_times.clone(),
        timezone: Arc::new(StubTimezone),
        geocoder: Arc::new(StubGeocoder),
        mosques: stubs.mosques.clone(),
        routes: stubs.routes.clone(),
        position: Arc::new(StubPosition(Ok(Coordinates::new(24.4672, 39.6111)))),
        desktop: Arc::new(NullNotifier),
    };
    (AppServices::with_providers(config, providers), stubs)
}
