//! Aladhan 礼拜时间 API
//!
//! - `/timings`：按坐标查询当天时间表
//! - `/timingsByCity`：按城市名查询（国家留空，由服务端推断）
//! - `/calendar`：按坐标查询整月，用于 7 天周表

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::http::{build_url, get_json, run_blocking};
use crate::config::StaticConfig;
use crate::errors::{Result, SalatError};
use crate::geo::Coordinates;
use crate::prayer::{Prayer, PrayerName, PrayerTimes, strip_time_metadata};

/// 周表天数
pub const WEEK_DAYS: usize = 7;

/// 礼拜时间数据源
#[async_trait]
pub trait PrayerTimesSource: Send + Sync {
    async fn timings_by_coordinates(&self, coords: Coordinates) -> Result<Vec<Prayer>>;

    async fn timings_by_city(&self, city: &str) -> Result<Vec<Prayer>>;

    /// 某月每天的时间表（按日期顺序）
    async fn calendar(&self, coords: Coordinates, month: u32, year: i32)
    -> Result<Vec<PrayerTimes>>;
}

#[derive(Debug, Deserialize)]
struct Envelope {
    code: u16,
    #[serde(default)]
    status: String,
    data: serde_json::Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Timings {
    fajr: String,
    sunrise: String,
    dhuhr: String,
    asr: String,
    maghrib: String,
    isha: String,
}

#[derive(Debug, Deserialize)]
struct ReadableDate {
    readable: String,
}

#[derive(Debug, Deserialize)]
struct DayEntry {
    timings: Timings,
    date: ReadableDate,
}

impl Timings {
    fn to_prayers(&self) -> Result<Vec<Prayer>> {
        [
            (PrayerName::Fajr, &self.fajr),
            (PrayerName::Sunrise, &self.sunrise),
            (PrayerName::Dhuhr, &self.dhuhr),
            (PrayerName::Asr, &self.asr),
            (PrayerName::Maghrib, &self.maghrib),
            (PrayerName::Isha, &self.isha),
        ]
        .into_iter()
        .map(|(name, raw)| Prayer::parse(name, raw))
        .collect()
    }

    fn into_row(self, date: String) -> PrayerTimes {
        PrayerTimes {
            fajr: strip_time_metadata(&self.fajr).to_string(),
            sunrise: strip_time_metadata(&self.sunrise).to_string(),
            dhuhr: strip_time_metadata(&self.dhuhr).to_string(),
            asr: strip_time_metadata(&self.asr).to_string(),
            maghrib: strip_time_metadata(&self.maghrib).to_string(),
            isha: strip_time_metadata(&self.isha).to_string(),
            date,
        }
    }
}

/// 校验 envelope 的 code 字段并取出 data
fn unwrap_envelope<T: DeserializeOwned>(envelope: Envelope) -> Result<T> {
    if envelope.code != 200 {
        return Err(SalatError::upstream(format!(
            "Aladhan responded with code {} ({})",
            envelope.code, envelope.status
        )));
    }
    Ok(serde_json::from_value(envelope.data)?)
}

/// 解析 `/timings` 或 `/timingsByCity` 的响应
pub fn parse_timings(body: serde_json::Value) -> Result<Vec<Prayer>> {
    #[derive(Deserialize)]
    struct Data {
        timings: Timings,
    }

    let envelope: Envelope = serde_json::from_value(body)?;
    let data: Data = unwrap_envelope(envelope)?;
    data.timings.to_prayers()
}

/// 解析 `/calendar` 的响应
pub fn parse_calendar(body: serde_json::Value) -> Result<Vec<PrayerTimes>> {
    let envelope: Envelope = serde_json::from_value(body)?;
    let days: Vec<DayEntry> = unwrap_envelope(envelope)?;
    Ok(days
        .into_iter()
        .map(|day| day.timings.into_row(day.date.readable))
        .collect())
}

/// 从当月日历中取出从 `today`（1 起）开始的 7 天，月底截断
pub fn week_from(month: Vec<PrayerTimes>, today: u32) -> Vec<PrayerTimes> {
    let start = today.saturating_sub(1) as usize;
    month.into_iter().skip(start).take(WEEK_DAYS).collect()
}

pub struct AladhanClient {
    base_url: String,
    method: u8,
}

impl AladhanClient {
    pub fn new(base_url: impl Into<String>, method: u8) -> Self {
        Self {
            base_url: base_url.into(),
            method,
        }
    }

    pub fn from_config(config: &StaticConfig) -> Self {
        Self::new(
            config.providers.aladhan_url.clone(),
            config.prayer.calculation_method,
        )
    }

    async fn fetch(&self, path: &'static str, params: Vec<(&str, String)>) -> Result<serde_json::Value> {
        let mut params = params;
        params.push(("method", self.method.to_string()));
        let url = build_url(&self.base_url, path, &params)?;
        debug!("Fetching prayer times from {}", url);
        run_blocking("Aladhan", move || get_json(&url)).await
    }
}

#[async_trait]
impl PrayerTimesSource for AladhanClient {
    async fn timings_by_coordinates(&self, coords: Coordinates) -> Result<Vec<Prayer>> {
        let body = self
            .fetch(
                "timings",
                vec![
                    ("latitude", coords.latitude.to_string()),
                    ("longitude", coords.longitude.to_string()),
                ],
            )
            .await?;
        parse_timings(body)
    }

    async fn timings_by_city(&self, city: &str) -> Result<Vec<Prayer>> {
        let body = self
            .fetch(
                "timingsByCity",
                vec![("city", city.to_string()), ("country", String::new())],
            )
            .await?;
        parse_timings(body)
    }

    async fn calendar(
        &self,
        coords: Coordinates,
        month: u32,
        year: i32,
    ) -> Result<Vec<PrayerTimes>> {
        let body = self
            .fetch(
                "calendar",
                vec![
                    ("latitude", coords.latitude.to_string()),
                    ("longitude", coords.longitude.to_string()),
                    ("month", month.to_string()),
                    ("year", year.to_string()),
                ],
            )
            .await?;
        parse_calendar(body)
    }
}
