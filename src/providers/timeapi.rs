//! timeapi.io：按坐标查询时区与当地时间
//!
//! GMT 偏移由服务端返回的当地时间减去响应时刻的 UTC 时间得出，
//! 并按 15 分钟取整（覆盖 +5:30、+5:45 等非整点时区）。

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use super::http::{build_url, get_json, run_blocking};
use crate::config::StaticConfig;
use crate::errors::{Result, SalatError};
use crate::geo::Coordinates;

const OFFSET_STEP_MINUTES: i64 = 15;

/// 时区信息，查询失败时为全空
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimezoneInfo {
    /// IANA 时区名，例如 "Asia/Riyadh"
    pub timezone: String,
    /// 服务端返回的当地时间（原样保留）
    pub local_time: String,
    /// 例如 "GMT+3"、"GMT+5:30"
    pub gmt_offset: String,
}

impl TimezoneInfo {
    pub fn is_empty(&self) -> bool {
        self.timezone.is_empty()
    }

    /// 偏移标签对应的固定偏移；标签为空时为 None
    pub fn offset(&self) -> Option<FixedOffset> {
        parse_gmt_offset(&self.gmt_offset)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CurrentTime {
    #[serde(default)]
    time_zone: Option<String>,
    #[serde(default)]
    date_time: Option<String>,
}

#[async_trait]
pub trait TimezoneSource: Send + Sync {
    async fn current(&self, coords: Coordinates) -> Result<TimezoneInfo>;
}

/// 根据当地时间和 UTC 时间计算偏移标签
pub fn gmt_offset_label(local: NaiveDateTime, utc_now: DateTime<Utc>) -> String {
    let raw_minutes = local
        .signed_duration_since(utc_now.naive_utc())
        .num_seconds() as f64
        / 60.0;
    let minutes = (raw_minutes / OFFSET_STEP_MINUTES as f64).round() as i64 * OFFSET_STEP_MINUTES;

    let sign = if minutes < 0 { '-' } else { '+' };
    let hours = minutes.abs() / 60;
    let rest = minutes.abs() % 60;
    if rest == 0 {
        format!("GMT{}{}", sign, hours)
    } else {
        format!("GMT{}{}:{:02}", sign, hours, rest)
    }
}

/// 解析 `gmt_offset_label` 生成的标签（"GMT+3"、"GMT-3:30"）
pub fn parse_gmt_offset(label: &str) -> Option<FixedOffset> {
    let signed = label.strip_prefix("GMT")?;
    let (sign, rest) = if let Some(rest) = signed.strip_prefix('+') {
        (1, rest)
    } else {
        (-1, signed.strip_prefix('-')?)
    };
    let (hours, minutes) = match rest.split_once(':') {
        Some((h, m)) => (h.parse::<i32>().ok()?, m.parse::<i32>().ok()?),
        None => (rest.parse::<i32>().ok()?, 0),
    };
    if minutes >= 60 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// 解析 timeapi.io 的 dateTime（带 7 位小数秒）
pub fn parse_local_time(raw: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map_err(|e| SalatError::date_parse(format!("Invalid local time '{}': {}", raw, e)))
}

/// 解析响应；缺少时区或时间时偏移标签为空
pub fn parse_current(body: serde_json::Value, utc_now: DateTime<Utc>) -> Result<TimezoneInfo> {
    let resp: CurrentTime = serde_json::from_value(body)?;
    let timezone = resp.time_zone.unwrap_or_default();
    let local_time = resp.date_time.unwrap_or_default();

    let gmt_offset = if timezone.is_empty() || local_time.is_empty() {
        String::new()
    } else {
        gmt_offset_label(parse_local_time(&local_time)?, utc_now)
    };

    Ok(TimezoneInfo {
        timezone,
        local_time,
        gmt_offset,
    })
}

pub struct TimeApiClient {
    base_url: String,
}

impl TimeApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    pub fn from_config(config: &StaticConfig) -> Self {
        Self::new(config.providers.timeapi_url.clone())
    }
}

#[async_trait]
impl TimezoneSource for TimeApiClient {
    async fn current(&self, coords: Coordinates) -> Result<TimezoneInfo> {
        let url = build_url(
            &self.base_url,
            "Time/current/coordinate",
            &[
                ("latitude", coords.latitude.to_string()),
                ("longitude", coords.longitude.to_string()),
            ],
        )?;
        let body = run_blocking("timeapi.io", move || get_json(&url)).await?;
        parse_current(body, Utc::now())
    }
}
