//! 礼拜时间领域模型
//!
//! - `Prayer`: 单个礼拜（名称 + 当地时间 HH:MM + 阿拉伯语名称）
//! - `PrayerTimes`: 周表中的一行
//! - `schedule`: 当前/下一次礼拜与倒计时计算
//! - `format`: 展示用的时间/日期格式化

pub mod format;
pub mod schedule;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter, EnumString, IntoEnumIterator};

use crate::errors::{Result, SalatError};

pub use format::{format_date, format_prayer_time};
pub use schedule::{PrayerStatus, TimeLeft, UpcomingPrayer, current_prayer, next_prayer};

/// 每日六个时间点，按一天内的先后顺序排列
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumIter,
    AsRefStr,
    EnumString,
)]
pub enum PrayerName {
    Fajr,
    Sunrise,
    Dhuhr,
    Asr,
    Maghrib,
    Isha,
}

impl PrayerName {
    /// 阿拉伯语显示名称
    pub fn arabic_name(&self) -> &'static str {
        match self {
            Self::Fajr => "الفجر",
            Self::Sunrise => "الشروق",
            Self::Dhuhr => "الظهر",
            Self::Asr => "العصر",
            Self::Maghrib => "المغرب",
            Self::Isha => "العشاء",
        }
    }
}

impl std::fmt::Display for PrayerName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_ref())
    }
}

/// 单个礼拜
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prayer {
    pub name: PrayerName,
    #[serde(with = "hhmm")]
    pub time: NaiveTime,
    pub arabic_name: String,
}

impl Prayer {
    pub fn new(name: PrayerName, time: NaiveTime) -> Self {
        Self {
            name,
            time,
            arabic_name: name.arabic_name().to_string(),
        }
    }

    /// 从 "HH:MM" 字符串构造（允许带尾随元数据，如 "05:12 (EET)"）
    pub fn parse(name: PrayerName, raw: &str) -> Result<Self> {
        Ok(Self::new(name, parse_clock(raw)?))
    }

    /// HH:MM 格式的时间
    pub fn clock(&self) -> String {
        self.time.format("%H:%M").to_string()
    }
}

/// 周表中的一行（一天的六个时间点 + 可读日期）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrayerTimes {
    pub fajr: String,
    pub sunrise: String,
    pub dhuhr: String,
    pub asr: String,
    pub maghrib: String,
    pub isha: String,
    pub date: String,
}

impl PrayerTimes {
    /// 转换为按顺序排列的 Prayer 列表
    pub fn to_prayers(&self) -> Result<Vec<Prayer>> {
        PrayerName::iter()
            .map(|name| Prayer::parse(name, self.time_of(name)))
            .collect()
    }

    fn time_of(&self, name: PrayerName) -> &str {
        match name {
            PrayerName::Fajr => &self.fajr,
            PrayerName::Sunrise => &self.sunrise,
            PrayerName::Dhuhr => &self.dhuhr,
            PrayerName::Asr => &self.asr,
            PrayerName::Maghrib => &self.maghrib,
            PrayerName::Isha => &self.isha,
        }
    }
}

/// 去掉时间字符串的尾随元数据："05:12 (EET)" -> "05:12"
pub fn strip_time_metadata(raw: &str) -> &str {
    raw.split_whitespace().next().unwrap_or("")
}

/// 解析 HH:MM（忽略尾随元数据）
pub fn parse_clock(raw: &str) -> Result<NaiveTime> {
    let clean = strip_time_metadata(raw);
    NaiveTime::parse_from_str(clean, "%H:%M")
        .map_err(|e| SalatError::date_parse(format!("Invalid prayer time '{}': {}", raw, e)))
}

/// `NaiveTime` <-> "HH:MM" 的 serde 适配
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_clock(&raw).map_err(serde::de::Error::custom)
    }
}
