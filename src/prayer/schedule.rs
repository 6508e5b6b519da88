//! 当前/下一次礼拜计算
//!
//! 输入为按时间顺序排列的礼拜列表和当前本地时间：
//! - 当前礼拜：时间 <= now 的最后一项；今天还没有任何一项时，回绕到列表最后一项（昨天的）
//! - 下一次礼拜：时间 > now 的第一项；今天已全部过去时，回绕到第一项（明天的）
//! - 时间相等视为“当前”，不是“下一次”

use chrono::{Duration, NaiveTime};
use serde::Serialize;

use super::Prayer;

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// 剩余时间（整分钟，秒数向下取整）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeLeft {
    pub hours: i64,
    pub minutes: i64,
}

impl TimeLeft {
    pub fn from_duration(duration: Duration) -> Self {
        let total_minutes = duration.num_seconds().max(0) / 60;
        Self {
            hours: total_minutes / 60,
            minutes: total_minutes % 60,
        }
    }

    pub fn total_minutes(&self) -> i64 {
        self.hours * 60 + self.minutes
    }
}

impl std::fmt::Display for TimeLeft {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}h {}m", self.hours, self.minutes)
    }
}

/// 下一次礼拜
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpcomingPrayer {
    pub name: String,
    pub arabic_name: String,
    /// HH:MM，未知时为 None
    pub time: Option<String>,
    /// "2h 45m"，未知时为 "N/A"
    pub time_left: String,
    pub minutes_left: Option<i64>,
    /// 是否为明天的第一项
    pub is_tomorrow: bool,
}

impl UpcomingPrayer {
    /// 空列表时的哨兵值
    pub fn unknown() -> Self {
        Self {
            name: "Unknown".to_string(),
            arabic_name: String::new(),
            time: None,
            time_left: "N/A".to_string(),
            minutes_left: None,
            is_tomorrow: false,
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.minutes_left.is_none()
    }

    fn from_prayer(prayer: &Prayer, left: TimeLeft, is_tomorrow: bool) -> Self {
        Self {
            name: prayer.name.to_string(),
            arabic_name: prayer.arabic_name.clone(),
            time: Some(prayer.clock()),
            time_left: left.to_string(),
            minutes_left: Some(left.total_minutes()),
            is_tomorrow,
        }
    }
}

/// 当前礼拜
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrentPrayer {
    #[serde(flatten)]
    pub prayer: Prayer,
    /// 今天尚未到第一项时，回绕为昨天的最后一项
    pub is_yesterday: bool,
}

/// 当前 + 下一次礼拜的组合结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrayerStatus {
    pub current: Option<CurrentPrayer>,
    pub next: UpcomingPrayer,
}

impl PrayerStatus {
    pub fn compute(prayers: &[Prayer], now: NaiveTime) -> Self {
        Self {
            current: current_prayer(prayers, now),
            next: next_prayer(prayers, now),
        }
    }
}

/// 计算当前礼拜，空列表返回 None
pub fn current_prayer(prayers: &[Prayer], now: NaiveTime) -> Option<CurrentPrayer> {
    if let Some(prayer) = prayers.iter().filter(|p| p.time <= now).last() {
        return Some(CurrentPrayer {
            prayer: prayer.clone(),
            is_yesterday: false,
        });
    }

    prayers.last().map(|prayer| CurrentPrayer {
        prayer: prayer.clone(),
        is_yesterday: true,
    })
}

/// 计算下一次礼拜及剩余时间，空列表返回哨兵值
pub fn next_prayer(prayers: &[Prayer], now: NaiveTime) -> UpcomingPrayer {
    if let Some(prayer) = prayers.iter().find(|p| p.time > now) {
        let left = TimeLeft::from_duration(prayer.time.signed_duration_since(now));
        return UpcomingPrayer::from_prayer(prayer, left, false);
    }

    match prayers.first() {
        Some(first) => {
            // 明天的第一项：今天的差值（<= 0）加一整天
            let diff = first.time.signed_duration_since(now) + Duration::seconds(SECONDS_PER_DAY);
            UpcomingPrayer::from_prayer(first, TimeLeft::from_duration(diff), true)
        }
        None => UpcomingPrayer::unknown(),
    }
}

/// 距离某个礼拜开始已经过去的时间（回绕到昨天时按跨日计算）
pub fn elapsed_since(current: &CurrentPrayer, now: NaiveTime) -> TimeLeft {
    let mut diff = now.signed_duration_since(current.prayer.time);
    if current.is_yesterday {
        diff += Duration::seconds(SECONDS_PER_DAY);
    }
    TimeLeft::from_duration(diff)
}
