//! 礼拜时间服务
//!
//! 查询优先级：坐标 → 城市名 → 默认城市。当天列表保存在一个 `FetchSlot`
//! 中，另外保留最近一次成功的列表供到点提醒使用。

use std::sync::Arc;
use std::time::Duration;

use chrono::{
    DateTime, Datelike, FixedOffset, Local, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc,
};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use tokio::task::JoinHandle;
use tokio::time;
use tracing::{debug, info, warn};

use super::fetch::{FetchSlot, FetchState};
use super::location::{Location, LocationService};
use super::notification::{NewNotification, NotificationCenter, NotificationKind};
use crate::errors::{Result, SalatError};
use crate::geo::Coordinates;
use crate::prayer::{Prayer, PrayerStatus, PrayerTimes, format_date};
use crate::providers::aladhan::week_from;
use crate::providers::{PrayerTimesSource, TimezoneInfo, TimezoneSource};

pub const MSG_PRAYER_FETCH_FAILED: &str = "Failed to fetch prayer times. Please try again later.";

/// 礼拜时间查询目标
#[derive(Debug, Clone, PartialEq)]
pub enum PrayerQuery {
    Coordinates(Coordinates),
    City(String),
}

impl PrayerQuery {
    /// 坐标优先，其次城市名，都没有时使用默认城市
    pub fn resolve(location: &Location, default_city: &str) -> Self {
        if let Some(coords) = location.coordinates {
            return Self::Coordinates(coords);
        }
        let city = location.city.trim();
        if city.is_empty() {
            Self::City(default_city.to_string())
        } else {
            Self::City(city.to_string())
        }
    }
}

/// 当天礼拜时间 + 当前/下一次
#[derive(Debug, Clone, Serialize)]
pub struct PrayerDay {
    pub date: String,
    pub prayers: Vec<Prayer>,
    #[serde(flatten)]
    pub status: PrayerStatus,
}

impl PrayerDay {
    pub fn build(prayers: Vec<Prayer>, today: NaiveDate, now: NaiveTime) -> Self {
        let status = PrayerStatus::compute(&prayers, now);
        Self {
            date: format_date(&today),
            prayers,
            status,
        }
    }
}

/// 某地的当前时间：有偏移时按该偏移换算，否则使用本机时区
pub fn local_now(offset: Option<FixedOffset>, utc_now: DateTime<Utc>) -> NaiveDateTime {
    match offset {
        Some(offset) => utc_now.with_timezone(&offset).naive_local(),
        None => utc_now.with_timezone(&Local).naive_local(),
    }
}

/// 到点提醒：当前 HH:MM 与礼拜时间相同的条目
pub fn due_alerts(prayers: &[Prayer], now: NaiveTime) -> Vec<NewNotification> {
    let clock = now.format("%H:%M").to_string();
    prayers
        .iter()
        .filter(|p| p.clock() == clock)
        .map(|p| {
            NewNotification::new(
                format!("It's time for {} Prayer", p.name),
                format!("{} - {}", p.arabic_name, p.clock()),
                NotificationKind::Prayer,
            )
        })
        .collect()
}

pub struct PrayerService {
    source: Arc<dyn PrayerTimesSource>,
    timezone: Arc<dyn TimezoneSource>,
    default_city: String,
    today: FetchSlot<Vec<Prayer>>,
    /// 最近一次成功的列表，连同获取日期和查询目标
    last_good: RwLock<Option<(NaiveDate, PrayerQuery, Vec<Prayer>)>>,
}

impl PrayerService {
    pub fn new(
        source: Arc<dyn PrayerTimesSource>,
        timezone: Arc<dyn TimezoneSource>,
        default_city: impl Into<String>,
    ) -> Self {
        Self {
            source,
            timezone,
            default_city: default_city.into(),
            today: FetchSlot::new("prayer times"),
            last_good: RwLock::new(None),
        }
    }

    pub fn default_city(&self) -> &str {
        &self.default_city
    }

    async fn fetch(&self, query: &PrayerQuery) -> Result<Vec<Prayer>> {
        let result = match query {
            PrayerQuery::Coordinates(coords) => self.source.timings_by_coordinates(*coords).await,
            PrayerQuery::City(city) => self.source.timings_by_city(city).await,
        };
        result.map_err(|e| {
            warn!("Fetching prayer times for {:?} failed: {}", query, e);
            match e {
                SalatError::Timeout(_) => SalatError::timeout(MSG_PRAYER_FETCH_FAILED),
                _ => SalatError::upstream(MSG_PRAYER_FETCH_FAILED),
            }
        })
    }

    /// 刷新当天礼拜时间，结果写入 slot（过期结果被丢弃）
    pub async fn refresh(&self, query: &PrayerQuery) -> FetchState<Vec<Prayer>> {
        let seq = self.today.begin();
        let result = self.fetch(query).await;
        let fetched = result.as_ref().ok().cloned();

        let state = FetchState::from_result(result, MSG_PRAYER_FETCH_FAILED);
        if self.today.finish(seq, state.clone())
            && let Some(prayers) = fetched
        {
            *self.last_good.write() = Some((Local::now().date_naive(), query.clone(), prayers));
        }
        state
    }

    /// 查询目标所在地的当前时间
    ///
    /// 坐标查询按该地的 GMT 偏移换算；城市名查询或时区查询失败时使用本机时钟。
    pub async fn clock_for(&self, query: &PrayerQuery) -> NaiveDateTime {
        let offset = match query {
            PrayerQuery::Coordinates(coords) => self.timezone(*coords).await.offset(),
            PrayerQuery::City(_) => None,
        };
        local_now(offset, Utc::now())
    }

    /// 当天礼拜时间及当前/下一次（不写入 slot，供 CLI 和带参数的查询使用）
    pub async fn prayer_day(&self, query: &PrayerQuery) -> Result<PrayerDay> {
        let (prayers, now) = tokio::join!(self.fetch(query), self.clock_for(query));
        Ok(PrayerDay::build(prayers?, now.date(), now.time()))
    }

    pub fn state(&self) -> FetchState<Vec<Prayer>> {
        self.today.snapshot()
    }

    /// 最近一次成功获取的列表
    pub fn cached_prayers(&self) -> Vec<Prayer> {
        self.last_good
            .read()
            .as_ref()
            .map(|(_, _, prayers)| prayers.clone())
            .unwrap_or_default()
    }

    /// 缓存的列表不是今天的，或查询目标（位置）已变化时重新获取
    pub async fn ensure_today(&self, query: &PrayerQuery) {
        let today = Local::now().date_naive();
        let fresh = matches!(
            &*self.last_good.read(),
            Some((date, cached, _)) if *date == today && cached == query
        );
        if !fresh {
            debug!("Prayer list is stale, refreshing {:?} for {}", query, today);
            self.refresh(query).await;
        }
    }

    /// 从今天开始的 7 天时间表（月底截断）
    pub async fn weekly(&self, coords: Coordinates, today: NaiveDate) -> Result<Vec<PrayerTimes>> {
        let month = self
            .source
            .calendar(coords, today.month(), today.year())
            .await
            .map_err(|e| {
                warn!("Fetching weekly prayer times failed: {}", e);
                SalatError::upstream(MSG_PRAYER_FETCH_FAILED)
            })?;
        Ok(week_from(month, today.day()))
    }

    /// 时区信息；失败时返回空值，不影响礼拜时间展示
    pub async fn timezone(&self, coords: Coordinates) -> TimezoneInfo {
        match self.timezone.current(coords).await {
            Ok(info) => info,
            Err(e) => {
                warn!("Fetching timezone for {:?} failed: {}", coords, e);
                TimezoneInfo::default()
            }
        }
    }
}

/// 礼拜到点提醒
///
/// 启动时立即检查一次，之后按固定周期检查。每次检查前确保缓存的列表是今天的。
pub struct PrayerAlerts {
    prayer: Arc<PrayerService>,
    location: Arc<LocationService>,
    center: Arc<NotificationCenter>,
    period: Duration,
    ticker: Mutex<Option<JoinHandle<()>>>,
    /// 最近一次提醒的分钟，避免同一分钟内重复提醒
    last_fired: Mutex<Option<(NaiveDate, NaiveTime)>>,
}

impl PrayerAlerts {
    pub fn new(
        prayer: Arc<PrayerService>,
        location: Arc<LocationService>,
        center: Arc<NotificationCenter>,
        period: Duration,
    ) -> Self {
        Self {
            prayer,
            location,
            center,
            period,
            ticker: Mutex::new(None),
            last_fired: Mutex::new(None),
        }
    }

    /// 对给定时刻检查一次，返回发出的提醒数量
    pub fn check_at(&self, date: NaiveDate, now: NaiveTime) -> usize {
        let minute = NaiveTime::from_hms_opt(now.hour(), now.minute(), 0).unwrap_or(now);
        let mut last = self.last_fired.lock();
        if *last == Some((date, minute)) {
            return 0;
        }
        let alerts = due_alerts(&self.prayer.cached_prayers(), now);
        if alerts.is_empty() {
            return 0;
        }
        *last = Some((date, minute));
        let count = alerts.len();
        for alert in alerts {
            self.center.show(alert);
        }
        count
    }

    /// 立即检查一次：位置变化或跨天时先刷新列表，返回发出的提醒数量
    pub async fn tick(&self) -> usize {
        let query = PrayerQuery::resolve(&self.location.snapshot(), self.prayer.default_city());
        self.prayer.ensure_today(&query).await;
        let now = Local::now();
        self.check_at(now.date_naive(), now.time())
    }

    pub fn start(self: &Arc<Self>) {
        let mut ticker = self.ticker.lock();
        if let Some(handle) = ticker.take() {
            handle.abort();
        }

        let alerts = Arc::clone(self);
        let period = self.period;
        *ticker = Some(tokio::spawn(async move {
            // interval 的第一次 tick 立即完成
            let mut interval = time::interval(period);
            interval.set_missed_tick_behavior(time::MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                alerts.tick().await;
            }
        }));
        info!("Prayer alerts started, checking every {}s", period.as_secs());
    }

    pub fn stop(&self) {
        if let Some(handle) = self.ticker.lock().take() {
            handle.abort();
            info!("Prayer alerts stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.ticker
            .lock()
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LocationConfig, NotificationConfig};
    use crate::prayer::PrayerName;
    use crate::providers::{CitySuggestion, Geocoder};
    use crate::services::notification::NullNotifier;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn t(raw: &str) -> NaiveTime {
        NaiveTime::parse_from_str(raw, "%H:%M").unwrap()
    }

    fn day() -> Vec<Prayer> {
        vec![
            Prayer::new(PrayerName::Fajr, t("05:00")),
            Prayer::new(PrayerName::Sunrise, t("06:30")),
            Prayer::new(PrayerName::Dhuhr, t("12:15")),
            Prayer::new(PrayerName::Asr, t("15:45")),
            Prayer::new(PrayerName::Maghrib, t("18:20")),
            Prayer::new(PrayerName::Isha, t("19:45")),
        ]
    }

    struct StubSource {
        fail: bool,
        calls: AtomicUsize,
        cities: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl PrayerTimesSource for StubSource {
        async fn timings_by_coordinates(&self, _coords: Coordinates) -> Result<Vec<Prayer>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(SalatError::upstream("status 500"))
            } else {
                Ok(day())
            }
        }

        async fn timings_by_city(&self, city: &str) -> Result<Vec<Prayer>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.cities.lock().push(city.to_string());
            match city {
                "Atlantis" => Err(SalatError::upstream("code 400")),
                "Slow" => {
                    tokio::time::sleep(Duration::from_millis(100)).await;
                    Ok(day().into_iter().take(1).collect())
                }
                _ => Ok(day()),
            }
        }

        async fn calendar(
            &self,
            _coords: Coordinates,
            _month: u32,
            _year: i32,
        ) -> Result<Vec<PrayerTimes>> {
            Ok((1..=31)
                .map(|d| PrayerTimes {
                    fajr: "05:00".into(),
                    sunrise: "06:30".into(),
                    dhuhr: "12:15".into(),
                    asr: "15:45".into(),
                    maghrib: "18:20".into(),
                    isha: "19:45".into(),
                    date: format!("{:02} Dec 2026", d),
                })
                .collect())
        }
    }

    struct NoTimezone;

    #[async_trait]
    impl TimezoneSource for NoTimezone {
        async fn current(&self, _coords: Coordinates) -> Result<TimezoneInfo> {
            Err(SalatError::timeout("timeapi.io"))
        }
    }

    struct NoGeocoder;

    #[async_trait]
    impl Geocoder for NoGeocoder {
        async fn reverse(&self, _coords: Coordinates) -> Result<String> {
            Ok("Mecca".into())
        }

        async fn search(&self, _query: &str) -> Result<Vec<CitySuggestion>> {
            Ok(Vec::new())
        }
    }

    fn stub(fail: bool) -> Arc<StubSource> {
        Arc::new(StubSource {
            fail,
            calls: AtomicUsize::new(0),
            cities: Mutex::new(Vec::new()),
        })
    }

    fn service_with(source: Arc<StubSource>) -> Arc<PrayerService> {
        Arc::new(PrayerService::new(source, Arc::new(NoTimezone), "Mecca"))
    }

    fn service(fail: bool) -> Arc<PrayerService> {
        service_with(stub(fail))
    }

    fn alerts_for(prayer: Arc<PrayerService>, location: Arc<LocationService>) -> PrayerAlerts {
        let center = Arc::new(NotificationCenter::new(
            &NotificationConfig::default(),
            Arc::new(NullNotifier),
        ));
        PrayerAlerts::new(prayer, location, center, Duration::from_secs(60))
    }

    #[test]
    fn test_query_resolution() {
        let mut loc = Location {
            city: "Rabat".into(),
            coordinates: Some(Coordinates::new(34.0, -6.8)),
            is_loading: false,
            error: None,
            permission_status: None,
        };
        assert_eq!(
            PrayerQuery::resolve(&loc, "Mecca"),
            PrayerQuery::Coordinates(Coordinates::new(34.0, -6.8))
        );

        loc.coordinates = None;
        assert_eq!(PrayerQuery::resolve(&loc, "Mecca"), PrayerQuery::City("Rabat".into()));

        loc.city = "  ".into();
        assert_eq!(PrayerQuery::resolve(&loc, "Mecca"), PrayerQuery::City("Mecca".into()));
    }

    #[test]
    fn test_due_alerts() {
        let alerts = due_alerts(&day(), NaiveTime::from_hms_opt(15, 45, 30).unwrap());
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].title, "It's time for Asr Prayer");
        assert_eq!(alerts[0].message, "العصر - 15:45");
        assert_eq!(alerts[0].kind, NotificationKind::Prayer);

        assert!(due_alerts(&day(), t("15:46")).is_empty());
        assert!(due_alerts(&[], t("15:45")).is_empty());
    }

    #[tokio::test]
    async fn test_refresh_success_and_failure() {
        let svc = service(false);
        let state = svc
            .refresh(&PrayerQuery::Coordinates(Coordinates::new(0.0, 0.0)))
            .await;
        assert_eq!(state.ready().map(Vec::len), Some(6));
        assert_eq!(svc.cached_prayers().len(), 6);

        let state = svc.refresh(&PrayerQuery::City("Atlantis".into())).await;
        assert_eq!(state, FetchState::Failed(MSG_PRAYER_FETCH_FAILED.into()));
        // 失败不清除最近一次成功的列表
        assert_eq!(svc.cached_prayers().len(), 6);
    }

    #[tokio::test]
    async fn test_prayer_day_error_message() {
        let svc = service(true);
        let err = svc
            .prayer_day(&PrayerQuery::Coordinates(Coordinates::new(0.0, 0.0)))
            .await
            .unwrap_err();
        assert_eq!(err.message(), MSG_PRAYER_FETCH_FAILED);
    }

    #[tokio::test]
    async fn test_weekly_window() {
        let svc = service(false);
        let today = NaiveDate::from_ymd_opt(2026, 12, 28).unwrap();
        let week = svc.weekly(Coordinates::new(0.0, 0.0), today).await.unwrap();
        assert_eq!(week.len(), 4);
        assert_eq!(week[0].date, "28 Dec 2026");
    }

    #[tokio::test]
    async fn test_timezone_failure_is_empty() {
        let svc = service(false);
        let info = svc.timezone(Coordinates::new(0.0, 0.0)).await;
        assert!(info.is_empty());
        assert_eq!(info.gmt_offset, "");
    }

    #[test]
    fn test_local_now_uses_place_offset() {
        let utc_now = DateTime::parse_from_rfc3339("2026-10-16T22:30:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let riyadh = local_now(FixedOffset::east_opt(3 * 3600), utc_now);
        assert_eq!(riyadh.date(), NaiveDate::from_ymd_opt(2026, 10, 17).unwrap());
        assert_eq!(riyadh.time(), t("01:30"));

        let lima = local_now(FixedOffset::west_opt(5 * 3600), utc_now);
        assert_eq!(lima.time(), t("17:30"));

        assert_eq!(local_now(None, utc_now), utc_now.with_timezone(&Local).naive_local());
    }

    struct FixedTimezone(&'static str);

    #[async_trait]
    impl TimezoneSource for FixedTimezone {
        async fn current(&self, _coords: Coordinates) -> Result<TimezoneInfo> {
            Ok(TimezoneInfo {
                timezone: "Asia/Kolkata".into(),
                local_time: String::new(),
                gmt_offset: self.0.into(),
            })
        }
    }

    #[tokio::test]
    async fn test_clock_follows_queried_place() {
        let svc = PrayerService::new(stub(false), Arc::new(FixedTimezone("GMT+5:30")), "Mecca");

        let now = svc
            .clock_for(&PrayerQuery::Coordinates(Coordinates::new(28.6, 77.2)))
            .await;
        let ahead = (now - Utc::now().naive_utc()).num_minutes();
        assert!((329..=330).contains(&ahead), "offset was {} minutes", ahead);

        // 城市名查询没有坐标，使用本机时钟
        let now = svc.clock_for(&PrayerQuery::City("Delhi".into())).await;
        let drift = (now - Local::now().naive_local()).num_seconds().abs();
        assert!(drift <= 1);
    }

    #[test]
    fn test_prayer_day_build() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        let day = PrayerDay::build(day(), today, t("13:00"));
        assert_eq!(day.date, "October 16, 2026");
        assert_eq!(day.status.next.name, "Asr");

        let json = serde_json::to_value(&day).unwrap();
        assert_eq!(json["next"]["time_left"], "2h 45m");
        assert_eq!(json["current"]["name"], "Dhuhr");
    }

    #[tokio::test]
    async fn test_alerts_fire_once_per_minute() {
        let prayer = service(false);
        prayer
            .refresh(&PrayerQuery::City("Mecca".into()))
            .await;
        let location = Arc::new(LocationService::new(
            &LocationConfig::default(),
            Arc::new(NoGeocoder),
        ));
        let center = Arc::new(NotificationCenter::new(
            &NotificationConfig::default(),
            Arc::new(NullNotifier),
        ));
        let alerts = PrayerAlerts::new(prayer, location, center.clone(), Duration::from_secs(60));

        let date = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        assert_eq!(alerts.check_at(date, t("12:15")), 1);
        assert_eq!(alerts.check_at(date, NaiveTime::from_hms_opt(12, 15, 40).unwrap()), 0);
        assert_eq!(alerts.check_at(date, t("12:16")), 0);
        assert_eq!(center.len(), 1);
        assert_eq!(center.all()[0].title, "It's time for Dhuhr Prayer");

        let next_day = date.succ_opt().unwrap();
        assert_eq!(alerts.check_at(next_day, t("12:15")), 1);
    }

    #[tokio::test]
    async fn test_stale_refresh_does_not_replace_cached_list() {
        let prayer = service(false);
        let slow = {
            let prayer = prayer.clone();
            tokio::spawn(async move { prayer.refresh(&PrayerQuery::City("Slow".into())).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        prayer.refresh(&PrayerQuery::City("Rabat".into())).await;

        // 较早发起的请求最后完成，其结果被丢弃
        let late = slow.await.unwrap();
        assert_eq!(late.ready().map(Vec::len), Some(1));
        assert_eq!(prayer.state().ready().map(Vec::len), Some(6));
        assert_eq!(prayer.cached_prayers().len(), 6);
    }

    #[tokio::test]
    async fn test_alert_tick_follows_location_change() {
        let source = stub(false);
        let prayer = service_with(source.clone());
        let location = Arc::new(LocationService::new(
            &LocationConfig::default(),
            Arc::new(NoGeocoder),
        ));
        let alerts = alerts_for(prayer.clone(), location.clone());

        alerts.tick().await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        assert!(source.cities.lock().is_empty());

        // 位置未变：不重复请求
        alerts.tick().await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);

        location.set_city("Cairo").unwrap();
        alerts.tick().await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
        assert_eq!(*source.cities.lock(), vec!["Cairo".to_string()]);
    }

    #[tokio::test]
    async fn test_alert_ticker_start_stop() {
        let prayer = service(false);
        let location = Arc::new(LocationService::new(
            &LocationConfig::default(),
            Arc::new(NoGeocoder),
        ));
        let center = Arc::new(NotificationCenter::new(
            &NotificationConfig::default(),
            Arc::new(NullNotifier),
        ));
        let alerts = Arc::new(PrayerAlerts::new(
            prayer.clone(),
            location,
            center,
            Duration::from_secs(60),
        ));
        alerts.start();
        assert!(alerts.is_running());
        // 启动时立即检查一次，会先拉取当天列表
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(prayer.cached_prayers().len(), 6);

        alerts.stop();
        assert!(!alerts.is_running());
    }
}
