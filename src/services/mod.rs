//! 业务服务层
//!
//! 各服务持有自己那一份状态，HTTP API 与 CLI 共用同一套逻辑。
//! `AppServices` 把它们按配置组装在一起。

pub mod fetch;
pub mod location;
pub mod mosque;
pub mod notification;
pub mod prayer;
pub mod preferences;
pub mod reminder;

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

pub use fetch::{FetchSlot, FetchState};
pub use location::{FallbackLocation, Location, LocationService};
pub use mosque::{MosqueService, NearbyMosque, RouteView};
pub use notification::{
    CommandNotifier, DesktopNotifier, NewNotification, NotificationCenter, NotificationItem,
    NotificationKind, NotificationPermission, NullNotifier, Toast, ToastLevel,
};
pub use prayer::{PrayerAlerts, PrayerDay, PrayerQuery, PrayerService};
pub use preferences::{Language, Preferences, PreferencesStore, PreferencesUpdate};
pub use reminder::{ReminderKind, ReminderScheduler, ReminderStatus, ReminderTimings};

use crate::config::StaticConfig;
use crate::providers::{
    AladhanClient, Geocoder, IpPositionSource, MosqueSource, NominatimClient, OpenRouteClient,
    OverpassClient, PositionSource, PrayerTimesSource, RouteSource, TimeApiClient,
    TimezoneSource,
};

/// 外部数据源集合，测试时可替换为桩实现
#[derive(Clone)]
pub struct Providers {
    pub prayer_times: Arc<dyn PrayerTimesSource>,
    pub timezone: Arc<dyn TimezoneSource>,
    pub geocoder: Arc<dyn Geocoder>,
    pub mosques: Arc<dyn MosqueSource>,
    pub routes: Arc<dyn RouteSource>,
    pub position: Arc<dyn PositionSource>,
    pub desktop: Arc<dyn DesktopNotifier>,
}

impl Providers {
    pub fn from_config(config: &StaticConfig) -> Self {
        Self {
            prayer_times: Arc::new(AladhanClient::from_config(config)),
            timezone: Arc::new(TimeApiClient::from_config(config)),
            geocoder: Arc::new(NominatimClient::from_config(config)),
            mosques: Arc::new(OverpassClient::from_config(config)),
            routes: Arc::new(OpenRouteClient::from_config(config)),
            position: Arc::new(IpPositionSource::from_config(config)),
            desktop: notification::desktop_notifier(&config.notifications),
        }
    }
}

/// 应用内所有服务
#[derive(Clone)]
pub struct AppServices {
    pub location: Arc<LocationService>,
    pub prayer: Arc<PrayerService>,
    pub alerts: Arc<PrayerAlerts>,
    pub notifications: Arc<NotificationCenter>,
    pub reminders: Arc<ReminderScheduler>,
    pub mosques: Arc<MosqueService>,
    pub preferences: Arc<PreferencesStore>,
    /// 服务端自动定位（CLI `locate` 与未上报位置时使用）
    pub position: Arc<dyn PositionSource>,
    reminders_enabled: bool,
    alerts_enabled: bool,
}

impl AppServices {
    pub fn from_config(config: &StaticConfig) -> Self {
        Self::with_providers(config, Providers::from_config(config))
    }

    pub fn with_providers(config: &StaticConfig, providers: Providers) -> Self {
        let notifications = Arc::new(NotificationCenter::new(
            &config.notifications,
            providers.desktop,
        ));
        let location = Arc::new(LocationService::new(&config.location, providers.geocoder));
        let prayer = Arc::new(PrayerService::new(
            providers.prayer_times,
            providers.timezone,
            config.location.default_city.clone(),
        ));
        let alerts = Arc::new(PrayerAlerts::new(
            Arc::clone(&prayer),
            Arc::clone(&location),
            Arc::clone(&notifications),
            Duration::from_secs(config.prayer.alert_check_interval_secs.max(1)),
        ));
        let reminders = Arc::new(ReminderScheduler::new(
            Arc::clone(&notifications),
            ReminderTimings::from(&config.reminders),
        ));
        let mosques = Arc::new(MosqueService::new(
            &config.mosques,
            providers.mosques,
            providers.routes,
        ));

        Self {
            location,
            prayer,
            alerts,
            notifications,
            reminders,
            mosques,
            preferences: Arc::new(PreferencesStore::default()),
            position: providers.position,
            reminders_enabled: config.reminders.enabled,
            alerts_enabled: config.prayer.alerts_enabled,
        }
    }

    /// 启动后台计时器（需在 tokio 运行时内调用）
    pub fn start_background(&self) {
        if self.reminders_enabled {
            self.reminders.start();
        } else {
            info!("Reminders are disabled in config");
        }

        if self.alerts_enabled {
            self.alerts.start();
        } else {
            info!("Prayer alerts are disabled in config");
        }
    }

    /// 中止所有后台计时器
    pub fn shutdown(&self) {
        self.reminders.stop();
        self.alerts.stop();
    }
}
