//! 灵修提醒调度
//!
//! 启用后：预热 `warmup` 之后触发第一次，此后每隔 `interval` 触发一次
//! （两者各自计时）。每次触发先推送一条随机 Adkar，`follow_up` 之后再推送
//! 一条随机经文。关闭时中止所有计时器，包括尚未发出的后续经文。

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;
use strum::{AsRefStr, EnumString};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::{debug, info, warn};

use super::notification::{NewNotification, NotificationCenter, NotificationItem, NotificationKind};
use crate::config::ReminderConfig;
use crate::content::{self, Adkar, QuranVerse};

pub const ADKAR_TITLE: &str = "Daily Adkar";

const ARABIC_PREVIEW_CHARS: usize = 50;
const TRANSLATION_PREVIEW_CHARS: usize = 60;

/// 可手动触发的提醒类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, AsRefStr, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ReminderKind {
    Adkar,
    Quran,
}

/// 按字符截断（阿拉伯文安全），超长时追加 "..."
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

/// 提醒正文：阿拉伯原文预览 + " - " + 译文预览
///
/// 原文仅在超长时追加 "..."，译文始终以 "..." 结尾
pub fn preview_message(arabic: &str, translation: &str) -> String {
    let translation: String = translation.chars().take(TRANSLATION_PREVIEW_CHARS).collect();
    format!(
        "{} - {}...",
        truncate_chars(arabic, ARABIC_PREVIEW_CHARS),
        translation
    )
}

pub fn adkar_notification(adkar: &Adkar) -> NewNotification {
    NewNotification::new(
        ADKAR_TITLE,
        preview_message(&adkar.text, &adkar.translation),
        NotificationKind::Adkar,
    )
}

pub fn verse_notification(verse: &QuranVerse) -> NewNotification {
    NewNotification::new(
        verse.reference.clone(),
        preview_message(&verse.arabic_text, &verse.translation),
        NotificationKind::Quran,
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReminderTimings {
    pub interval: Duration,
    pub warmup: Duration,
    pub follow_up: Duration,
}

impl From<&ReminderConfig> for ReminderTimings {
    fn from(config: &ReminderConfig) -> Self {
        Self {
            interval: Duration::from_secs(config.interval_minutes.max(1) * 60),
            warmup: Duration::from_secs(config.warmup_secs),
            follow_up: Duration::from_secs(config.follow_up_delay_secs),
        }
    }
}

/// `/reminders` 返回的状态
#[derive(Debug, Clone, Serialize)]
pub struct ReminderStatus {
    pub active: bool,
    pub interval_minutes: u64,
    pub warmup_secs: u64,
    pub follow_up_secs: u64,
}

pub struct ReminderScheduler {
    center: Arc<NotificationCenter>,
    timings: ReminderTimings,
    active: AtomicBool,
    timers: Mutex<Vec<JoinHandle<()>>>,
}

impl ReminderScheduler {
    pub fn new(center: Arc<NotificationCenter>, timings: ReminderTimings) -> Self {
        Self {
            center,
            timings,
            active: AtomicBool::new(false),
            timers: Mutex::new(Vec::new()),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    pub fn status(&self) -> ReminderStatus {
        ReminderStatus {
            active: self.is_active(),
            interval_minutes: self.timings.interval.as_secs() / 60,
            warmup_secs: self.timings.warmup.as_secs(),
            follow_up_secs: self.timings.follow_up.as_secs(),
        }
    }

    /// 推送一条随机 Adkar
    pub fn show_random_adkar(&self) -> Option<NotificationItem> {
        match content::library().random_adkar() {
            Some(adkar) => Some(self.center.show(adkar_notification(adkar))),
            None => {
                warn!("No adkar available for reminder");
                None
            }
        }
    }

    /// 推送一条随机经文
    pub fn show_random_verse(&self) -> Option<NotificationItem> {
        match content::library().random_verse() {
            Some(verse) => Some(self.center.show(verse_notification(verse))),
            None => {
                warn!("No Quran verse available for reminder");
                None
            }
        }
    }

    pub fn trigger(&self, kind: ReminderKind) -> Option<NotificationItem> {
        match kind {
            ReminderKind::Adkar => self.show_random_adkar(),
            ReminderKind::Quran => self.show_random_verse(),
        }
    }

    /// 一次完整提醒：Adkar，延迟后经文
    async fn cycle(&self) {
        self.show_random_adkar();
        time::sleep(self.timings.follow_up).await;
        self.show_random_verse();
    }

    /// 启动计时器（已启动时先中止旧计时器）
    pub fn start(self: &Arc<Self>) {
        let mut timers = self.timers.lock();
        for handle in timers.drain(..) {
            handle.abort();
        }

        let warmup = {
            let scheduler = Arc::clone(self);
            tokio::spawn(async move {
                time::sleep(scheduler.timings.warmup).await;
                debug!("Reminder warm-up elapsed");
                scheduler.cycle().await;
            })
        };

        let periodic = {
            let scheduler = Arc::clone(self);
            let period = self.timings.interval;
            tokio::spawn(async move {
                let mut interval = time::interval_at(Instant::now() + period, period);
                loop {
                    interval.tick().await;
                    let cycle = Arc::clone(&scheduler);
                    // 经文延迟发送不阻塞下一次计时
                    let handle = tokio::spawn(async move { cycle.cycle().await });
                    scheduler.track(handle);
                }
            })
        };

        timers.push(warmup);
        timers.push(periodic);
        self.active.store(true, Ordering::SeqCst);
        info!(
            "Reminders started: every {} min, first after {}s",
            self.timings.interval.as_secs() / 60,
            self.timings.warmup.as_secs()
        );
    }

    fn track(&self, handle: JoinHandle<()>) {
        let mut timers = self.timers.lock();
        if !self.is_active() {
            handle.abort();
            return;
        }
        timers.retain(|h| !h.is_finished());
        timers.push(handle);
    }

    /// 停止并中止所有待触发的计时器
    pub fn stop(&self) {
        let mut timers = self.timers.lock();
        self.active.store(false, Ordering::SeqCst);
        for handle in timers.drain(..) {
            handle.abort();
        }
        info!("Reminders stopped");
    }

    /// 切换开关，返回切换后的状态
    pub fn toggle(self: &Arc<Self>) -> bool {
        if self.is_active() {
            self.stop();
        } else {
            self.start();
        }
        self.is_active()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.lock().iter().filter(|h| !h.is_finished()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NotificationConfig;
    use crate::services::notification::NullNotifier;

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("short", 50), "short");
        assert_eq!(truncate_chars("abcdef", 3), "abc...");
        // 按字符而不是字节截断
        let arabic = "سُبْحَانَ اللَّهِ وَبِحَمْدِهِ";
        let cut = truncate_chars(arabic, 5);
        assert_eq!(cut.chars().count(), 8);
        assert!(cut.ends_with("..."));
    }

    #[test]
    fn test_preview_message() {
        let arabic: String = "ع".repeat(70);
        let translation: String = "x".repeat(100);
        let message = preview_message(&arabic, &translation);
        let (left, right) = message.split_once(" - ").unwrap();
        assert_eq!(left.chars().count(), 53);
        assert_eq!(right.chars().count(), 63);

        // 短原文不加省略号，译文总是以 ... 结尾
        assert_eq!(preview_message("قصير", "Short"), "قصير - Short...");
    }

    #[test]
    fn test_notifications_from_content() {
        let lib = content::library();
        let verse = lib.verse_by_id(1).unwrap();
        let n = verse_notification(verse);
        assert_eq!(n.title, verse.reference);
        assert_eq!(n.kind, NotificationKind::Quran);

        let adkar = &lib.all_adkar()[0];
        assert_eq!(adkar_notification(adkar).title, ADKAR_TITLE);
    }

    fn scheduler(warmup: u64, interval_min: u64) -> Arc<ReminderScheduler> {
        let center = Arc::new(NotificationCenter::new(
            &NotificationConfig::default(),
            Arc::new(NullNotifier),
        ));
        let timings = ReminderTimings {
            interval: Duration::from_secs(interval_min * 60),
            warmup: Duration::from_secs(warmup),
            follow_up: Duration::from_secs(5),
        };
        Arc::new(ReminderScheduler::new(center, timings))
    }

    #[tokio::test(start_paused = true)]
    async fn test_warmup_then_follow_up() {
        let s = scheduler(60, 15);
        s.start();

        time::sleep(Duration::from_secs(59)).await;
        assert!(s.center.is_empty());

        time::sleep(Duration::from_secs(2)).await;
        let items = s.center.all();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].kind, NotificationKind::Adkar);

        time::sleep(Duration::from_secs(5)).await;
        let items = s.center.all();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].kind, NotificationKind::Quran);
    }

    #[tokio::test(start_paused = true)]
    async fn test_periodic_cycles() {
        let s = scheduler(60, 15);
        s.start();
        // 61s 预热 + 15min、30min 两次周期，各含后续经文
        time::sleep(Duration::from_secs(30 * 60 + 10)).await;
        assert_eq!(s.center.len(), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_aborts_pending_follow_up() {
        let s = scheduler(60, 15);
        s.start();
        time::sleep(Duration::from_secs(62)).await;
        assert_eq!(s.center.len(), 1);

        s.stop();
        assert!(!s.is_active());
        time::sleep(Duration::from_secs(60 * 60)).await;
        assert_eq!(s.center.len(), 1);
        assert_eq!(s.pending_timers(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_toggle() {
        let s = scheduler(60, 15);
        assert!(s.toggle());
        assert!(s.is_active());
        assert!(!s.toggle());
        time::sleep(Duration::from_secs(120)).await;
        assert!(s.center.is_empty());
    }

    #[tokio::test]
    async fn test_manual_trigger() {
        let s = scheduler(60, 15);
        let item = s.trigger(ReminderKind::Quran).unwrap();
        assert_eq!(item.kind, NotificationKind::Quran);
        let item = s.trigger(ReminderKind::Adkar).unwrap();
        assert_eq!(item.title, ADKAR_TITLE);
        assert!(!s.is_active());
    }
}
