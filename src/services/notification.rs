//! 通知中心
//!
//! 唯一入口 `show()` 会把一条通知同时分发到：
//! 1. 内存历史（有上限，展示最近 `display_limit` 条）
//! 2. toast 广播通道（Server 模式转为 SSE，CLI 直接打印）
//! 3. 系统桌面通知（仅在用户之前明确授权后）
//!
//! 所有投递都是尽力而为，失败只记录日志，不向调用方传播。

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};
use tokio::sync::broadcast;
use tracing::{debug, info, trace, warn};
use uuid::Uuid;

use crate::config::NotificationConfig;
use crate::errors::{Result, SalatError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum NotificationKind {
    Prayer,
    Adkar,
    Quran,
}

/// toast 的展示级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastLevel {
    Info,
    Success,
    Default,
}

impl NotificationKind {
    pub fn toast_level(&self) -> ToastLevel {
        match self {
            Self::Prayer => ToastLevel::Info,
            Self::Adkar => ToastLevel::Success,
            Self::Quran => ToastLevel::Default,
        }
    }
}

/// 新通知请求
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewNotification {
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
}

impl NewNotification {
    pub fn new(title: impl Into<String>, message: impl Into<String>, kind: NotificationKind) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationItem {
    pub id: Uuid,
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
    pub timestamp: DateTime<Utc>,
}

/// 广播给订阅者的 toast
#[derive(Debug, Clone, Serialize)]
pub struct Toast {
    #[serde(flatten)]
    pub item: NotificationItem,
    pub level: ToastLevel,
}

/// 桌面通知权限
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationPermission {
    Default,
    Granted,
    Denied,
}

/// 系统桌面通知
pub trait DesktopNotifier: Send + Sync {
    /// 向系统请求权限（只会在用户明确操作时调用）
    fn request_permission(&self) -> NotificationPermission;

    fn notify(&self, title: &str, body: &str) -> Result<()>;

    fn name(&self) -> &'static str;
}

/// 不做任何事的桌面通知（禁用或测试时使用）
pub struct NullNotifier;

impl DesktopNotifier for NullNotifier {
    fn request_permission(&self) -> NotificationPermission {
        NotificationPermission::Denied
    }

    fn notify(&self, _title: &str, _body: &str) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "null"
    }
}

/// AppleScript 字符串字面量：只转义反斜杠和双引号，其余字符原样保留
fn applescript_string(raw: &str) -> String {
    let mut quoted = String::with_capacity(raw.len() + 2);
    quoted.push('"');
    for c in raw.chars() {
        if matches!(c, '\\' | '"') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

/// 调用平台命令发送桌面通知（Linux: notify-send，macOS: osascript）
pub struct CommandNotifier;

impl CommandNotifier {
    fn command(title: &str, body: &str) -> Option<std::process::Command> {
        if cfg!(target_os = "linux") {
            let mut cmd = std::process::Command::new("notify-send");
            // "--" 之后的标题不会被当作选项解析
            cmd.arg("--app-name=salatlink").arg("--").arg(title).arg(body);
            Some(cmd)
        } else if cfg!(target_os = "macos") {
            let script = format!(
                "display notification {} with title {}",
                applescript_string(body),
                applescript_string(title)
            );
            let mut cmd = std::process::Command::new("osascript");
            cmd.arg("-e").arg(script);
            Some(cmd)
        } else {
            None
        }
    }
}

impl DesktopNotifier for CommandNotifier {
    fn request_permission(&self) -> NotificationPermission {
        let program = if cfg!(target_os = "linux") {
            "notify-send"
        } else if cfg!(target_os = "macos") {
            "osascript"
        } else {
            return NotificationPermission::Denied;
        };

        let available = std::env::var_os("PATH")
            .map(|paths| std::env::split_paths(&paths).any(|dir| dir.join(program).is_file()))
            .unwrap_or(false);
        if available {
            NotificationPermission::Granted
        } else {
            NotificationPermission::Denied
        }
    }

    fn notify(&self, title: &str, body: &str) -> Result<()> {
        let mut cmd = Self::command(title, body)
            .ok_or_else(|| SalatError::unsupported("Desktop notifications are not supported on this platform"))?;
        let status = cmd.status()?;
        if status.success() {
            Ok(())
        } else {
            Err(SalatError::file_operation(format!(
                "Desktop notifier exited with {}",
                status
            )))
        }
    }

    fn name(&self) -> &'static str {
        "command"
    }
}

/// 根据配置选择桌面通知实现
pub fn desktop_notifier(config: &NotificationConfig) -> Arc<dyn DesktopNotifier> {
    let desktop: Arc<dyn DesktopNotifier> = if config.desktop_enabled {
        Arc::new(CommandNotifier)
    } else {
        Arc::new(NullNotifier)
    };
    debug!("Using {} desktop notifier", desktop.name());
    desktop
}

pub struct NotificationCenter {
    history: RwLock<VecDeque<NotificationItem>>,
    max_history: usize,
    display_limit: usize,
    toasts: broadcast::Sender<Toast>,
    permission: RwLock<NotificationPermission>,
    desktop: Arc<dyn DesktopNotifier>,
}

impl NotificationCenter {
    pub fn new(config: &NotificationConfig, desktop: Arc<dyn DesktopNotifier>) -> Self {
        let (toasts, _) = broadcast::channel(config.toast_capacity.max(1));
        Self {
            history: RwLock::new(VecDeque::new()),
            max_history: config.max_history.max(1),
            display_limit: config.display_limit,
            toasts,
            permission: RwLock::new(NotificationPermission::Default),
            desktop,
        }
    }

    pub fn from_config(config: &NotificationConfig) -> Self {
        Self::new(config, desktop_notifier(config))
    }

    /// 发送通知
    pub fn show(&self, request: NewNotification) -> NotificationItem {
        let item = NotificationItem {
            id: Uuid::new_v4(),
            title: request.title,
            message: request.message,
            kind: request.kind,
            timestamp: Utc::now(),
        };
        info!("Notification [{}] {}", item.kind.as_ref(), item.title);

        {
            let mut history = self.history.write();
            history.push_back(item.clone());
            while history.len() > self.max_history {
                history.pop_front();
            }
        }

        let toast = Toast {
            item: item.clone(),
            level: item.kind.toast_level(),
        };
        // 没有订阅者时发送会失败，属于正常情况
        if let Err(e) = self.toasts.send(toast) {
            trace!("No toast subscribers: {}", e);
        }

        if self.permission() == NotificationPermission::Granted {
            self.deliver_desktop(&item);
        }

        item
    }

    fn deliver_desktop(&self, item: &NotificationItem) {
        let desktop = Arc::clone(&self.desktop);
        let title = item.title.clone();
        let body = item.message.clone();
        let deliver = move || {
            if let Err(e) = desktop.notify(&title, &body) {
                warn!("Desktop notification via {} failed: {}", desktop.name(), e);
            }
        };

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn_blocking(deliver);
            }
            Err(_) => deliver(),
        }
    }

    /// 最近的通知（最多 `display_limit` 条，按时间先后）
    pub fn recent(&self) -> Vec<NotificationItem> {
        let history = self.history.read();
        let skip = history.len().saturating_sub(self.display_limit);
        history.iter().skip(skip).cloned().collect()
    }

    pub fn all(&self) -> Vec<NotificationItem> {
        self.history.read().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.history.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.read().is_empty()
    }

    pub fn clear(&self) {
        self.history.write().clear();
        info!("Notification history cleared");
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Toast> {
        self.toasts.subscribe()
    }

    pub fn permission(&self) -> NotificationPermission {
        *self.permission.read()
    }

    /// 请求桌面通知权限；已经授权或拒绝时不再询问
    pub fn request_permission(&self) -> NotificationPermission {
        let current = self.permission();
        if current != NotificationPermission::Default {
            debug!("Notification permission already decided: {:?}", current);
            return current;
        }

        let decided = self.desktop.request_permission();
        *self.permission.write() = decided;
        info!("Desktop notification permission: {:?}", decided);
        decided
    }
}
