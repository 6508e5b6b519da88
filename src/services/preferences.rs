//! 界面偏好：深色模式与语言

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter, EnumString};
use tracing::info;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, EnumIter, AsRefStr, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Ar,
    Fr,
}

impl Language {
    pub fn native_name(&self) -> &'static str {
        match self {
            Self::En => "English",
            Self::Ar => "العربية",
            Self::Fr => "Français",
        }
    }

    /// 从右向左书写
    pub fn is_rtl(&self) -> bool {
        matches!(self, Self::Ar)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    pub dark_mode: bool,
    pub language: Language,
}

/// 部分更新
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PreferencesUpdate {
    pub dark_mode: Option<bool>,
    pub language: Option<Language>,
}

#[derive(Default)]
pub struct PreferencesStore {
    inner: RwLock<Preferences>,
}

impl PreferencesStore {
    pub fn new(initial: Preferences) -> Self {
        Self {
            inner: RwLock::new(initial),
        }
    }

    pub fn get(&self) -> Preferences {
        *self.inner.read()
    }

    pub fn update(&self, update: PreferencesUpdate) -> Preferences {
        let mut prefs = self.inner.write();
        if let Some(dark_mode) = update.dark_mode {
            prefs.dark_mode = dark_mode;
        }
        if let Some(language) = update.language {
            prefs.language = language;
        }
        info!(
            "Preferences updated: dark_mode={}, language={}",
            prefs.dark_mode,
            prefs.language.as_ref()
        );
        *prefs
    }

    /// 切换深色模式，返回切换后的值
    pub fn toggle_theme(&self) -> bool {
        let mut prefs = self.inner.write();
        prefs.dark_mode = !prefs.dark_mode;
        prefs.dark_mode
    }
}
