use serde::{Deserialize, Serialize};

/// 默认配置文件路径
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// 环境变量前缀，例如 SALAT__SERVER__PORT=9999
pub const ENV_PREFIX: &str = "SALAT";

/// 静态配置（从 TOML 加载，启动时使用）
///
/// 包含：
/// - server: 服务器地址、端口、CPU 数量、API 前缀
/// - logging: 日志配置
/// - location: 默认（兜底）位置
/// - providers: 第三方 HTTP API 地址与超时
/// - prayer / reminders / notifications / mosques: 各业务模块参数
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StaticConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub location: LocationConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub prayer: PrayerConfig,
    #[serde(default)]
    pub reminders: ReminderConfig,
    #[serde(default)]
    pub notifications: NotificationConfig,
    #[serde(default)]
    pub mosques: MosqueConfig,
}

impl StaticConfig {
    /// 从 TOML 文件和环境变量加载配置
    ///
    /// 优先级：ENV > config.toml > 默认值
    /// ENV 前缀：SALAT，分隔符：__
    /// 示例：SALAT__SERVER__PORT=9999
    pub fn load(path: Option<&str>) -> Self {
        use config::{Config, Environment, File};

        let path = path.unwrap_or(DEFAULT_CONFIG_PATH);

        let builder = Config::builder()
            // 1. 从 TOML 文件加载（可选）
            .add_source(File::with_name(path).required(false))
            // 2. 从环境变量覆盖
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            );

        match builder.build() {
            Ok(settings) => match settings.try_deserialize::<StaticConfig>() {
                Ok(config) => {
                    if std::path::Path::new(path).exists() {
                        eprintln!("[INFO] Configuration loaded from: {}", path);
                    }
                    config
                }
                Err(e) => {
                    eprintln!("[ERROR] Failed to deserialize config: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("[ERROR] Failed to build config: {}", e);
                Self::default()
            }
        }
    }

    /// 生成示例 TOML 配置文件
    pub fn generate_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config)
            .unwrap_or_else(|e| format!("Error generating sample config: {}", e))
    }

    /// 保存配置到 TOML 文件
    pub fn save_to_file<P: AsRef<std::path::Path>>(
        &self,
        path: P,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;

        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    #[serde(default = "default_cpu_count")]
    pub cpu_count: usize,
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,
    /// 允许跨域的来源，空表示仅同源，`["*"]` 表示任意来源
    #[serde(default)]
    pub cors_allowed_origins: Vec<String>,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_enable_rotation")]
    pub enable_rotation: bool,
}

/// 兜底位置配置
///
/// 自动定位失败或尚未完成时，系统始终使用该位置进行查询
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    #[serde(default = "default_city")]
    pub default_city: String,
    #[serde(default = "default_latitude")]
    pub default_latitude: f64,
    #[serde(default = "default_longitude")]
    pub default_longitude: f64,
}

/// 第三方 HTTP API 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default = "default_aladhan_url")]
    pub aladhan_url: String,
    #[serde(default = "default_nominatim_url")]
    pub nominatim_url: String,
    #[serde(default = "default_timeapi_url")]
    pub timeapi_url: String,
    #[serde(default = "default_overpass_url")]
    pub overpass_url: String,
    #[serde(default = "default_openroute_url")]
    pub openroute_url: String,
    /// OpenRouteService API key，未配置时路线查询返回配置错误
    #[serde(default)]
    pub openroute_api_key: Option<String>,
    /// IP 定位 API（CLI 自动定位使用）
    #[serde(default = "default_ip_geolocation_url")]
    pub ip_geolocation_url: String,
    /// Nominatim 要求携带可识别的 User-Agent
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
}

/// 礼拜时间配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrayerConfig {
    /// Aladhan 计算方法，2 = ISNA
    #[serde(default = "default_calculation_method")]
    pub calculation_method: u8,
    #[serde(default = "default_true")]
    pub alerts_enabled: bool,
    #[serde(default = "default_alert_check_interval_secs")]
    pub alert_check_interval_secs: u64,
}

/// 提醒调度配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_reminder_interval_minutes")]
    pub interval_minutes: u64,
    #[serde(default = "default_reminder_warmup_secs")]
    pub warmup_secs: u64,
    #[serde(default = "default_follow_up_delay_secs")]
    pub follow_up_delay_secs: u64,
}

/// 通知配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// 展示用的最近通知条数
    #[serde(default = "default_display_limit")]
    pub display_limit: usize,
    /// 内存中最多保留的通知条数
    #[serde(default = "default_max_history")]
    pub max_history: usize,
    /// toast 广播通道容量
    #[serde(default = "default_toast_capacity")]
    pub toast_capacity: usize,
    /// 是否允许使用系统桌面通知
    #[serde(default = "default_true")]
    pub desktop_enabled: bool,
}

/// 清真寺搜索与路线配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MosqueConfig {
    #[serde(default = "default_search_radius_m")]
    pub search_radius_m: u32,
    #[serde(default = "default_overpass_timeout_secs")]
    pub query_timeout_secs: u32,
    #[serde(default = "default_unsupported_mode_delay_ms")]
    pub unsupported_mode_delay_ms: u64,
}

// ============================================================
// Default value functions
// ============================================================

fn default_true() -> bool {
    true
}

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    8080
}

fn default_cpu_count() -> usize {
    num_cpus::get()
}

fn default_api_prefix() -> String {
    "/api/v1".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_max_backups() -> u32 {
    5
}

fn default_enable_rotation() -> bool {
    true
}

fn default_city() -> String {
    "Mecca".to_string()
}

fn default_latitude() -> f64 {
    21.422510
}

fn default_longitude() -> f64 {
    39.826168
}

fn default_aladhan_url() -> String {
    "https://api.aladhan.com/v1".to_string()
}

fn default_nominatim_url() -> String {
    "https://nominatim.openstreetmap.org".to_string()
}

fn default_timeapi_url() -> String {
    "https://timeapi.io/api".to_string()
}

fn default_overpass_url() -> String {
    "https://overpass-api.de/api/interpreter".to_string()
}

fn default_openroute_url() -> String {
    "https://api.openrouteservice.org".to_string()
}

fn default_ip_geolocation_url() -> String {
    "http://ip-api.com/json/?fields=status,message,lat,lon,city".to_string()
}

fn default_user_agent() -> String {
    format!("salatlink/{}", env!("CARGO_PKG_VERSION"))
}

fn default_http_timeout_secs() -> u64 {
    10
}

fn default_calculation_method() -> u8 {
    2
}

fn default_alert_check_interval_secs() -> u64 {
    60
}

fn default_reminder_interval_minutes() -> u64 {
    15
}

fn default_reminder_warmup_secs() -> u64 {
    60
}

fn default_follow_up_delay_secs() -> u64 {
    5
}

fn default_display_limit() -> usize {
    5
}

fn default_max_history() -> usize {
    100
}

fn default_toast_capacity() -> usize {
    64
}

fn default_search_radius_m() -> u32 {
    4000
}

fn default_overpass_timeout_secs() -> u32 {
    25
}

fn default_unsupported_mode_delay_ms() -> u64 {
    400
}

// ============================================================
// Default implementations
// ============================================================

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            cpu_count: default_cpu_count(),
            api_prefix: default_api_prefix(),
            cors_allowed_origins: Vec::new(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
            max_backups: default_max_backups(),
            enable_rotation: default_enable_rotation(),
        }
    }
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            default_city: default_city(),
            default_latitude: default_latitude(),
            default_longitude: default_longitude(),
        }
    }
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            aladhan_url: default_aladhan_url(),
            nominatim_url: default_nominatim_url(),
            timeapi_url: default_timeapi_url(),
            overpass_url: default_overpass_url(),
            openroute_url: default_openroute_url(),
            openroute_api_key: None,
            ip_geolocation_url: default_ip_geolocation_url(),
            user_agent: default_user_agent(),
            http_timeout_secs: default_http_timeout_secs(),
        }
    }
}

impl Default for PrayerConfig {
    fn default() -> Self {
        Self {
            calculation_method: default_calculation_method(),
            alerts_enabled: true,
            alert_check_interval_secs: default_alert_check_interval_secs(),
        }
    }
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_minutes: default_reminder_interval_minutes(),
            warmup_secs: default_reminder_warmup_secs(),
            follow_up_delay_secs: default_follow_up_delay_secs(),
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            display_limit: default_display_limit(),
            max_history: default_max_history(),
            toast_capacity: default_toast_capacity(),
            desktop_enabled: true,
        }
    }
}

impl Default for MosqueConfig {
    fn default() -> Self {
        Self {
            search_radius_m: default_search_radius_m(),
            query_timeout_secs: default_overpass_timeout_secs(),
            unsupported_mode_delay_ms: default_unsupported_mode_delay_ms(),
        }
    }
}
