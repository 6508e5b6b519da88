//! CLI interface module
//!
//! 每个子命令构建一次 `AppServices`，完成查询后输出结果并退出。

pub mod commands;

use std::fmt;

use crate::cli::{Commands, ConfigCommands};
use crate::config::get_config;
use crate::errors::SalatError;
use crate::services::AppServices;
use commands::{
    config_generate, locate, next_prayer, prayer_times, random_hadith, run_reminders,
    search_cities, show_adkar, show_mosques, show_quran, show_route, show_timezone,
    weekly_times,
};

#[derive(Debug)]
pub enum CliError {
    /// 服务层返回的错误（网络、数据源、校验）
    ServiceError(String),
    ParseError(String),
    CommandError(String),
}

impl CliError {
    /// Format as simple output
    pub fn format_simple(&self) -> String {
        match self {
            CliError::ServiceError(msg) => format!("Service error: {}", msg),
            CliError::ParseError(msg) => format!("Parse error: {}", msg),
            CliError::CommandError(msg) => format!("Command error: {}", msg),
        }
    }

    /// Format as colored output
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        match self {
            CliError::ServiceError(msg) => {
                format!("{} {}", "Service error:".red().bold(), msg.white())
            }
            CliError::ParseError(msg) => {
                format!("{} {}", "Parse error:".yellow().bold(), msg.white())
            }
            CliError::CommandError(msg) => {
                format!("{} {}", "Command error:".red().bold(), msg.white())
            }
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for CliError {}

impl From<SalatError> for CliError {
    fn from(err: SalatError) -> Self {
        match err {
            SalatError::Validation(msg) | SalatError::DateParse(msg) => CliError::ParseError(msg),
            other => CliError::ServiceError(other.message().to_string()),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::CommandError(format!("Failed to encode JSON output: {}", err))
    }
}

/// Run a CLI command from clap-parsed input
///
/// 构建服务不会发起任何网络请求，`config generate` 也走同一条路径。
pub async fn run_cli_command(cmd: Commands) -> Result<(), CliError> {
    let config = get_config();
    let services = AppServices::from_config(&config);

    match cmd {
        Commands::Times { place, json } => prayer_times(&services, &place, json).await,
        Commands::Next { place } => next_prayer(&services, &place).await,
        Commands::Weekly { place, json } => weekly_times(&services, &place, json).await,
        Commands::Timezone { place } => show_timezone(&services, &place).await,
        Commands::Search { query } => search_cities(&services, &query).await,
        Commands::Locate => locate(&services).await,
        Commands::Mosques { place, json } => show_mosques(&services, &place, json).await,
        Commands::Route {
            to_lat,
            to_lon,
            mode,
            from,
            steps,
        } => show_route(&services, to_lat, to_lon, &mode, &from, steps).await,
        Commands::Adkar { category } => show_adkar(category.as_deref()),
        Commands::Quran { id, surah } => show_quran(id, surah),
        Commands::Hadith => random_hadith(),
        Commands::Remind { once, desktop } => run_reminders(&services, once, desktop).await,
        Commands::Config {
            action: ConfigCommands::Generate { output_path, force },
        } => config_generate(output_path, force).await,
    }
}
