//! Logging system initialization
//!
//! 根据 `[logging]` 配置初始化 tracing：输出到控制台或文件（可按天轮转），
//! 文本或 JSON 格式。

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

const DEFAULT_LOG_NAME: &str = "salatlink.log";

/// 日志输出目标
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    Stdout,
    /// CLI 模式：日志不混入命令输出
    Stderr,
}

/// 拆分日志文件路径为 (目录, 文件名前缀)，用于按天轮转
pub fn rolling_parts(log_file: &str) -> (&Path, &str) {
    let path = Path::new(log_file);
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let name = path
        .file_name()
        .and_then(|f| f.to_str())
        .unwrap_or(DEFAULT_LOG_NAME);
    (dir, name.trim_end_matches(".log"))
}

fn build_writer(
    config: &LoggingConfig,
    target: LogTarget,
) -> Result<Box<dyn Write + Send + Sync>> {
    let log_file = config.file.as_deref().filter(|f| !f.is_empty());

    let writer: Box<dyn Write + Send + Sync> = match log_file {
        Some(log_file) if config.enable_rotation => {
            let (dir, prefix) = rolling_parts(log_file);
            let appender = rolling::Builder::new()
                .rotation(rolling::Rotation::DAILY)
                .filename_prefix(prefix)
                .filename_suffix("log")
                .max_log_files(config.max_backups.max(1) as usize)
                .build(dir)
                .with_context(|| format!("Failed to create rolling log appender in {:?}", dir))?;
            Box::new(appender)
        }
        Some(log_file) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(log_file)
                .with_context(|| format!("Failed to open log file {}", log_file))?;
            Box::new(file)
        }
        None => match target {
            LogTarget::Stdout => Box::new(std::io::stdout()),
            LogTarget::Stderr => Box::new(std::io::stderr()),
        },
    };
    Ok(writer)
}

/// Initialize logging system based on configuration
///
/// 返回的 `WorkerGuard` 必须在程序运行期间保持存活，以保证非阻塞写入被刷新。
/// `RUST_LOG` 存在时优先于配置中的级别。
pub fn init_logging(config: &LoggingConfig, target: LogTarget) -> Result<WorkerGuard> {
    let writer = build_writer(config, target)?;
    let (non_blocking_writer, guard) = tracing_appender::non_blocking(writer);

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .context("Invalid log level")?;

    let to_console = config.file.as_ref().is_none_or(|f| f.is_empty());
    let builder = tracing_subscriber::fmt()
        .with_writer(non_blocking_writer)
        .with_env_filter(filter)
        .with_level(true)
        .with_ansi(to_console);

    let installed = if config.format.eq_ignore_ascii_case("json") {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {}", e))?;

    Ok(guard)
}
