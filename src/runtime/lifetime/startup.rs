use anyhow::Result;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};

use crate::api::services::AppStartTime;
use crate::config::{StaticConfig, get_config};
use crate::content;
use crate::services::AppServices;

pub struct StartupContext {
    pub config: Arc<StaticConfig>,
    pub services: AppServices,
    pub start_time: AppStartTime,
}

/// 准备服务器启动的上下文
/// 组装服务并启动提醒与礼拜提醒计时器
pub async fn prepare_server_startup() -> Result<StartupContext> {
    let started = std::time::Instant::now();
    debug!("Starting pre-startup processing...");

    let config = get_config();

    // 内置内容在编译期嵌入，这里只做一次解析以便尽早暴露损坏的数据
    let library = content::library();
    info!(
        "Content library loaded: {} adkar, {} verses, {} hadiths",
        library.all_adkar().len(),
        library.verses().len(),
        library.hadiths().len()
    );

    let services = AppServices::from_config(&config);
    services.start_background();

    info!(
        "Pre-startup processing completed in {} ms",
        started.elapsed().as_millis()
    );

    Ok(StartupContext {
        config,
        services,
        start_time: AppStartTime {
            start_datetime: Utc::now(),
        },
    })
}
