//! Server mode
//!
//! This module contains the HTTP server startup logic.
//! It configures and starts the HTTP server with all API routes.

use actix_cors::Cors;
use actix_web::{
    App, HttpServer,
    middleware::{Compress, DefaultHeaders},
    web,
};
use anyhow::Result;
use tracing::{info, warn};

use crate::api::middleware::{RequestIdMiddleware, TimingMiddleware};
use crate::api::services::api_routes;
use crate::runtime::lifetime;

/// Build CORS middleware from the configured origin list
///
/// 空列表表示仅同源；包含 `*` 时允许任意来源。
fn build_cors_middleware(allowed_origins: &[String]) -> Cors {
    let mut cors = Cors::default()
        .allowed_methods(vec!["GET", "HEAD", "POST", "PUT", "DELETE"])
        .allowed_header(actix_web::http::header::CONTENT_TYPE)
        .allowed_header(actix_web::http::header::ACCEPT)
        .max_age(3600);

    if allowed_origins.iter().any(|o| o == "*") {
        cors = cors.allow_any_origin();
    } else {
        for origin in allowed_origins {
            cors = cors.allowed_origin(origin);
        }
    }

    cors
}

/// Run the HTTP server
///
/// This function:
/// 1. Prepares services and starts background timers
/// 2. Configures and starts the HTTP server
/// 3. Listens for graceful shutdown signals
///
/// **Note**: Logging system must be initialized before calling this function
pub async fn run_server() -> Result<()> {
    let startup = lifetime::startup::prepare_server_startup()
        .await
        .map_err(|e| {
            tracing::error!("Server startup failed: {}", e);
            e
        })?;

    let config = startup.config.clone();
    let services = startup.services.clone();
    let app_start_time = startup.start_time.clone();

    let api_prefix = config.server.api_prefix.clone();
    let allowed_origins = config.server.cors_allowed_origins.clone();
    if allowed_origins.is_empty() {
        info!("CORS: no allowed origins configured, same-origin only");
    }

    let cpu_count = config.server.cpu_count.clamp(1, 32);
    warn!("Using {} CPU cores for the server", cpu_count);

    let server_services = services.clone();
    let server = HttpServer::new(move || {
        App::new()
            .wrap(TimingMiddleware::default()) // 最外层，记录请求延迟
            .wrap(RequestIdMiddleware) // 为每个请求生成 request_id
            .wrap(build_cors_middleware(&allowed_origins))
            .wrap(Compress::default())
            .app_data(web::Data::new(server_services.clone()))
            .app_data(web::Data::new(app_start_time.clone()))
            .app_data(web::PayloadConfig::new(64 * 1024))
            .wrap(
                DefaultHeaders::new().add(("Cache-Control", "no-cache, no-store, must-revalidate")),
            )
            .service(api_routes(&api_prefix))
    })
    .keep_alive(std::time::Duration::from_secs(30))
    .client_request_timeout(std::time::Duration::from_millis(5000))
    .workers(cpu_count);

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    warn!(
        "Starting server at http://{}{}",
        bind_address, config.server.api_prefix
    );
    let server = server.bind(bind_address)?.run();

    // Wait for server or shutdown signal
    tokio::select! {
        res = server => {
            services.shutdown();
            res?;
        }
        _ = lifetime::shutdown::listen_for_shutdown(&services) => {
            warn!("Graceful shutdown: all tasks completed");
        }
    }

    Ok(())
}
