//! 共享的阻塞 HTTP 客户端
//!
//! 所有第三方 API 都通过同一个 ureq Agent 访问，请求在
//! `spawn_blocking` 线程池中执行，避免阻塞 actix/tokio 的工作线程。

use std::sync::OnceLock;
use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::{trace, warn};
use ureq::Agent;

use crate::config::get_config;
use crate::errors::{Result, SalatError};

/// 全局 HTTP Agent（ureq 的 Agent 是 Send + Sync）
static HTTP_AGENT: OnceLock<Agent> = OnceLock::new();

fn get_agent() -> &'static Agent {
    HTTP_AGENT.get_or_init(|| {
        let timeout = get_config().providers.http_timeout_secs;
        Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(timeout)))
            .build()
            .into()
    })
}

fn user_agent() -> String {
    get_config().providers.user_agent.clone()
}

/// 拼接基础地址、路径和查询参数
pub fn build_url(base: &str, path: &str, params: &[(&str, String)]) -> Result<String> {
    let raw = format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'));
    url::Url::parse_with_params(&raw, params)
        .map(String::from)
        .map_err(|e| SalatError::config(format!("Invalid provider URL '{}': {}", raw, e)))
}

/// GET 并解析 JSON（同步，在 spawn_blocking 中调用）
pub fn get_json<T: DeserializeOwned>(url: &str) -> Result<T> {
    trace!("GET {}", url);
    let resp = get_agent()
        .get(url)
        .header("User-Agent", user_agent().as_str())
        .header("Accept", "application/json")
        .call()
        .map_err(|e| {
            warn!("HTTP GET \"{}\" failed: {}", url, e);
            SalatError::from(e)
        })?;

    resp.into_body().read_json::<T>().map_err(|e| {
        warn!("Response from \"{}\" parse failed: {}", url, e);
        SalatError::serialization(format!("Invalid response from upstream: {}", e))
    })
}

/// POST 文本请求体并解析 JSON 响应（同步，在 spawn_blocking 中调用）
pub fn post_json<T: DeserializeOwned>(url: &str, body: String) -> Result<T> {
    trace!("POST {} ({} bytes)", url, body.len());
    let resp = get_agent()
        .post(url)
        .header("User-Agent", user_agent().as_str())
        .header("Content-Type", "text/plain; charset=utf-8")
        .send(body)
        .map_err(|e| {
            warn!("HTTP POST \"{}\" failed: {}", url, e);
            SalatError::from(e)
        })?;

    resp.into_body().read_json::<T>().map_err(|e| {
        warn!("Response from \"{}\" parse failed: {}", url, e);
        SalatError::serialization(format!("Invalid response from upstream: {}", e))
    })
}

/// 在阻塞线程池中执行同步 HTTP 调用
pub async fn run_blocking<T, F>(label: &'static str, f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f).await.unwrap_or_else(|e| {
        warn!("{} spawn_blocking failed: {}", label, e);
        Err(SalatError::upstream(format!("{} request task failed", label)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_url_encodes_params() {
        let url = build_url(
            "https://api.aladhan.com/v1/",
            "/timingsByCity",
            &[("city", "New York".to_string()), ("method", "2".to_string())],
        )
        .unwrap();
        assert_eq!(
            url,
            "https://api.aladhan.com/v1/timingsByCity?city=New+York&method=2"
        );
    }

    #[test]
    fn test_build_url_rejects_garbage_base() {
        let err = build_url("not a url", "x", &[]).unwrap_err();
        assert!(matches!(err, SalatError::Config(_)));
    }

    #[tokio::test]
    async fn test_run_blocking_passes_result_through() {
        let ok = run_blocking("test", || Ok(7)).await.unwrap();
        assert_eq!(ok, 7);

        let err = run_blocking::<(), _>("test", || Err(SalatError::timeout("slow")))
            .await
            .unwrap_err();
        assert!(matches!(err, SalatError::Timeout(_)));
    }

    /// 依赖外部网络服务，CI 环境可能失败
    #[test]
    #[ignore]
    fn test_get_json_real_request() {
        let json: serde_json::Value = get_json("https://httpbin.org/json").unwrap();
        assert!(json.is_object());
    }
}
