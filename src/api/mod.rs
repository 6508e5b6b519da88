//! HTTP API
//!
//! - `middleware`: 请求 ID 与耗时日志
//! - `services`: 各端点 handler、统一响应信封与路由注册

pub mod middleware;
pub mod services;
