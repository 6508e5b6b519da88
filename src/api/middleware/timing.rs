//! 请求耗时日志
//!
//! 每个请求完成后记录状态码与耗时；超过阈值的慢请求以 warn 级别输出。
//! 外部数据源都是同步 HTTP 调用，慢请求通常意味着上游响应慢。

use actix_service::{Service, Transform};
use actix_web::{
    Error,
    dev::{ServiceRequest, ServiceResponse},
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::rc::Rc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

const DEFAULT_SLOW_THRESHOLD: Duration = Duration::from_secs(3);

#[derive(Clone)]
pub struct TimingMiddleware {
    slow_threshold: Duration,
}

impl Default for TimingMiddleware {
    fn default() -> Self {
        Self {
            slow_threshold: DEFAULT_SLOW_THRESHOLD,
        }
    }
}

impl TimingMiddleware {
    pub fn with_slow_threshold(slow_threshold: Duration) -> Self {
        Self { slow_threshold }
    }
}

impl<S, B> Transform<S, ServiceRequest> for TimingMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = TimingService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(TimingService {
            service: Rc::new(service),
            slow_threshold: self.slow_threshold,
        }))
    }
}

pub struct TimingService<S> {
    service: Rc<S>,
    slow_threshold: Duration,
}

impl<S, B> Service<ServiceRequest> for TimingService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    actix_service::forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        let slow_threshold = self.slow_threshold;
        let start = Instant::now();

        Box::pin(async move {
            let result = srv.call(req).await;
            let elapsed = start.elapsed();
            let status = match &result {
                Ok(response) => response.status().as_u16(),
                Err(_) => 500,
            };

            if elapsed >= slow_threshold {
                warn!(status, elapsed_ms = elapsed.as_millis() as u64, "Slow request");
            } else {
                debug!(status, elapsed_ms = elapsed.as_millis() as u64, "Request completed");
            }

            result
        })
    }
}
