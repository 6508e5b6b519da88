//! 附近清真寺与路线
//!
//! 清真寺列表和路线各占一个 `FetchSlot`：新的查询会覆盖旧查询，
//! 旧查询的迟到结果被丢弃。

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, warn};

use super::fetch::{FetchSlot, FetchState};
use crate::config::MosqueConfig;
use crate::errors::{Result, SalatError};
use crate::geo::{Coordinates, format_distance};
use crate::providers::{Mosque, MosqueSource, Route, RouteSource, RouteSummary, TravelMode};

pub const MSG_NO_MOSQUES: &str = "No mosques found nearby.";
pub const MSG_MOSQUES_FAILED: &str = "Failed to load mosques nearby.";
pub const MSG_MODE_UNSUPPORTED: &str = "This transport mode is not supported yet.";
pub const MSG_NO_ROUTE: &str = "No route found.";
pub const MSG_ROUTE_FAILED: &str = "Failed to fetch route.";

/// 带距离标注的清真寺（距离只用于展示，不参与排序）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearbyMosque {
    #[serde(flatten)]
    pub mosque: Mosque,
    pub distance_m: f64,
    pub distance_label: String,
}

impl NearbyMosque {
    pub fn annotate(mosque: Mosque, center: &Coordinates) -> Self {
        let distance_m = center.distance_to(&mosque.coordinates);
        Self {
            mosque,
            distance_m,
            distance_label: format_distance(distance_m),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteView {
    #[serde(flatten)]
    pub route: Route,
    pub summary: RouteSummary,
}

impl From<Route> for RouteView {
    fn from(route: Route) -> Self {
        let summary = route.summary();
        Self { route, summary }
    }
}

pub struct MosqueService {
    mosques: Arc<dyn MosqueSource>,
    routes: Arc<dyn RouteSource>,
    radius_m: u32,
    unsupported_delay: Duration,
    nearby: FetchSlot<Vec<NearbyMosque>>,
    route: FetchSlot<RouteView>,
}

impl MosqueService {
    pub fn new(
        config: &MosqueConfig,
        mosques: Arc<dyn MosqueSource>,
        routes: Arc<dyn RouteSource>,
    ) -> Self {
        Self {
            mosques,
            routes,
            radius_m: config.search_radius_m,
            unsupported_delay: Duration::from_millis(config.unsupported_mode_delay_ms),
            nearby: FetchSlot::new("mosques"),
            route: FetchSlot::new("route"),
        }
    }

    pub fn radius_m(&self) -> u32 {
        self.radius_m
    }

    async fn find(&self, center: Coordinates) -> Result<Vec<NearbyMosque>> {
        let found = self.mosques.nearby(center, self.radius_m).await.map_err(|e| {
            warn!("Mosque search around {:?} failed: {}", center, e);
            SalatError::upstream(MSG_MOSQUES_FAILED)
        })?;
        if found.is_empty() {
            return Err(SalatError::no_results(MSG_NO_MOSQUES));
        }
        Ok(found
            .into_iter()
            .map(|m| NearbyMosque::annotate(m, &center))
            .collect())
    }

    /// 搜索附近清真寺
    pub async fn search(&self, center: Coordinates) -> FetchState<Vec<NearbyMosque>> {
        let seq = self.nearby.begin();
        let state = FetchState::from_result(self.find(center).await, MSG_MOSQUES_FAILED);
        self.nearby.finish(seq, state.clone());
        state
    }

    /// 暂不支持（或无法识别）的出行方式：不发起网络请求，短暂延迟后返回
    async fn reject(&self, mode: &str) -> Result<RouteView> {
        pause(self.unsupported_delay).await;
        debug!("Travel mode {} is not supported", mode);
        Err(SalatError::unsupported(MSG_MODE_UNSUPPORTED))
    }

    async fn plan(&self, mode: TravelMode, from: Coordinates, to: Coordinates) -> Result<RouteView> {
        if !mode.is_supported() {
            return self.reject(mode.as_ref()).await;
        }

        match self.routes.route(mode, from, to).await {
            Ok(route) => Ok(RouteView::from(route)),
            Err(SalatError::NoResults(_)) => Err(SalatError::no_results(MSG_NO_ROUTE)),
            Err(e) => {
                warn!("Route lookup ({}) failed: {}", mode, e);
                Err(SalatError::upstream(MSG_ROUTE_FAILED))
            }
        }
    }

    fn settle(&self, seq: u64, result: Result<RouteView>) -> FetchState<RouteView> {
        let state = FetchState::from_result(result, MSG_ROUTE_FAILED);
        self.route.finish(seq, state.clone());
        state
    }

    /// 查询从 `from` 到清真寺的路线
    pub async fn route(
        &self,
        mode: TravelMode,
        from: Coordinates,
        to: Coordinates,
    ) -> FetchState<RouteView> {
        let seq = self.route.begin();
        let result = self.plan(mode, from, to).await;
        self.settle(seq, result)
    }

    /// 按名称查询路线，名称不在已知列表中时按暂不支持处理
    pub async fn route_named(
        &self,
        mode: &str,
        from: Coordinates,
        to: Coordinates,
    ) -> FetchState<RouteView> {
        let seq = self.route.begin();
        let result = match TravelMode::from_str(mode.trim()) {
            Ok(known) => self.plan(known, from, to).await,
            Err(_) => self.reject(mode).await,
        };
        self.settle(seq, result)
    }

    pub fn nearby_state(&self) -> FetchState<Vec<NearbyMosque>> {
        self.nearby.snapshot()
    }

    pub fn route_state(&self) -> FetchState<RouteView> {
        self.route.snapshot()
    }
}

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}
