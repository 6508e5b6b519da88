//! 坐标与距离估算
//!
//! 距离只用于给清真寺标注“大约多远”，不参与路线规划或排序。

use serde::{Deserialize, Serialize};

use crate::errors::{Result, SalatError};

/// 平均地球半径（米）
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// 经纬度坐标（度）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// 校验范围：纬度 [-90, 90]，经度 [-180, 180]
    pub fn validated(latitude: f64, longitude: f64) -> Result<Self> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(SalatError::validation(format!(
                "Latitude out of range: {}",
                latitude
            )));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(SalatError::validation(format!(
                "Longitude out of range: {}",
                longitude
            )));
        }
        Ok(Self::new(latitude, longitude))
    }

    pub fn distance_to(&self, other: &Coordinates) -> f64 {
        haversine_distance(self, other)
    }
}

/// 球面大圆距离（米），haversine 公式
pub fn haversine_distance(a: &Coordinates, b: &Coordinates) -> f64 {
    let phi1 = a.latitude.to_radians();
    let phi2 = b.latitude.to_radians();
    let d_phi = (b.latitude - a.latitude).to_radians();
    let d_lambda = (b.longitude - a.longitude).to_radians();

    let h = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_M * c
}

/// 距离展示：不足 1000 米显示米，否则显示两位小数的公里
pub fn format_distance(meters: f64) -> String {
    if meters < 1000.0 {
        format!("{} m", meters.round() as i64)
    } else {
        format!("{:.2} km", meters / 1000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_to_self_is_zero() {
        let p = Coordinates::new(21.422510, 39.826168);
        assert_eq!(haversine_distance(&p, &p), 0.0);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let mecca = Coordinates::new(21.422510, 39.826168);
        let medina = Coordinates::new(24.467, 39.611);
        let ab = haversine_distance(&mecca, &medina);
        let ba = haversine_distance(&medina, &mecca);
        assert!((ab - ba).abs() < 1e-6);
        // 麦加到麦地那约 340 公里
        assert!(ab > 330_000.0 && ab < 350_000.0, "got {}", ab);
    }

    #[test]
    fn test_one_degree_latitude_is_about_111_km() {
        let a = Coordinates::new(10.0, 20.0);
        let b = Coordinates::new(11.0, 20.0);
        let d = haversine_distance(&a, &b);
        assert!((d - 111_000.0).abs() / 111_000.0 < 0.01, "got {}", d);
    }

    #[test]
    fn test_format_distance() {
        assert_eq!(format_distance(0.0), "0 m");
        assert_eq!(format_distance(999.4), "999 m");
        assert_eq!(format_distance(1000.0), "1.00 km");
        assert_eq!(format_distance(2346.0), "2.35 km");
    }

    #[test]
    fn test_validated_rejects_out_of_range() {
        assert!(Coordinates::validated(91.0, 0.0).is_err());
        assert!(Coordinates::validated(0.0, -181.0).is_err());
        assert!(Coordinates::validated(f64::NAN, 0.0).is_err());
        assert!(Coordinates::validated(-33.9, 151.2).is_ok());
    }
}
