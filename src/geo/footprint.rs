//! Visibility circle of a satellite on a spherical Earth.

use serde::Serialize;
use utoipa::ToSchema;

use super::frames::{normalize_longitude, EARTH_RADIUS_KM};
use super::types::{GeodeticPosition, LatLon};

pub const DEFAULT_AZIMUTH_STEP_DEG: f64 = 5.0;

/// Closed ring of ground points from which the satellite is above
/// `min_elevation_deg`. The first vertex is repeated at the end.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Footprint {
    pub center: GeodeticPosition,
    pub min_elevation_deg: f64,
    pub angular_radius_deg: f64,
    pub ring: Vec<LatLon>,
}

/// Earth central angle (radians) from the sub-point to the geometric
/// horizon.
pub fn horizon_angular_radius(height_km: f64) -> f64 {
    (EARTH_RADIUS_KM / (EARTH_RADIUS_KM + height_km)).acos()
}

/// Earth central angle (radians) from the sub-point to where the
/// satellite sits at `min_elevation_deg`, from the law of sines in the
/// Earth centre / observer / satellite triangle.
pub fn coverage_angular_radius(height_km: f64, min_elevation_deg: f64) -> f64 {
    let eps = min_elevation_deg.to_radians();
    let nadir = (EARTH_RADIUS_KM * eps.cos() / (EARTH_RADIUS_KM + height_km)).asin();
    std::f64::consts::FRAC_PI_2 - eps - nadir
}

pub fn footprint(position: &GeodeticPosition, min_elevation_deg: f64) -> Option<Footprint> {
    footprint_with_step(position, min_elevation_deg, DEFAULT_AZIMUTH_STEP_DEG)
}

pub fn footprint_with_step(
    position: &GeodeticPosition,
    min_elevation_deg: f64,
    azimuth_step_deg: f64,
) -> Option<Footprint> {
    let height = position.height_km;
    if !height.is_finite() || height <= 0.0 {
        return None;
    }
    if !min_elevation_deg.is_finite() || !(0.0..90.0).contains(&min_elevation_deg) {
        return None;
    }
    if !azimuth_step_deg.is_finite() || azimuth_step_deg <= 0.0 || azimuth_step_deg > 360.0 {
        return None;
    }

    let horizon = horizon_angular_radius(height);
    let radius = coverage_angular_radius(height, min_elevation_deg);
    if !radius.is_finite() || radius <= 0.0 || radius > horizon + 1e-12 {
        return None;
    }

    let mut ring = Vec::with_capacity((360.0 / azimuth_step_deg).ceil() as usize + 1);
    let mut step = 0;
    loop {
        let azimuth = step as f64 * azimuth_step_deg;
        if azimuth >= 360.0 {
            break;
        }
        ring.push(destination_point(
            position.latitude_deg,
            position.longitude_deg,
            azimuth,
            radius,
        )?);
        step += 1;
    }
    let first = *ring.first()?;
    ring.push(first);

    Some(Footprint {
        center: *position,
        min_elevation_deg,
        angular_radius_deg: radius.to_degrees(),
        ring,
    })
}

/// Point reached by travelling `distance_rad` along a great circle from
/// (`lat_deg`, `lon_deg`) with initial bearing `bearing_deg`.
pub fn destination_point(
    lat_deg: f64,
    lon_deg: f64,
    bearing_deg: f64,
    distance_rad: f64,
) -> Option<LatLon> {
    let lat1 = lat_deg.to_radians();
    let lon1 = lon_deg.to_radians();
    let bearing = bearing_deg.to_radians();
    let (sin_d, cos_d) = distance_rad.sin_cos();

    let sin_lat2 = (lat1.sin() * cos_d + lat1.cos() * sin_d * bearing.cos()).clamp(-1.0, 1.0);
    let lat2 = sin_lat2.asin();
    let lon2 = lon1 + (bearing.sin() * sin_d * lat1.cos()).atan2(cos_d - lat1.sin() * sin_lat2);

    let point = LatLon {
        latitude_deg: lat2.to_degrees(),
        longitude_deg: normalize_longitude(lon2.to_degrees()),
    };
    if point.latitude_deg.is_nan() || point.longitude_deg.is_nan() {
        return None;
    }
    Some(point)
}
