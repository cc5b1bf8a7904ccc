use chrono::{DateTime, Utc};

use super::observer::Observer;
use super::types::{GeodeticPosition, LookAngles};
use crate::predict::{sidereal_time, OrbitalElementSet};

/// Mean Earth radius used for sub-points and footprint geometry.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Anything that can be pointed at from the ground at a given instant.
pub trait LookAngleSource {
    fn look_angles(&self, observer: &Observer, timestamp: DateTime<Utc>) -> Option<LookAngles>;
}

impl LookAngleSource for OrbitalElementSet {
    fn look_angles(&self, observer: &Observer, timestamp: DateTime<Utc>) -> Option<LookAngles> {
        look_angles_at(observer, self, timestamp)
    }
}

/// Sub-satellite point and height, or `None` while the satellite cannot be
/// propagated.
pub fn position_at(
    elements: &OrbitalElementSet,
    timestamp: DateTime<Utc>,
) -> Option<GeodeticPosition> {
    let state = match elements.propagate(timestamp) {
        Ok(state) => state,
        Err(e) => {
            log::debug!("{}: no position at {}: {}", elements.name(), timestamp, e);
            return None;
        }
    };
    let ecef = teme_to_ecef(state.position_km, sidereal_time(timestamp));
    ecef_to_geodetic(ecef)
}

pub fn look_angles_at(
    observer: &Observer,
    elements: &OrbitalElementSet,
    timestamp: DateTime<Utc>,
) -> Option<LookAngles> {
    let state = match elements.propagate(timestamp) {
        Ok(state) => state,
        Err(e) => {
            log::debug!("{}: no look angles at {}: {}", elements.name(), timestamp, e);
            return None;
        }
    };
    let ecef = teme_to_ecef(state.position_km, sidereal_time(timestamp));
    look_angles_from_ecef(observer, ecef)
}

pub fn look_angles_from_ecef(observer: &Observer, sat_ecef: [f64; 3]) -> Option<LookAngles> {
    let sta_ecef = observer.position_ecef_km();
    let dr = [
        sat_ecef[0] - sta_ecef[0],
        sat_ecef[1] - sta_ecef[1],
        sat_ecef[2] - sta_ecef[2],
    ];
    let range_km = (dr[0] * dr[0] + dr[1] * dr[1] + dr[2] * dr[2]).sqrt();
    if !range_km.is_finite() || range_km <= 0.0 {
        return None;
    }

    let (east, north, up) = ecef_to_enu(dr, observer.lat_rad(), observer.lon_rad());
    let azimuth_deg = normalize_azimuth(east.atan2(north).to_degrees());
    let elevation_deg = (up / range_km).clamp(-1.0, 1.0).asin().to_degrees();

    Some(LookAngles {
        azimuth_deg,
        elevation_deg,
        range_km,
    })
}

/// Rotates a TEME vector into the Earth-fixed frame by the sidereal angle.
pub fn teme_to_ecef(pos_teme: [f64; 3], gmst: f64) -> [f64; 3] {
    let cos_gmst = gmst.cos();
    let sin_gmst = gmst.sin();
    [
        pos_teme[0] * cos_gmst + pos_teme[1] * sin_gmst,
        -pos_teme[0] * sin_gmst + pos_teme[1] * cos_gmst,
        pos_teme[2],
    ]
}

/// Spherical-Earth latitude, longitude and height above `EARTH_RADIUS_KM`.
pub fn ecef_to_geodetic(ecef: [f64; 3]) -> Option<GeodeticPosition> {
    let [x, y, z] = ecef;
    let r = (x * x + y * y + z * z).sqrt();
    if !r.is_finite() || r == 0.0 {
        return None;
    }
    let latitude = z.atan2((x * x + y * y).sqrt()).to_degrees();
    let longitude = normalize_longitude(y.atan2(x).to_degrees());
    GeodeticPosition::new(latitude, longitude, r - EARTH_RADIUS_KM).ok()
}

pub fn ecef_to_enu(dr: [f64; 3], lat_rad: f64, lon_rad: f64) -> (f64, f64, f64) {
    let sin_lat = lat_rad.sin();
    let cos_lat = lat_rad.cos();
    let sin_lon = lon_rad.sin();
    let cos_lon = lon_rad.cos();

    let east = -sin_lon * dr[0] + cos_lon * dr[1];
    let north = -sin_lat * cos_lon * dr[0] - sin_lat * sin_lon * dr[1] + cos_lat * dr[2];
    let up = cos_lat * cos_lon * dr[0] + cos_lat * sin_lon * dr[1] + sin_lat * dr[2];
    (east, north, up)
}

/// Maps any angle into [0, 360).
pub fn normalize_azimuth(deg: f64) -> f64 {
    let az = (deg + 360.0).rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if az >= 360.0 {
        0.0
    } else {
        az
    }
}

/// Maps any longitude into [-180, 180].
pub fn normalize_longitude(deg: f64) -> f64 {
    (deg + 540.0).rem_euclid(360.0) - 180.0
}
