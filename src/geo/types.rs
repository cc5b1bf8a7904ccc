use serde::Serialize;
use utoipa::ToSchema;

use super::error::GeoError;

/// Point above a spherical Earth.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct GeodeticPosition {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub height_km: f64,
}

impl GeodeticPosition {
    pub fn new(latitude_deg: f64, longitude_deg: f64, height_km: f64) -> Result<Self, GeoError> {
        if !latitude_deg.is_finite() || !longitude_deg.is_finite() || !height_km.is_finite() {
            return Err(GeoError::InvalidCoordinates(format!(
                "non-finite position ({}, {}, {})",
                latitude_deg, longitude_deg, height_km
            )));
        }
        if !(-90.0..=90.0).contains(&latitude_deg) {
            return Err(GeoError::InvalidCoordinates(format!(
                "latitude {} out of range",
                latitude_deg
            )));
        }
        if !(-180.0..=180.0).contains(&longitude_deg) {
            return Err(GeoError::InvalidCoordinates(format!(
                "longitude {} out of range",
                longitude_deg
            )));
        }
        Ok(Self {
            latitude_deg,
            longitude_deg,
            height_km,
        })
    }
}

/// Direction and distance to a satellite as seen by an observer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct LookAngles {
    /// Degrees clockwise from north, in [0, 360).
    pub azimuth_deg: f64,
    /// Degrees above the horizon; negative means below it.
    pub elevation_deg: f64,
    pub range_km: f64,
}

impl LookAngles {
    /// Strictly above the horizon: a sample sitting exactly on it is not
    /// visible. The pass finder compares with `>=` against its minimum
    /// elevation instead.
    pub fn is_visible(&self) -> bool {
        self.elevation_deg > 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct LatLon {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geodetic_rejects_out_of_range() {
        assert!(GeodeticPosition::new(91.0, 0.0, 400.0).is_err());
        assert!(GeodeticPosition::new(0.0, -180.5, 400.0).is_err());
        assert!(GeodeticPosition::new(f64::NAN, 0.0, 400.0).is_err());
        assert!(GeodeticPosition::new(-90.0, 180.0, 0.0).is_ok());
    }

    #[test]
    fn horizon_sample_is_not_visible() {
        let on_horizon = LookAngles {
            azimuth_deg: 10.0,
            elevation_deg: 0.0,
            range_km: 2000.0,
        };
        assert!(!on_horizon.is_visible());

        let above = LookAngles {
            elevation_deg: 0.01,
            ..on_horizon
        };
        assert!(above.is_visible());
    }
}
