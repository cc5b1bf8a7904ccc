use chrono::{DateTime, Utc};
use sgp4::{Constants, Elements};

use crate::predict::error::PredictError;

/// TEME position (km) and velocity (km/s) at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EciState {
    pub position_km: [f64; 3],
    pub velocity_km_s: [f64; 3],
}

/// Two-line elements for one satellite together with the initialized
/// propagator. Immutable once parsed; a refresh replaces the whole set.
pub struct OrbitalElementSet {
    name: String,
    elements: Elements,
    constants: Constants,
}

impl std::fmt::Debug for OrbitalElementSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrbitalElementSet")
            .field("name", &self.name)
            .field("norad_id", &self.elements.norad_id)
            .field("epoch", &self.elements.datetime)
            .finish()
    }
}

impl OrbitalElementSet {
    pub fn parse(name: &str, line1: &str, line2: &str) -> Result<Self, PredictError> {
        let name = name.trim();
        let line1 = line1.trim();
        let line2 = line2.trim();
        let invalid = |message: String| PredictError::InvalidElements {
            name: name.to_string(),
            message,
        };

        let elements = Elements::from_tle(
            Some(name.to_string()).filter(|n| !n.is_empty()),
            line1.as_bytes(),
            line2.as_bytes(),
        )
        .map_err(|e| invalid(e.to_string()))?;
        let constants = Constants::from_elements(&elements).map_err(|e| invalid(e.to_string()))?;

        let name = if name.is_empty() {
            format!("NORAD {}", elements.norad_id)
        } else {
            name.to_string()
        };

        Ok(Self {
            name,
            elements,
            constants,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn norad_id(&self) -> u64 {
        self.elements.norad_id
    }

    pub fn epoch(&self) -> DateTime<Utc> {
        self.elements.datetime.and_utc()
    }

    pub fn propagate(&self, timestamp: DateTime<Utc>) -> Result<EciState, PredictError> {
        let minutes = self
            .elements
            .datetime_to_minutes_since_epoch(&timestamp.naive_utc())
            .map_err(|e| PredictError::Propagation(e.to_string()))?;

        let prediction = self
            .constants
            .propagate(minutes)
            .map_err(|e| PredictError::Propagation(e.to_string()))?;

        let finite = prediction
            .position
            .iter()
            .chain(prediction.velocity.iter())
            .all(|v| v.is_finite());
        if !finite {
            return Err(PredictError::Propagation(format!(
                "{}: non-finite state at {}",
                self.name, timestamp
            )));
        }

        Ok(EciState {
            position_km: prediction.position,
            velocity_km_s: prediction.velocity,
        })
    }
}

/// Greenwich mean sidereal time in radians.
pub fn sidereal_time(timestamp: DateTime<Utc>) -> f64 {
    sgp4::iau_epoch_to_sidereal_time(sgp4::julian_years_since_j2000(&timestamp.naive_utc()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predict::test_support::{ISS_LINE1, ISS_LINE2};

    #[test]
    fn parses_iss() {
        let iss = OrbitalElementSet::parse("ISS (ZARYA)", ISS_LINE1, ISS_LINE2).unwrap();
        assert_eq!(iss.name(), "ISS (ZARYA)");
        assert_eq!(iss.norad_id(), 25544);
        assert_eq!(iss.epoch().format("%Y-%m-%d").to_string(), "2008-09-20");
    }

    #[test]
    fn unnamed_set_falls_back_to_catalog_number() {
        let iss = OrbitalElementSet::parse("", ISS_LINE1, ISS_LINE2).unwrap();
        assert_eq!(iss.name(), "NORAD 25544");
    }

    #[test]
    fn non_numeric_line_two_is_invalid() {
        let bad = "2 25544  5X.6416 247.4627 0006703 130.5360 325.0288 15.72125391563537";
        let err = OrbitalElementSet::parse("BROKEN", ISS_LINE1, bad).unwrap_err();
        assert!(matches!(err, PredictError::InvalidElements { ref name, .. } if name == "BROKEN"));
    }

    #[test]
    fn propagates_near_epoch() {
        let iss = OrbitalElementSet::parse("ISS", ISS_LINE1, ISS_LINE2).unwrap();
        let state = iss.propagate(iss.epoch()).unwrap();
        let r = state.position_km.iter().map(|v| v * v).sum::<f64>().sqrt();
        assert!(r > 6600.0 && r < 6900.0);
    }
}
