use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::geo::{Footprint, GeodeticPosition, LookAngles};

/// One satellite at one position tick. Any part may be missing while the
/// satellite cannot be propagated or has no footprint.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct TrackedSatellite {
    pub satellite: String,
    pub timestamp: DateTime<Utc>,
    pub position: Option<GeodeticPosition>,
    pub look_angles: Option<LookAngles>,
    pub footprint: Option<Footprint>,
}

impl TrackedSatellite {
    pub fn is_visible(&self) -> bool {
        self.look_angles.as_ref().is_some_and(LookAngles::is_visible)
    }
}
