use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use utoipa::ToSchema;

/// Interval during which a satellite stays at or above the minimum
/// elevation for one observer. `start < end` always holds.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Pass {
    pub satellite: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub max_elevation_deg: f64,
    /// Sample time at which `max_elevation_deg` was seen.
    pub max_elevation_at: DateTime<Utc>,
}

impl Pass {
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

/// Window in which two observers see the same satellite.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct MutualPass {
    pub satellite: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub max_elevation_a_deg: f64,
    pub max_elevation_b_deg: f64,
}

impl MutualPass {
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}
