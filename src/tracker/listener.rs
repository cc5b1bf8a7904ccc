use chrono::{DateTime, Utc};

use crate::predict::Pass;
use crate::tracker::sample::TrackedSatellite;

/// Receives tracking results: the map renderer and the notifier.
pub trait SessionListener: Send {
    fn on_positions(&mut self, _at: DateTime<Utc>, _satellites: &[TrackedSatellite]) {}

    fn on_passes(&mut self, _satellite: &str, _passes: &[Pass]) {}

    /// Called when a satellite crosses the horizon (elevation > 0).
    fn on_visibility_change(&mut self, _satellite: &str, _visible: bool, _at: DateTime<Utc>) {}
}

#[derive(Debug, Default)]
pub struct NullListener;

impl SessionListener for NullListener {}

/// Writes tracking results to the log.
#[derive(Debug, Default)]
pub struct LogListener;

impl SessionListener for LogListener {
    fn on_positions(&mut self, at: DateTime<Utc>, satellites: &[TrackedSatellite]) {
        for sat in satellites {
            match (&sat.position, &sat.look_angles) {
                (Some(pos), Some(look)) => log::info!(
                    "{} {}: lat {:.2} lon {:.2} alt {:.0} km | az {:.1} el {:.1} range {:.0} km",
                    at.format("%H:%M:%S"),
                    sat.satellite,
                    pos.latitude_deg,
                    pos.longitude_deg,
                    pos.height_km,
                    look.azimuth_deg,
                    look.elevation_deg,
                    look.range_km
                ),
                _ => log::warn!("{}: no position at {}", sat.satellite, at),
            }
        }
    }

    fn on_passes(&mut self, satellite: &str, passes: &[Pass]) {
        match passes.first() {
            Some(next) => log::info!(
                "{}: {} passes, next {} - {} (max el {:.1})",
                satellite,
                passes.len(),
                next.start.format("%H:%M:%S"),
                next.end.format("%H:%M:%S"),
                next.max_elevation_deg
            ),
            None => log::info!("{}: no passes in window", satellite),
        }
    }

    fn on_visibility_change(&mut self, satellite: &str, visible: bool, at: DateTime<Utc>) {
        if visible {
            log::info!("{} AOS at {}", satellite, at);
        } else {
            log::info!("{} LOS at {}", satellite, at);
        }
    }
}
