use chrono::{DateTime, Duration, Utc};

use crate::geo::{LookAngleSource, Observer};
use crate::predict::types::Pass;

const COARSE_STEP_SECONDS: i64 = 60;
const FINE_STEP_SECONDS: i64 = 1;

/// Scan parameters for pass prediction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PassSearch {
    /// Sampling step of the scan. Cost grows linearly with window / step.
    pub step: Duration,
    /// Bisect pass start and end down to one second between coarse samples.
    pub refine: bool,
}

impl Default for PassSearch {
    fn default() -> Self {
        Self {
            step: Duration::seconds(COARSE_STEP_SECONDS),
            refine: false,
        }
    }
}

struct OpenPass {
    start: DateTime<Utc>,
    max_elevation_deg: f64,
    max_elevation_at: DateTime<Utc>,
}

impl OpenPass {
    fn observe(&mut self, elevation_deg: f64, at: DateTime<Utc>) {
        if elevation_deg > self.max_elevation_deg {
            self.max_elevation_deg = elevation_deg;
            self.max_elevation_at = at;
        }
    }

    fn close(self, satellite: &str, end: DateTime<Utc>) -> Pass {
        Pass {
            satellite: satellite.to_string(),
            start: self.start,
            end,
            max_elevation_deg: self.max_elevation_deg,
            max_elevation_at: self.max_elevation_at,
        }
    }
}

/// Find all passes for a satellite within `[start, end)` with the default
/// one-minute scan.
pub fn predict_passes<S: LookAngleSource + ?Sized>(
    source: &S,
    satellite: &str,
    observer: &Observer,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    min_elevation: f64,
) -> Vec<Pass> {
    PassSearch::default().predict(source, satellite, observer, start, end, min_elevation)
}

impl PassSearch {
    /// Samples at `start`, `start + step`, ... strictly before `end`. A
    /// sample at or above `min_elevation` is inside a pass; a sample that
    /// cannot be propagated counts as below it. A pass still open when the
    /// scan runs out is cut off at `end`.
    pub fn predict<S: LookAngleSource + ?Sized>(
        &self,
        source: &S,
        satellite: &str,
        observer: &Observer,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        min_elevation: f64,
    ) -> Vec<Pass> {
        if self.step <= Duration::zero() {
            log::warn!("{}: refusing pass search with step {}", satellite, self.step);
            return Vec::new();
        }

        let mut passes = Vec::new();
        let mut open: Option<OpenPass> = None;
        let mut previous: Option<DateTime<Utc>> = None;
        let mut cursor = start;

        while cursor < end {
            let above = source
                .look_angles(observer, cursor)
                .map(|angles| angles.elevation_deg)
                .filter(|elevation| *elevation >= min_elevation);

            match (above, open.as_mut()) {
                (Some(elevation), Some(pass)) => pass.observe(elevation, cursor),
                (Some(elevation), None) => {
                    let pass_start = match previous {
                        Some(before) if self.refine => refine_crossing(
                            source,
                            observer,
                            min_elevation,
                            before,
                            cursor,
                            true,
                        ),
                        _ => cursor,
                    };
                    open = Some(OpenPass {
                        start: pass_start,
                        max_elevation_deg: elevation,
                        max_elevation_at: cursor,
                    });
                }
                (None, Some(_)) => {
                    let pass_end = match previous {
                        Some(before) if self.refine => refine_crossing(
                            source,
                            observer,
                            min_elevation,
                            before,
                            cursor,
                            false,
                        ),
                        _ => cursor,
                    };
                    if let Some(pass) = open.take() {
                        passes.push(pass.close(satellite, pass_end));
                    }
                }
                (None, None) => {}
            }

            previous = Some(cursor);
            cursor = match cursor.checked_add_signed(self.step) {
                Some(next) => next,
                None => break,
            };
        }

        // Handle pass in progress at end of window
        if let Some(pass) = open.take() {
            passes.push(pass.close(satellite, end));
        }

        log::debug!(
            "{}: {} passes between {} and {}",
            satellite,
            passes.len(),
            start,
            end
        );
        passes
    }
}

/// Binary search for the horizon crossing between a sample on one side of
/// `min_elevation` and a sample on the other. Returns the first instant
/// (to one second) on the `after` side.
fn refine_crossing<S: LookAngleSource + ?Sized>(
    source: &S,
    observer: &Observer,
    min_elevation: f64,
    before: DateTime<Utc>,
    after: DateTime<Utc>,
    rising: bool,
) -> DateTime<Utc> {
    let mut low = before;
    let mut high = after;

    while (high - low).num_seconds() > FINE_STEP_SECONDS {
        let mid = low + (high - low) / 2;
        let above = source
            .look_angles(observer, mid)
            .is_some_and(|angles| angles.elevation_deg >= min_elevation);

        if above == rising {
            high = mid;
        } else {
            low = mid;
        }
    }

    high
}
