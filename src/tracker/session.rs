use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::geo::{footprint, lat_lon_to_locator, look_angles_at, position_at, Observer};
use crate::predict::{ElementCatalog, Pass, PassSearch};
use crate::tracker::error::SessionError;
use crate::tracker::listener::{NullListener, SessionListener};
use crate::tracker::sample::TrackedSatellite;
use crate::tracker::schedule::IntervalTimer;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionSettings {
    pub position_interval: Duration,
    pub pass_interval: Duration,
    pub prediction_window: Duration,
    pub pass_search: PassSearch,
    pub min_elevation_deg: f64,
    pub footprint_step_deg: f64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            position_interval: Duration::seconds(5),
            pass_interval: Duration::seconds(60),
            prediction_window: Duration::hours(24),
            pass_search: PassSearch::default(),
            min_elevation_deg: 0.0,
            footprint_step_deg: footprint::DEFAULT_AZIMUTH_STEP_DEG,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    Active { since: DateTime<Utc> },
}

/// What a single `tick` recomputed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickOutcome {
    pub positions: bool,
    pub passes: bool,
}

#[derive(Debug, Default)]
struct TrackingData {
    latest: Option<TrackedSatellite>,
    passes: Vec<Pass>,
    visible: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub observer: Observer,
    /// Six-character Maidenhead square of the observer.
    pub observer_locator: Option<String>,
    pub selection: Vec<String>,
    pub satellites: Vec<TrackedSatellite>,
    pub passes: Vec<Pass>,
}

/// Live tracking of the selected satellites for one observer.
///
/// `Idle` until something is selected; selecting, deselecting or replacing
/// the selection restarts both timers; an empty selection or `stop` goes
/// back to `Idle`. Results are replaced wholesale on every firing.
pub struct TrackingSession {
    catalog: ElementCatalog,
    observer: Observer,
    settings: SessionSettings,
    selection: Vec<String>,
    tracked: BTreeMap<String, TrackingData>,
    state: SessionState,
    position_timer: IntervalTimer,
    pass_timer: IntervalTimer,
    listener: Box<dyn SessionListener>,
}

impl TrackingSession {
    pub fn new(catalog: ElementCatalog, observer: Observer, settings: SessionSettings) -> Self {
        Self {
            catalog,
            observer,
            settings,
            selection: Vec::new(),
            tracked: BTreeMap::new(),
            state: SessionState::Idle,
            position_timer: IntervalTimer::new(settings.position_interval),
            pass_timer: IntervalTimer::new(settings.pass_interval),
            listener: Box::new(NullListener),
        }
    }

    pub fn with_listener(mut self, listener: impl SessionListener + 'static) -> Self {
        self.listener = Box::new(listener);
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, SessionState::Active { .. })
    }

    pub fn observer(&self) -> &Observer {
        &self.observer
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn catalog(&self) -> &ElementCatalog {
        &self.catalog
    }

    pub fn selection(&self) -> &[String] {
        &self.selection
    }

    pub fn latest(&self, satellite: &str) -> Option<&TrackedSatellite> {
        self.tracked.get(satellite).and_then(|d| d.latest.as_ref())
    }

    pub fn passes(&self, satellite: &str) -> &[Pass] {
        self.tracked
            .get(satellite)
            .map(|d| d.passes.as_slice())
            .unwrap_or(&[])
    }

    /// Earliest instant at which a timer is due, if any is running.
    pub fn next_due(&self) -> Option<DateTime<Utc>> {
        match (self.position_timer.next_due(), self.pass_timer.next_due()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Takes effect on the next timer firing.
    pub fn set_observer(&mut self, observer: Observer) {
        log::info!(
            "Observer moved to {:.4}, {:.4}",
            observer.latitude_deg,
            observer.longitude_deg
        );
        self.observer = observer;
    }

    /// Swaps in refreshed elements. Selected satellites missing from the new
    /// catalog stay selected but report no position.
    pub fn replace_catalog(&mut self, catalog: ElementCatalog) {
        for name in &self.selection {
            if !catalog.contains(name) {
                log::warn!("{} is selected but missing from the new catalog", name);
            }
        }
        self.catalog = catalog;
    }

    pub fn select(&mut self, satellite: &str, now: DateTime<Utc>) -> Result<(), SessionError> {
        if !self.catalog.contains(satellite) {
            return Err(SessionError::UnknownSatellite(satellite.to_string()));
        }
        if self.selection.iter().any(|s| s == satellite) {
            return Ok(());
        }
        self.selection.push(satellite.to_string());
        self.selection_changed(now);
        Ok(())
    }

    /// Returns false if the satellite was not selected.
    pub fn deselect(&mut self, satellite: &str, now: DateTime<Utc>) -> bool {
        let before = self.selection.len();
        self.selection.retain(|s| s != satellite);
        if self.selection.len() == before {
            return false;
        }
        self.tracked.remove(satellite);
        self.selection_changed(now);
        true
    }

    /// Replaces the whole selection. Fails without changing anything if any
    /// name is unknown.
    pub fn set_selection<S: AsRef<str>>(
        &mut self,
        satellites: &[S],
        now: DateTime<Utc>,
    ) -> Result<(), SessionError> {
        let mut selection: Vec<String> = Vec::with_capacity(satellites.len());
        for name in satellites.iter().map(AsRef::as_ref) {
            if !self.catalog.contains(name) {
                return Err(SessionError::UnknownSatellite(name.to_string()));
            }
            if !selection.iter().any(|s| s == name) {
                selection.push(name.to_string());
            }
        }

        self.tracked.retain(|name, _| selection.contains(name));
        self.selection = selection;
        self.selection_changed(now);
        Ok(())
    }

    /// Starts tracking the current selection. With nothing selected the
    /// session stays idle.
    pub fn start(&mut self, now: DateTime<Utc>) {
        if self.selection.is_empty() {
            log::info!("Nothing selected, tracking stays idle");
            return;
        }
        self.selection_changed(now);
    }

    pub fn stop(&mut self) {
        self.go_idle();
    }

    /// Runs whichever timers are due at `now`.
    pub fn tick(&mut self, now: DateTime<Utc>) -> TickOutcome {
        let mut outcome = TickOutcome::default();
        if !self.is_active() {
            return outcome;
        }

        if self.position_timer.poll(now) {
            self.refresh_positions(now);
            outcome.positions = true;
        }
        if self.pass_timer.poll(now) {
            self.refresh_passes(now);
            outcome.passes = true;
        }
        outcome
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let mut passes: Vec<Pass> = self
            .selection
            .iter()
            .flat_map(|name| self.passes(name).iter().cloned())
            .collect();
        passes.sort_by_key(|p| p.start);

        SessionSnapshot {
            state: self.state,
            observer: self.observer,
            observer_locator: lat_lon_to_locator(
                self.observer.latitude_deg,
                self.observer.longitude_deg,
                6,
            )
            .ok(),
            selection: self.selection.clone(),
            satellites: self
                .selection
                .iter()
                .filter_map(|name| self.latest(name).cloned())
                .collect(),
            passes,
        }
    }

    fn selection_changed(&mut self, now: DateTime<Utc>) {
        if self.selection.is_empty() {
            self.go_idle();
            return;
        }

        self.position_timer.restart(now);
        self.pass_timer.restart(now);
        if !self.is_active() {
            log::info!("Tracking started: {}", self.selection.join(", "));
            self.state = SessionState::Active { since: now };
        } else {
            log::debug!("Selection changed: {}", self.selection.join(", "));
        }
    }

    fn go_idle(&mut self) {
        self.position_timer.cancel();
        self.pass_timer.cancel();
        self.tracked.clear();
        if self.is_active() {
            log::info!("Tracking stopped");
        }
        self.state = SessionState::Idle;
    }

    fn refresh_positions(&mut self, now: DateTime<Utc>) {
        let mut samples = Vec::with_capacity(self.selection.len());

        for name in &self.selection {
            let sample = match self.catalog.get(name) {
                Some(elements) => {
                    let position = position_at(&elements, now);
                    TrackedSatellite {
                        satellite: name.clone(),
                        timestamp: now,
                        position,
                        look_angles: look_angles_at(&self.observer, &elements, now),
                        footprint: position.as_ref().and_then(|p| {
                            footprint::footprint_with_step(
                                p,
                                self.settings.min_elevation_deg,
                                self.settings.footprint_step_deg,
                            )
                        }),
                    }
                }
                None => TrackedSatellite {
                    satellite: name.clone(),
                    timestamp: now,
                    position: None,
                    look_angles: None,
                    footprint: None,
                },
            };

            let data = self.tracked.entry(name.clone()).or_default();
            let visible = sample.is_visible();
            if visible != data.visible {
                data.visible = visible;
                self.listener.on_visibility_change(name, visible, now);
            }
            data.latest = Some(sample.clone());
            samples.push(sample);
        }

        self.listener.on_positions(now, &samples);
    }

    fn refresh_passes(&mut self, now: DateTime<Utc>) {
        let end = now
            .checked_add_signed(self.settings.prediction_window)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        for name in &self.selection {
            let passes = match self.catalog.get(name) {
                Some(elements) => self.settings.pass_search.predict(
                    elements.as_ref(),
                    name,
                    &self.observer,
                    now,
                    end,
                    self.settings.min_elevation_deg,
                ),
                None => Vec::new(),
            };

            self.listener.on_passes(name, &passes);
            self.tracked.entry(name.clone()).or_default().passes = passes;
        }
    }
}
