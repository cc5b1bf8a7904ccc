use std::sync::Arc;

use tokio::sync::Mutex;

use crate::geo::Observer;
use crate::predict::test_support::{iss, iss_epoch};
use crate::predict::ElementCatalog;
use crate::tracker::{ManualClock, SessionSettings, TrackingSession};
use crate::web::AppState;

/// ISS-only catalog, London observer, clock pinned to the ISS epoch.
pub fn app_state() -> AppState {
    let mut catalog = ElementCatalog::new();
    catalog.insert(iss());
    let observer = Observer::new(51.5, -0.13, 0.0).unwrap();
    let session = TrackingSession::new(catalog, observer, SessionSettings::default());
    AppState::new(
        Arc::new(Mutex::new(session)),
        Arc::new(ManualClock::new(iss_epoch())),
    )
}
