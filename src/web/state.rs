use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::tracker::{Clock, SharedSession};

#[derive(Clone)]
pub struct AppState {
    pub session: SharedSession,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(session: SharedSession, clock: Arc<dyn Clock>) -> Self {
        Self { session, clock }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }
}
