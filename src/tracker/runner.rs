use std::sync::Arc;
use std::time::Duration as StdDuration;

use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use super::error::SessionError;
use super::schedule::Clock;
use super::session::TrackingSession;

pub const DEFAULT_RESOLUTION: StdDuration = StdDuration::from_millis(250);

pub type SharedSession = Arc<Mutex<TrackingSession>>;

#[derive(Debug)]
struct WorkerHandle {
    stop_tx: oneshot::Sender<()>,
    join: JoinHandle<()>,
}

/// Drives a shared session's timers from a background task.
pub struct SessionRunner {
    session: SharedSession,
    clock: Arc<dyn Clock>,
    resolution: StdDuration,
    worker: Option<WorkerHandle>,
}

impl SessionRunner {
    pub fn new(session: SharedSession, clock: Arc<dyn Clock>) -> Self {
        Self {
            session,
            clock,
            resolution: DEFAULT_RESOLUTION,
            worker: None,
        }
    }

    /// How often the clock is checked. Timer periods shorter than this are
    /// effectively rounded up to it.
    pub fn with_resolution(mut self, resolution: StdDuration) -> Self {
        self.resolution = resolution.max(StdDuration::from_millis(1));
        self
    }

    pub fn session(&self) -> SharedSession {
        self.session.clone()
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    pub fn start(&mut self) -> Result<(), SessionError> {
        if self.worker.is_some() {
            return Err(SessionError::AlreadyRunning);
        }

        let session = self.session.clone();
        let clock = self.clock.clone();
        let resolution = self.resolution;
        let (stop_tx, stop_rx) = oneshot::channel();

        let join = tokio::spawn(run_session_loop(session, clock, resolution, stop_rx));
        self.worker = Some(WorkerHandle { stop_tx, join });
        log::debug!("Session runner started ({:?} resolution)", resolution);
        Ok(())
    }

    /// Stops the background task. The session keeps its state.
    pub async fn stop(&mut self) {
        if let Some(worker) = self.worker.take() {
            let _ = worker.stop_tx.send(());
            if let Err(e) = worker.join.await {
                log::warn!("Session runner ended abnormally: {}", e);
            }
            log::debug!("Session runner stopped");
        }
    }
}

async fn run_session_loop(
    session: SharedSession,
    clock: Arc<dyn Clock>,
    resolution: StdDuration,
    mut stop_rx: oneshot::Receiver<()>,
) {
    let mut ticker = interval(resolution);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        let should_stop = tokio::select! {
            _ = ticker.tick() => false,
            _ = &mut stop_rx => true,
        };
        if should_stop {
            return;
        }

        let now = clock.now();
        session.lock().await.tick(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Observer;
    use crate::predict::test_support::{iss, iss_epoch};
    use crate::predict::ElementCatalog;
    use crate::tracker::schedule::ManualClock;
    use crate::tracker::session::SessionSettings;

    fn shared_session() -> SharedSession {
        let mut catalog = ElementCatalog::new();
        catalog.insert(iss());
        let observer = Observer::new(51.5, -0.13, 0.0).unwrap();
        Arc::new(Mutex::new(TrackingSession::new(
            catalog,
            observer,
            SessionSettings::default(),
        )))
    }

    async fn wait_for_tick() {
        tokio::time::sleep(StdDuration::from_millis(100)).await;
    }

    #[tokio::test]
    async fn runner_ticks_session_on_clock_time() {
        let session = shared_session();
        let clock = Arc::new(ManualClock::new(iss_epoch()));
        session.lock().await.select("ISS (ZARYA)", iss_epoch()).unwrap();

        let mut runner = SessionRunner::new(session.clone(), clock.clone())
            .with_resolution(StdDuration::from_millis(10));
        runner.start().unwrap();
        wait_for_tick().await;

        let first = session.lock().await.latest("ISS (ZARYA)").unwrap().timestamp;
        assert_eq!(first, iss_epoch());

        clock.advance(chrono::Duration::seconds(5));
        wait_for_tick().await;
        let second = session.lock().await.latest("ISS (ZARYA)").unwrap().timestamp;
        assert_eq!(second, iss_epoch() + chrono::Duration::seconds(5));

        runner.stop().await;
        assert!(!runner.is_running());
    }

    #[tokio::test]
    async fn second_start_is_rejected() {
        let clock = Arc::new(ManualClock::new(iss_epoch()));
        let mut runner = SessionRunner::new(shared_session(), clock);
        runner.start().unwrap();
        assert_eq!(runner.start(), Err(SessionError::AlreadyRunning));
        runner.stop().await;
        runner.start().unwrap();
        runner.stop().await;
    }

    #[tokio::test]
    async fn stopped_runner_leaves_session_untouched() {
        let session = shared_session();
        let clock = Arc::new(ManualClock::new(iss_epoch()));
        let mut runner = SessionRunner::new(session.clone(), clock.clone())
            .with_resolution(StdDuration::from_millis(10));
        runner.start().unwrap();
        runner.stop().await;

        session.lock().await.select("ISS (ZARYA)", iss_epoch()).unwrap();
        wait_for_tick().await;
        assert!(session.lock().await.latest("ISS (ZARYA)").is_none());
    }
}
