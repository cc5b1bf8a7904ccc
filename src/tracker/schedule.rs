//! Timer primitives for the tracking session. Nothing here sleeps: timers
//! are polled with the current time, so the same session can be driven by
//! the wall clock or by a test clock.

use chrono::{DateTime, Duration, Utc};
use std::sync::{Arc, Mutex};

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Fixed-period timer. A restarted timer is due immediately; after firing
/// it is due again one period later. Missed periods are skipped rather than
/// replayed.
#[derive(Debug, Clone)]
pub struct IntervalTimer {
    period: Duration,
    next_due: Option<DateTime<Utc>>,
}

impl IntervalTimer {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            next_due: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_running(&self) -> bool {
        self.next_due.is_some()
    }

    pub fn next_due(&self) -> Option<DateTime<Utc>> {
        self.next_due
    }

    pub fn restart(&mut self, now: DateTime<Utc>) {
        self.next_due = Some(now);
    }

    pub fn cancel(&mut self) {
        self.next_due = None;
    }

    /// Returns true (and schedules the next firing) when the timer is due.
    pub fn poll(&mut self, now: DateTime<Utc>) -> bool {
        match self.next_due {
            Some(due) if due <= now => {
                let next = due + self.period;
                self.next_due = Some(if next <= now { now + self.period } else { next });
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t0() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-06-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn idle_timer_never_fires() {
        let mut timer = IntervalTimer::new(Duration::seconds(5));
        assert!(!timer.is_running());
        assert!(!timer.poll(t0()));
    }

    #[test]
    fn fires_immediately_then_every_period() {
        let mut timer = IntervalTimer::new(Duration::seconds(5));
        timer.restart(t0());

        assert!(timer.poll(t0()));
        assert!(!timer.poll(t0() + Duration::seconds(4)));
        assert!(timer.poll(t0() + Duration::seconds(5)));
        assert_eq!(timer.next_due(), Some(t0() + Duration::seconds(10)));
    }

    #[test]
    fn late_poll_skips_missed_periods() {
        let mut timer = IntervalTimer::new(Duration::seconds(5));
        timer.restart(t0());
        assert!(timer.poll(t0()));

        let late = t0() + Duration::seconds(23);
        assert!(timer.poll(late));
        assert!(!timer.poll(late + Duration::seconds(1)));
        assert_eq!(timer.next_due(), Some(late + Duration::seconds(5)));
    }

    #[test]
    fn cancel_and_restart() {
        let mut timer = IntervalTimer::new(Duration::seconds(60));
        timer.restart(t0());
        timer.cancel();
        assert!(!timer.poll(t0() + Duration::hours(1)));

        timer.restart(t0() + Duration::seconds(30));
        assert!(timer.poll(t0() + Duration::seconds(30)));
    }

    #[test]
    fn manual_clock_moves_on_request() {
        let clock = ManualClock::new(t0());
        assert_eq!(clock.now(), t0());
        clock.advance(Duration::seconds(90));
        assert_eq!(clock.now(), t0() + Duration::seconds(90));
        clock.set(t0());
        assert_eq!(clock.now(), t0());
    }
}
