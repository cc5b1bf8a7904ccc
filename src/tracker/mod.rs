mod error;
mod listener;
mod runner;
mod sample;
pub mod schedule;
mod session;

pub use error::SessionError;
pub use listener::{LogListener, NullListener, SessionListener};
pub use runner::{SessionRunner, SharedSession, DEFAULT_RESOLUTION};
pub use sample::TrackedSatellite;
pub use schedule::{Clock, IntervalTimer, ManualClock, SystemClock};
pub use session::{SessionSettings, SessionSnapshot, SessionState, TickOutcome, TrackingSession};
