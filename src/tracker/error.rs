use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("satellite not in catalog: {0}")]
    UnknownSatellite(String),
    #[error("session runner already running")]
    AlreadyRunning,
}
