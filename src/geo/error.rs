use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum GeoError {
    #[error("invalid coordinates: {0}")]
    InvalidCoordinates(String),
    #[error("invalid locator: {0}")]
    Locator(#[from] LocatorError),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LocatorError {
    #[error("locator must have 4, 6 or 8 characters, got {0}")]
    InvalidLength(usize),
    #[error("invalid character '{character}' at position {position}")]
    InvalidCharacter { character: char, position: usize },
    #[error("unsupported precision {0}, expected 4, 6 or 8")]
    UnsupportedPrecision(usize),
}
