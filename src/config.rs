use chrono::Duration;
use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::geo::{footprint::DEFAULT_AZIMUTH_STEP_DEG, GeoError, Observer};
use crate::predict::PassSearch;
use crate::tracker::SessionSettings;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl From<GeoError> for ConfigError {
    fn from(e: GeoError) -> Self {
        ConfigError::Invalid(format!("station: {}", e))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub station: StationConfig,
    pub elements: ElementsConfig,
    #[serde(default)]
    pub tracking: TrackingConfig,
    #[serde(default)]
    pub web: WebConfig,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StationConfig {
    pub name: Option<String>,
    /// `"lat,lon"` in decimal degrees. Takes precedence over `locator`.
    pub coordinates: Option<String>,
    pub locator: Option<String>,
    #[serde(default)]
    pub altitude_m: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ElementsConfig {
    pub folder: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    pub selected: Vec<String>,
    #[serde(deserialize_with = "deserialize_duration")]
    pub position_interval: Duration,
    #[serde(deserialize_with = "deserialize_duration")]
    pub pass_interval: Duration,
    #[serde(deserialize_with = "deserialize_duration")]
    pub prediction_window: Duration,
    #[serde(deserialize_with = "deserialize_duration")]
    pub pass_step: Duration,
    pub refine_passes: bool,
    pub min_elevation_deg: f64,
    pub footprint_step_deg: f64,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        let settings = SessionSettings::default();
        Self {
            selected: Vec::new(),
            position_interval: settings.position_interval,
            pass_interval: settings.pass_interval,
            prediction_window: settings.prediction_window,
            pass_step: settings.pass_search.step,
            refine_passes: settings.pass_search.refine,
            min_elevation_deg: settings.min_elevation_deg,
            footprint_step_deg: DEFAULT_AZIMUTH_STEP_DEG,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_duration(&s).map_err(serde::de::Error::custom)
}

pub fn parse_duration(s: &str) -> Result<Duration, String> {
    humantime::parse_duration(s.trim())
        .map_err(|e| e.to_string())
        .and_then(|d| Duration::from_std(d).map_err(|e| e.to_string()))
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.tracking;
        for (name, value) in [
            ("position_interval", t.position_interval),
            ("pass_interval", t.pass_interval),
            ("prediction_window", t.prediction_window),
            ("pass_step", t.pass_step),
        ] {
            if value <= Duration::zero() {
                return Err(ConfigError::Invalid(format!("tracking.{} must be positive", name)));
            }
        }
        if !(0.0..90.0).contains(&t.min_elevation_deg) {
            return Err(ConfigError::Invalid(format!(
                "tracking.min_elevation_deg {} outside [0, 90)",
                t.min_elevation_deg
            )));
        }
        if !(t.footprint_step_deg > 0.0 && t.footprint_step_deg <= 360.0) {
            return Err(ConfigError::Invalid(format!(
                "tracking.footprint_step_deg {} outside (0, 360]",
                t.footprint_step_deg
            )));
        }
        self.observer()?;
        Ok(())
    }

    pub fn observer(&self) -> Result<Observer, ConfigError> {
        let station = &self.station;
        let altitude = Some(station.altitude_m);
        match (&station.coordinates, &station.locator) {
            (Some(coordinates), _) => Ok(Observer::from_coordinates(coordinates, altitude)?),
            (None, Some(locator)) => Ok(Observer::from_locator(locator, altitude)?),
            (None, None) => Err(ConfigError::Invalid(
                "station needs coordinates or a locator".to_string(),
            )),
        }
    }

    pub fn session_settings(&self) -> SessionSettings {
        let t = &self.tracking;
        SessionSettings {
            position_interval: t.position_interval,
            pass_interval: t.pass_interval,
            prediction_window: t.prediction_window,
            pass_search: PassSearch {
                step: t.pass_step,
                refine: t.refine_passes,
            },
            min_elevation_deg: t.min_elevation_deg,
            footprint_step_deg: t.footprint_step_deg,
        }
    }
}
