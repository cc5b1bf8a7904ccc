mod error;
pub mod footprint;
pub mod frames;
pub mod locator;
mod observer;
mod types;

pub use error::{GeoError, LocatorError};
pub use footprint::{footprint, footprint_with_step, Footprint};
pub use frames::{look_angles_at, position_at, LookAngleSource, EARTH_RADIUS_KM};
pub use locator::{lat_lon_to_locator, locator_to_lat_lon};
pub use observer::Observer;
pub use types::{GeodeticPosition, LatLon, LookAngles};
