mod catalog;
mod elements;
mod error;
mod mutual;
mod pass_finder;
mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use catalog::{ElementCatalog, IngestReport};
pub use elements::{sidereal_time, EciState, OrbitalElementSet};
pub use error::PredictError;
pub use mutual::{mutual_passes, predict_mutual_passes};
pub use pass_finder::{predict_passes, PassSearch};
pub use types::{MutualPass, Pass};
