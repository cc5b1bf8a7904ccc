pub mod error;
pub mod geo;
pub mod predict;
pub mod tracking;

#[cfg(test)]
pub(crate) mod test_support;
