//! Data module - CSV loading and typed records

mod loader;
mod records;

pub use loader::{is_data_row, LoaderError, SampleLoader};
pub use records::{BumpSample, LocationSample, Point};
