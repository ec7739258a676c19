//! Weighted household microdata

mod data;
pub mod loader;

pub use data::{HouseholdRecord, RecordSet};
pub use loader::{construct_population, load_records, load_records_from_reader, DEFAULT_RECORDS_PATH};
