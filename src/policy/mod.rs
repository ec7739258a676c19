//! Policy specifications: reforms and baseline adjustments over current law

mod data;
pub mod loader;

pub use data::{FilingStatus, PolicySpec, PolicySpecBuilder, StatusValues, FILING_STATUS_COUNT};
pub use loader::load_policy_spec;
