//! Tax Reform Cost - Multi-year fiscal cost estimation for tax credit reforms
//!
//! This library provides:
//! - Reform and baseline-adjustment policy specifications with composition
//! - Weighted household microdata loading
//! - A tax engine boundary plus a reference credit engine
//! - Paired baseline/reform scenario runs and weighted revenue aggregation
//! - Parallel, ordered, cancellable multi-year cost reports
//! - CSV and console presentation of the results

pub mod error;
pub mod policy;
pub mod records;
pub mod engine;
pub mod scenario;
pub mod estimate;
pub mod output;
pub mod config;

// Re-export commonly used types
pub use error::{CostError, Scenario};
pub use policy::{FilingStatus, PolicySpec};
pub use records::{HouseholdRecord, RecordSet};
pub use engine::{CreditEngine, SimulationResult, TaxEngine};
pub use scenario::ScenarioRunner;
pub use estimate::{CostAggregator, CostReport, EstimateOutcome, YearCost};
pub use config::AnalysisConfig;
