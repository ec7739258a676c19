//! Reform cost estimation: weighting, single-year estimates, and the
//! multi-year aggregator

mod weighting;
mod estimator;
mod report;
mod horizon;
mod compare;

pub use weighting::{aggregate, aggregate_revenue, BILLION};
pub use estimator::{estimate_year, ReformCostEstimator};
pub use report::{CostReport, EstimateOutcome, PartialReport, ReportBuilder, YearCost};
pub use horizon::{validate_horizon, AggregatorConfig, CancelToken, CostAggregator};
pub use compare::{compare_reforms, NamedReform, ReformComparison};
