//! Tax-law microsimulation engine boundary
//!
//! The estimator never applies statutory rules itself. It asks an engine for
//! the law in effect for a (policy, year) pair and then for per-record
//! liabilities under that law. Engines take `&self` and an immutable
//! `RecordSet`, so identical inputs must give bit-identical output and one
//! engine can serve many worker threads at once.

mod credit;
#[cfg(test)]
pub(crate) mod testing;

pub use credit::{CreditEngine, CreditEngineConfig, CreditLaw, DEFAULT_CREDIT_PARAMETER};

use std::ops::RangeInclusive;

use crate::error::{EngineError, PolicyError};
use crate::policy::PolicySpec;
use crate::records::RecordSet;

/// A tax-law engine the scenario runner delegates to
pub trait TaxEngine: Send + Sync {
    /// Opaque law-in-effect context for one tax year
    type Law: Send + Sync;

    /// Tax years the engine can simulate
    fn supported_years(&self) -> RangeInclusive<i32>;

    /// Check that `policy` only sets parameters and years this engine knows
    ///
    /// Called once per estimate, before any year is simulated.
    fn validate_policy(&self, _policy: &PolicySpec) -> Result<(), PolicyError> {
        Ok(())
    }

    /// Resolve current law plus `policy` for `year`
    fn law_for(&self, policy: &PolicySpec, year: i32) -> Result<Self::Law, EngineError>;

    /// Compute every record's liability under `law`
    fn simulate(&self, law: &Self::Law, records: &RecordSet) -> Result<SimulationResult, EngineError>;
}

impl<E: TaxEngine + ?Sized> TaxEngine for &E {
    type Law = E::Law;

    fn supported_years(&self) -> RangeInclusive<i32> {
        (**self).supported_years()
    }

    fn validate_policy(&self, policy: &PolicySpec) -> Result<(), PolicyError> {
        (**self).validate_policy(policy)
    }

    fn law_for(&self, policy: &PolicySpec, year: i32) -> Result<Self::Law, EngineError> {
        (**self).law_for(policy, year)
    }

    fn simulate(&self, law: &Self::Law, records: &RecordSet) -> Result<SimulationResult, EngineError> {
        (**self).simulate(law, records)
    }
}

/// Per-record liabilities and weights for one (policy, year) run
///
/// Both vectors are aligned by record index.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResult {
    /// Tax year simulated
    pub year: i32,

    /// Computed liability per record (signed currency amount)
    pub liabilities: Vec<f64>,

    /// Sampling weight per record
    pub weights: Vec<f64>,
}

impl SimulationResult {
    pub fn new(year: i32, liabilities: Vec<f64>, weights: Vec<f64>) -> Self {
        Self {
            year,
            liabilities,
            weights,
        }
    }

    pub fn len(&self) -> usize {
        self.liabilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.liabilities.is_empty()
    }
}
