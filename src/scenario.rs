//! Scenario runner for paired baseline/reform simulations
//!
//! Holds one engine and runs it for any (policy, records, year) triple. The
//! runner keeps no mutable state between calls, so repeated runs with the
//! same inputs return identical results and the same runner can be shared by
//! every worker thread.

use crate::engine::{CreditEngine, SimulationResult, TaxEngine};
use crate::error::EngineError;
use crate::policy::PolicySpec;
use crate::records::RecordSet;

/// Runs single-year simulations against a tax engine
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::new(CreditEngine::default());
///
/// for year in 2025..=2034 {
///     let result = runner.run(&reform, &records, year)?;
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ScenarioRunner<E> {
    engine: E,
}

impl<E: TaxEngine> ScenarioRunner<E> {
    pub fn new(engine: E) -> Self {
        Self { engine }
    }

    /// Simulate `records` for `year` under current law plus `policy`
    ///
    /// An empty `policy` means pure current law. The returned liabilities and
    /// weights are aligned with `records`.
    pub fn run(&self, policy: &PolicySpec, records: &RecordSet, year: i32) -> Result<SimulationResult, EngineError> {
        let law = self.engine.law_for(policy, year)?;
        let result = self.engine.simulate(&law, records)?;

        if result.len() != records.len() {
            return Err(EngineError::Failure(format!(
                "engine returned {} liabilities for {} records in {}",
                result.len(),
                records.len(),
                year
            )));
        }

        log::debug!(
            "simulated {} records for {} ({} policy parameters)",
            records.len(),
            year,
            policy.parameter_names().count()
        );
        Ok(result)
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }
}

impl Default for ScenarioRunner<CreditEngine> {
    fn default() -> Self {
        Self::new(CreditEngine::default())
    }
}
