//! Scripted engine for estimator tests

use std::collections::HashMap;
use std::ops::RangeInclusive;

use super::{SimulationResult, TaxEngine};
use crate::error::EngineError;
use crate::policy::PolicySpec;
use crate::records::RecordSet;

/// Returns fixed liabilities per (scenario, year)
///
/// An empty policy is treated as the baseline; anything else as the reform.
/// Years listed in `failing_years` report an engine failure.
#[derive(Debug, Clone, Default)]
pub(crate) struct FixedLiabilityEngine {
    pub baseline: HashMap<i32, Vec<f64>>,
    pub reform: HashMap<i32, Vec<f64>>,
    pub failing_years: Vec<i32>,
    pub years: Option<RangeInclusive<i32>>,
}

pub(crate) struct FixedLaw {
    year: i32,
    is_reform: bool,
}

impl FixedLiabilityEngine {
    /// Same liabilities every year in `years`
    pub fn uniform(years: RangeInclusive<i32>, baseline: Vec<f64>, reform: Vec<f64>) -> Self {
        let mut engine = Self::default();
        for year in years.clone() {
            engine.baseline.insert(year, baseline.clone());
            engine.reform.insert(year, reform.clone());
        }
        engine.years = Some(years);
        engine
    }
}

impl TaxEngine for FixedLiabilityEngine {
    type Law = FixedLaw;

    fn supported_years(&self) -> RangeInclusive<i32> {
        self.years.clone().unwrap_or(i32::MIN..=i32::MAX)
    }

    fn law_for(&self, policy: &PolicySpec, year: i32) -> Result<FixedLaw, EngineError> {
        let supported = self.supported_years();
        if !supported.contains(&year) {
            return Err(EngineError::unsupported_year(year, &supported));
        }
        Ok(FixedLaw {
            year,
            is_reform: !policy.is_empty(),
        })
    }

    fn simulate(&self, law: &FixedLaw, records: &RecordSet) -> Result<SimulationResult, EngineError> {
        if self.failing_years.contains(&law.year) {
            return Err(EngineError::Failure(format!("scripted failure for {}", law.year)));
        }
        let table = if law.is_reform { &self.reform } else { &self.baseline };
        let liabilities = table
            .get(&law.year)
            .cloned()
            .unwrap_or_else(|| vec![0.0; records.len()]);
        Ok(SimulationResult::new(law.year, liabilities, records.weights()))
    }
}
