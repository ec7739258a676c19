//! Side-by-side cost of several reforms over the same horizon

use std::borrow::Borrow;

use serde::{Deserialize, Serialize};

use super::horizon::CostAggregator;
use super::report::CostReport;
use crate::engine::TaxEngine;
use crate::error::CostError;
use crate::policy::PolicySpec;
use crate::records::RecordSet;

/// A labelled reform and the baseline adjustment it is measured against
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedReform {
    pub name: String,
    pub reform: PolicySpec,
    #[serde(default)]
    pub baseline: PolicySpec,
}

impl NamedReform {
    pub fn new(name: impl Into<String>, reform: PolicySpec) -> Self {
        Self {
            name: name.into(),
            reform,
            baseline: PolicySpec::empty(),
        }
    }

    pub fn against(mut self, baseline: PolicySpec) -> Self {
        self.baseline = baseline;
        self
    }
}

/// One cost report per reform, in the order the reforms were given
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReformComparison {
    pub years: Vec<i32>,
    pub reports: Vec<(String, CostReport)>,
}

impl ReformComparison {
    pub fn report(&self, name: &str) -> Option<&CostReport> {
        self.reports.iter().find(|(n, _)| n == name).map(|(_, r)| r)
    }
}

/// Estimate every reform over `years`
///
/// Reforms run one after another; each one parallelizes over years per the
/// aggregator's configuration. The first failing reform aborts the comparison.
pub fn compare_reforms<E, F, R>(
    aggregator: &CostAggregator<E>,
    reforms: &[NamedReform],
    years: &[i32],
    records_factory: F,
) -> Result<ReformComparison, CostError>
where
    E: TaxEngine,
    F: Fn() -> R + Sync,
    R: Borrow<RecordSet>,
{
    let mut reports = Vec::with_capacity(reforms.len());
    for named in reforms {
        log::info!("estimating reform '{}'", named.name);
        let report = aggregator.estimate_against(&named.reform, &named.baseline, years, &records_factory)?;
        reports.push((named.name.clone(), report));
    }

    Ok(ReformComparison {
        years: years.to_vec(),
        reports,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{CreditEngine, DEFAULT_CREDIT_PARAMETER};
    use crate::policy::FilingStatus;
    use crate::records::HouseholdRecord;

    fn records() -> RecordSet {
        RecordSet::new(vec![
            HouseholdRecord::new(1, FilingStatus::Single, 1000.0, 10_000.0, 5_000.0),
            HouseholdRecord::new(2, FilingStatus::MarriedJoint, 400.0, 20_000.0, 5_000.0),
        ])
    }

    #[test]
    fn test_larger_credit_costs_more() {
        let aggregator = CostAggregator::new(CreditEngine::default());
        let small = PolicySpec::with_value(DEFAULT_CREDIT_PARAMETER, [2025], [1000.0, 2000.0, 1000.0, 1000.0, 1000.0])
            .unwrap();
        let large = PolicySpec::with_value(DEFAULT_CREDIT_PARAMETER, [2025], [1700.0, 3400.0, 1700.0, 1700.0, 1700.0])
            .unwrap();
        let reforms = vec![NamedReform::new("large", large), NamedReform::new("small", small)];
        let population = records();

        let comparison = compare_reforms(&aggregator, &reforms, &[2025, 2026, 2027], || &population).unwrap();

        assert_eq!(comparison.reports.len(), 2);
        assert_eq!(comparison.reports[0].0, "large");
        let large_total = comparison.report("large").unwrap().total_cost();
        let small_total = comparison.report("small").unwrap().total_cost();
        assert!(large_total > small_total);
        assert!(comparison.report("missing").is_none());
    }

    #[test]
    fn test_reform_against_adjusted_baseline() {
        let aggregator = CostAggregator::new(CreditEngine::default());
        let sgo = PolicySpec::with_value(DEFAULT_CREDIT_PARAMETER, [2025], [1700.0; 5]).unwrap();
        let reforms = vec![
            NamedReform::new("from current law", sgo.clone()),
            NamedReform::new("already enacted", sgo.clone()).against(sgo),
        ];
        let population = records();

        let comparison = compare_reforms(&aggregator, &reforms, &[2025], || &population).unwrap();

        assert!(comparison.reports[0].1.total_cost() > 0.0);
        assert_eq!(comparison.reports[1].1.total_cost(), 0.0);
    }
}
