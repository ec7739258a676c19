//! Single-year reform cost estimation

use super::report::YearCost;
use super::weighting::aggregate_revenue;
use crate::engine::TaxEngine;
use crate::error::{CostError, Scenario};
use crate::policy::PolicySpec;
use crate::records::RecordSet;
use crate::scenario::ScenarioRunner;

/// Estimates the cost of one reform against one baseline, year by year
///
/// The reform scenario is the baseline adjustment with the reform applied on
/// top; the composition is done once here rather than per year.
#[derive(Debug, Clone)]
pub struct ReformCostEstimator<'a, E> {
    runner: &'a ScenarioRunner<E>,
    baseline: PolicySpec,
    reform: PolicySpec,
}

impl<'a, E: TaxEngine> ReformCostEstimator<'a, E> {
    pub fn new(runner: &'a ScenarioRunner<E>, reform: &PolicySpec, baseline_adjustment: &PolicySpec) -> Self {
        Self {
            runner,
            baseline: baseline_adjustment.clone(),
            reform: baseline_adjustment.compose(reform),
        }
    }

    /// Policy used for the baseline scenario
    pub fn baseline_policy(&self) -> &PolicySpec {
        &self.baseline
    }

    /// Policy used for the reform scenario (baseline ⊕ reform)
    pub fn reform_policy(&self) -> &PolicySpec {
        &self.reform
    }

    /// Run baseline and reform for `year` and difference the revenues
    pub fn estimate_year(&self, records: &RecordSet, year: i32) -> Result<YearCost, CostError> {
        let baseline_revenue = self.revenue(&self.baseline, records, year, Scenario::Baseline)?;
        let reform_revenue = self.revenue(&self.reform, records, year, Scenario::Reform)?;

        let year_cost = YearCost::new(year, baseline_revenue, reform_revenue);
        log::debug!(
            "{}: baseline {:.6}B reform {:.6}B cost {:.6}B",
            year,
            baseline_revenue,
            reform_revenue,
            year_cost.cost
        );
        Ok(year_cost)
    }

    fn revenue(&self, policy: &PolicySpec, records: &RecordSet, year: i32, scenario: Scenario) -> Result<f64, CostError> {
        let result = self
            .runner
            .run(policy, records, year)
            .map_err(|e| CostError::simulation(year, scenario, e))?;
        aggregate_revenue(&result).map_err(|e| CostError::simulation(year, scenario, e))
    }
}

/// One-shot form of [`ReformCostEstimator::estimate_year`]
pub fn estimate_year<E: TaxEngine>(
    runner: &ScenarioRunner<E>,
    reform: &PolicySpec,
    baseline_adjustment: &PolicySpec,
    records: &RecordSet,
    year: i32,
) -> Result<YearCost, CostError> {
    ReformCostEstimator::new(runner, reform, baseline_adjustment).estimate_year(records, year)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing::FixedLiabilityEngine;
    use crate::engine::{CreditEngine, DEFAULT_CREDIT_PARAMETER};
    use crate::error::{EngineError, ScenarioError};
    use crate::policy::FilingStatus;
    use crate::records::HouseholdRecord;
    use approx::assert_abs_diff_eq;

    const SGO: [f64; 5] = [1700.0, 3400.0, 1700.0, 1700.0, 1700.0];

    fn two_records() -> RecordSet {
        RecordSet::new(vec![
            HouseholdRecord::new(1, FilingStatus::Single, 1000.0, 10_000.0, 2_000.0),
            HouseholdRecord::new(2, FilingStatus::Single, 500.0, 0.0, 2_000.0),
        ])
    }

    fn sgo_reform() -> PolicySpec {
        PolicySpec::with_value(DEFAULT_CREDIT_PARAMETER, [2025], SGO).unwrap()
    }

    #[test]
    fn test_end_to_end_two_record_population() {
        let runner = ScenarioRunner::new(CreditEngine::default());
        let year = estimate_year(&runner, &sgo_reform(), &PolicySpec::empty(), &two_records(), 2025).unwrap();

        assert_eq!(year.year, 2025);
        assert_eq!(year.baseline_revenue, (10_000.0 * 1000.0 + 0.0 * 500.0) / 1e9);
        assert_eq!(year.reform_revenue, (8_300.0 * 1000.0 + 0.0 * 500.0) / 1e9);
        assert_abs_diff_eq!(year.cost, 0.0017, epsilon = 1e-15);
        assert!(year.cost > 0.0);
    }

    #[test]
    fn test_scripted_engine_matches_worked_example() {
        let engine = FixedLiabilityEngine::uniform(2025..=2025, vec![10_000.0, 0.0], vec![8_300.0, 0.0]);
        let runner = ScenarioRunner::new(engine);
        let year = estimate_year(&runner, &sgo_reform(), &PolicySpec::empty(), &two_records(), 2025).unwrap();

        assert_eq!(year.baseline_revenue, 0.01);
        assert_eq!(year.reform_revenue, 0.0083);
        assert_eq!(year.cost, 0.01 - 0.0083);
    }

    #[test]
    fn test_empty_reform_costs_nothing() {
        let runner = ScenarioRunner::new(CreditEngine::default());
        let estimator = ReformCostEstimator::new(&runner, &PolicySpec::empty(), &PolicySpec::empty());
        for year in 2025..=2034 {
            assert_eq!(estimator.estimate_year(&two_records(), year).unwrap().cost, 0.0);
        }
    }

    #[test]
    fn test_reform_equal_to_baseline_costs_nothing() {
        let runner = ScenarioRunner::new(CreditEngine::default());
        let adjustment = sgo_reform();
        let estimator = ReformCostEstimator::new(&runner, &adjustment, &adjustment);
        assert_eq!(estimator.baseline_policy(), estimator.reform_policy());
        assert_eq!(estimator.estimate_year(&two_records(), 2025).unwrap().cost, 0.0);
    }

    #[test]
    fn test_reform_composes_on_baseline_adjustment() {
        let runner = ScenarioRunner::new(CreditEngine::default());
        let adjustment = PolicySpec::with_value(DEFAULT_CREDIT_PARAMETER, [2025], [1000.0; 5]).unwrap();
        let estimator = ReformCostEstimator::new(&runner, &sgo_reform(), &adjustment);

        let year = estimator.estimate_year(&two_records(), 2025).unwrap();
        // Baseline already grants 1000; the reform adds 700 on top for record 1
        assert_eq!(year.baseline_revenue, 9_000.0 * 1000.0 / 1e9);
        assert_eq!(year.reform_revenue, 8_300.0 * 1000.0 / 1e9);
    }

    #[test]
    fn test_engine_error_carries_year_and_scenario() {
        let mut engine = FixedLiabilityEngine::uniform(2025..=2026, vec![1.0, 1.0], vec![1.0, 1.0]);
        engine.failing_years.push(2026);
        let runner = ScenarioRunner::new(engine);

        let err = estimate_year(&runner, &sgo_reform(), &PolicySpec::empty(), &two_records(), 2026).unwrap_err();
        match err {
            CostError::Simulation {
                year,
                scenario,
                source: ScenarioError::Engine(EngineError::Failure(_)),
            } => {
                assert_eq!(year, 2026);
                assert_eq!(scenario, Scenario::Baseline);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_invalid_reform_fails_in_reform_scenario() {
        let runner = ScenarioRunner::new(CreditEngine::default());
        let reform = PolicySpec::with_value("CR_NOT_A_PARAM", [2025], SGO).unwrap();

        let err = estimate_year(&runner, &reform, &PolicySpec::empty(), &two_records(), 2025).unwrap_err();
        assert!(matches!(
            err,
            CostError::Simulation {
                scenario: Scenario::Reform,
                source: ScenarioError::Engine(EngineError::InvalidPolicySpec(_)),
                ..
            }
        ));
    }

    #[test]
    fn test_negative_weight_surfaces_as_aggregation_error() {
        let records = RecordSet::new(vec![HouseholdRecord::new(1, FilingStatus::Single, -3.0, 100.0, 0.0)]);
        let runner = ScenarioRunner::new(CreditEngine::default());

        let err = estimate_year(&runner, &sgo_reform(), &PolicySpec::empty(), &records, 2025).unwrap_err();
        assert!(matches!(
            err,
            CostError::Simulation {
                scenario: Scenario::Baseline,
                source: ScenarioError::Aggregation(_),
                ..
            }
        ));
    }
}
