//! Multi-year cost aggregation over an analysis horizon
//!
//! Years are independent, so they can run on the rayon pool. Every worker
//! reads the same immutable `RecordSet` (or its own, depending on the
//! factory), and results are collected back in the order the years were
//! requested before the report is finalized.

use std::borrow::Borrow;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::estimator::ReformCostEstimator;
use super::report::{CostReport, EstimateOutcome, PartialReport, ReportBuilder, YearCost};
use crate::engine::{CreditEngine, TaxEngine};
use crate::error::CostError;
use crate::policy::PolicySpec;
use crate::records::RecordSet;
use crate::scenario::ScenarioRunner;

/// Cooperative cancellation flag, checked once per year boundary
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

fn default_parallel() -> bool { true }

/// Execution settings for the multi-year loop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatorConfig {
    /// Estimate years concurrently
    #[serde(default = "default_parallel")]
    pub parallel: bool,

    /// Worker limit; `None` uses the global rayon pool
    #[serde(default)]
    pub max_threads: Option<usize>,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            parallel: default_parallel(),
            max_threads: None,
        }
    }
}

/// Drives the reform cost estimator across a list of years
#[derive(Debug, Clone)]
pub struct CostAggregator<E> {
    runner: ScenarioRunner<E>,
    config: AggregatorConfig,
}

impl<E: TaxEngine> CostAggregator<E> {
    pub fn new(engine: E) -> Self {
        Self::with_config(engine, AggregatorConfig::default())
    }

    pub fn with_config(engine: E, config: AggregatorConfig) -> Self {
        Self {
            runner: ScenarioRunner::new(engine),
            config,
        }
    }

    pub fn runner(&self) -> &ScenarioRunner<E> {
        &self.runner
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    /// Estimate `reform` against current law for every year in `years`
    pub fn estimate<F, R>(&self, reform: &PolicySpec, years: &[i32], records_factory: F) -> Result<CostReport, CostError>
    where
        F: Fn() -> R + Sync,
        R: Borrow<RecordSet>,
    {
        self.estimate_against(reform, &PolicySpec::empty(), years, records_factory)
    }

    /// Estimate `reform` on top of `baseline_adjustment` for every year in `years`
    pub fn estimate_against<F, R>(
        &self,
        reform: &PolicySpec,
        baseline_adjustment: &PolicySpec,
        years: &[i32],
        records_factory: F,
    ) -> Result<CostReport, CostError>
    where
        F: Fn() -> R + Sync,
        R: Borrow<RecordSet>,
    {
        let (completed, _) = self.run_horizon(reform, baseline_adjustment, years, records_factory, None)?;
        self.finish(completed)
    }

    /// Estimate with a cancellation signal checked before each year starts
    ///
    /// A cancelled run returns the entries finished so far, in requested
    /// order, without totals.
    pub fn estimate_cancellable<F, R>(
        &self,
        reform: &PolicySpec,
        baseline_adjustment: &PolicySpec,
        years: &[i32],
        records_factory: F,
        cancel: &CancelToken,
    ) -> Result<EstimateOutcome, CostError>
    where
        F: Fn() -> R + Sync,
        R: Borrow<RecordSet>,
    {
        let (completed, cancelled) =
            self.run_horizon(reform, baseline_adjustment, years, records_factory, Some(cancel))?;

        if cancelled {
            log::warn!("estimate cancelled after {} of {} years", completed.len(), years.len());
            return Ok(EstimateOutcome::Cancelled(PartialReport {
                completed,
                requested_years: years.to_vec(),
            }));
        }
        self.finish(completed).map(EstimateOutcome::Complete)
    }

    /// Run every year, returning finished entries in input order and
    /// whether any year was skipped because of cancellation
    fn run_horizon<F, R>(
        &self,
        reform: &PolicySpec,
        baseline_adjustment: &PolicySpec,
        years: &[i32],
        records_factory: F,
        cancel: Option<&CancelToken>,
    ) -> Result<(Vec<YearCost>, bool), CostError>
    where
        F: Fn() -> R + Sync,
        R: Borrow<RecordSet>,
    {
        validate_horizon(years)?;

        let estimator = ReformCostEstimator::new(&self.runner, reform, baseline_adjustment);
        let engine = self.runner.engine();
        engine.validate_policy(estimator.baseline_policy())?;
        engine.validate_policy(estimator.reform_policy())?;

        log::info!(
            "estimating {} years ({}..{}) {}",
            years.len(),
            years[0],
            years[years.len() - 1],
            if self.config.parallel { "in parallel" } else { "sequentially" }
        );

        let run_year = |year: i32| -> Option<Result<YearCost, CostError>> {
            if cancel.is_some_and(CancelToken::is_cancelled) {
                return None;
            }
            let records = records_factory();
            Some(estimator.estimate_year(records.borrow(), year))
        };

        let outcomes: Vec<Option<Result<YearCost, CostError>>> = if self.config.parallel {
            self.run_parallel(years, &run_year)?
        } else {
            let mut outcomes = Vec::with_capacity(years.len());
            for &year in years {
                let outcome = run_year(year);
                let stop = !matches!(outcome, Some(Ok(_)));
                outcomes.push(outcome);
                if stop {
                    break;
                }
            }
            outcomes
        };

        let mut completed = Vec::with_capacity(years.len());
        let mut cancelled = false;
        for outcome in outcomes {
            match outcome {
                Some(Ok(year_cost)) => completed.push(year_cost),
                Some(Err(err)) => return Err(err),
                None => cancelled = true,
            }
        }
        Ok((completed, cancelled))
    }

    fn finish(&self, completed: Vec<YearCost>) -> Result<CostReport, CostError> {
        let mut builder = ReportBuilder::with_capacity(completed.len());
        builder.extend(completed);
        let report = builder.finish()?;

        log::info!(
            "total cost {:.4}B over {} years (average {:.4}B)",
            report.total_cost(),
            report.len(),
            report.average_annual_cost()
        );
        Ok(report)
    }

    fn run_parallel<G>(&self, years: &[i32], run_year: &G) -> Result<Vec<Option<Result<YearCost, CostError>>>, CostError>
    where
        G: Fn(i32) -> Option<Result<YearCost, CostError>> + Sync,
    {
        let collect = || years.par_iter().map(|&year| run_year(year)).collect::<Vec<_>>();

        match self.config.max_threads {
            Some(threads) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()
                    .map_err(|e| CostError::ThreadPool(e.to_string()))?;
                Ok(pool.install(collect))
            }
            None => Ok(collect()),
        }
    }
}

impl Default for CostAggregator<CreditEngine> {
    fn default() -> Self {
        Self::new(CreditEngine::default())
    }
}

/// Reject horizons that would make the report meaningless
pub fn validate_horizon(years: &[i32]) -> Result<(), CostError> {
    if years.is_empty() {
        return Err(CostError::EmptyHorizon);
    }
    let mut seen = HashSet::with_capacity(years.len());
    for &year in years {
        if !seen.insert(year) {
            return Err(CostError::DuplicateYear { year });
        }
    }
    Ok(())
}
