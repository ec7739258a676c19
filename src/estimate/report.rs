//! Cost report structures

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::CostError;

/// Baseline and reform revenue for one year, in billions
///
/// Field order is the persisted column order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YearCost {
    pub year: i32,
    pub baseline_revenue: f64,
    pub reform_revenue: f64,
    /// `baseline_revenue - reform_revenue`; positive means the reform loses revenue
    pub cost: f64,
}

impl YearCost {
    pub fn new(year: i32, baseline_revenue: f64, reform_revenue: f64) -> Self {
        Self {
            year,
            baseline_revenue,
            reform_revenue,
            cost: baseline_revenue - reform_revenue,
        }
    }
}

/// Multi-year cost estimate
///
/// Entries appear in the order the years were requested. Derived totals are
/// kept at full precision; rounding belongs to presentation. Deserializing
/// recomputes the derived scalars from the entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SerializedReport")]
pub struct CostReport {
    years: Vec<YearCost>,
    total_cost: f64,
    average_annual_cost: f64,
    first_year_cost: f64,
    last_year_cost: f64,
}

impl CostReport {
    pub fn years(&self) -> &[YearCost] {
        &self.years
    }

    pub fn total_cost(&self) -> f64 {
        self.total_cost
    }

    pub fn average_annual_cost(&self) -> f64 {
        self.average_annual_cost
    }

    pub fn first_year_cost(&self) -> f64 {
        self.first_year_cost
    }

    pub fn last_year_cost(&self) -> f64 {
        self.last_year_cost
    }

    /// First entry of the report
    pub fn first_year(&self) -> &YearCost {
        &self.years[0]
    }

    /// Last entry of the report
    pub fn last_year(&self) -> &YearCost {
        &self.years[self.years.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.years.len()
    }

    /// Always false; a finished report has at least one year
    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    /// Look up the entry for a given tax year
    pub fn get(&self, year: i32) -> Option<&YearCost> {
        self.years.iter().find(|y| y.year == year)
    }
}

#[derive(Deserialize)]
struct SerializedReport {
    years: Vec<YearCost>,
}

impl TryFrom<SerializedReport> for CostReport {
    type Error = CostError;

    fn try_from(serialized: SerializedReport) -> Result<Self, Self::Error> {
        let mut builder = ReportBuilder::with_capacity(serialized.years.len());
        builder.extend(serialized.years);
        builder.finish()
    }
}

/// Append-only accumulator that finalizes into a [`CostReport`]
#[derive(Debug, Clone, Default)]
pub struct ReportBuilder {
    years: Vec<YearCost>,
}

impl ReportBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            years: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, year: YearCost) {
        self.years.push(year);
    }

    pub fn len(&self) -> usize {
        self.years.len()
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    /// Compute the derived scalars and freeze the report
    ///
    /// Fails on an empty report or when a year appears more than once.
    pub fn finish(self) -> Result<CostReport, CostError> {
        let (first, last) = match (self.years.first(), self.years.last()) {
            (Some(first), Some(last)) => (first.cost, last.cost),
            _ => return Err(CostError::EmptyHorizon),
        };

        let mut seen = HashSet::with_capacity(self.years.len());
        if let Some(repeated) = self.years.iter().find(|y| !seen.insert(y.year)) {
            return Err(CostError::DuplicateYear { year: repeated.year });
        }

        let total_cost: f64 = self.years.iter().map(|y| y.cost).sum();
        let average_annual_cost = total_cost / self.years.len() as f64;

        Ok(CostReport {
            years: self.years,
            total_cost,
            average_annual_cost,
            first_year_cost: first,
            last_year_cost: last,
        })
    }
}

impl Extend<YearCost> for ReportBuilder {
    fn extend<I: IntoIterator<Item = YearCost>>(&mut self, iter: I) {
        self.years.extend(iter);
    }
}

/// Entries computed before a run was cancelled
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartialReport {
    /// Completed years, in requested order
    pub completed: Vec<YearCost>,

    /// Full requested horizon
    pub requested_years: Vec<i32>,
}

impl PartialReport {
    /// Requested years with no computed entry
    pub fn missing_years(&self) -> Vec<i32> {
        self.requested_years
            .iter()
            .copied()
            .filter(|year| !self.completed.iter().any(|c| c.year == *year))
            .collect()
    }
}

/// Result of a cancellable multi-year estimate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EstimateOutcome {
    Complete(CostReport),
    Cancelled(PartialReport),
}

impl EstimateOutcome {
    pub fn is_complete(&self) -> bool {
        matches!(self, EstimateOutcome::Complete(_))
    }

    /// The finished report, if the run was not cancelled
    pub fn into_report(self) -> Option<CostReport> {
        match self {
            EstimateOutcome::Complete(report) => Some(report),
            EstimateOutcome::Cancelled(_) => None,
        }
    }
}
