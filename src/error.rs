//! Error types for reform cost estimation
//!
//! Errors are layered the same way the computation is: policy validation,
//! microdata loading, the tax engine, record weighting, and finally the
//! estimator, which attaches the year and scenario that was running.

use std::fmt;
use std::ops::RangeInclusive;

use thiserror::Error;

/// Which side of the paired simulation was running when an error occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    /// Current law plus the baseline adjustment
    Baseline,
    /// Baseline adjustment with the reform applied on top
    Reform,
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scenario::Baseline => write!(f, "baseline"),
            Scenario::Reform => write!(f, "reform"),
        }
    }
}

/// Malformed policy specification
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PolicyError {
    #[error("reform must be a JSON object of parameters: {reason}")]
    Malformed { reason: String },

    #[error("parameter '{parameter}' must map years to value lists")]
    NotAYearMap { parameter: String },

    #[error("parameter '{parameter}': year key '{key}' is not an integer tax year")]
    InvalidYearKey { parameter: String, key: String },

    #[error("parameter '{parameter}': year {year} is given more than once")]
    DuplicateYearKey { parameter: String, year: i32 },

    #[error("parameter '{parameter}' year {year}: expected 5 filing-status values, got {actual}")]
    WrongArity {
        parameter: String,
        year: i32,
        actual: usize,
    },

    #[error("parameter '{parameter}' year {year}: value at position {position} is not numeric")]
    NonNumeric {
        parameter: String,
        year: i32,
        position: usize,
    },

    #[error("parameter '{parameter}' year {year}: value {value} at position {position} must be a finite non-negative amount")]
    InvalidAmount {
        parameter: String,
        year: i32,
        position: usize,
        value: f64,
    },

    #[error("unknown policy parameter '{parameter}'")]
    UnknownParameter { parameter: String },

    #[error("parameter '{parameter}': year {year} is outside the supported range {first}..={last}")]
    YearOutOfRange {
        parameter: String,
        year: i32,
        first: i32,
        last: i32,
    },
}

/// Microdata loading failures
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("failed to read microdata: {0}")]
    Csv(#[from] csv::Error),

    #[error("record {record_id}: unknown MARS filing status code {code}")]
    UnknownFilingStatus { record_id: u64, code: u8 },
}

/// Failures reported by a tax engine
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("tax year {year} is outside the engine's supported range {first}..={last}")]
    UnsupportedYear { year: i32, first: i32, last: i32 },

    #[error("invalid policy specification: {0}")]
    InvalidPolicySpec(#[from] PolicyError),

    #[error("engine failure: {0}")]
    Failure(String),
}

impl EngineError {
    /// Build an `UnsupportedYear` error from the engine's supported range
    pub fn unsupported_year(year: i32, supported: &RangeInclusive<i32>) -> Self {
        EngineError::UnsupportedYear {
            year,
            first: *supported.start(),
            last: *supported.end(),
        }
    }
}

/// Violations of the (liability, weight) data contract
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AggregationError {
    #[error("liability vector has {liabilities} entries but weight vector has {weights}")]
    ShapeMismatch { liabilities: usize, weights: usize },

    #[error("record {index}: weight {weight} must be finite and non-negative")]
    InvalidWeight { index: usize, weight: f64 },

    #[error("record {index}: liability {liability} is not finite")]
    InvalidLiability { index: usize, liability: f64 },
}

/// Failure of a single scenario run (simulation plus weighting)
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScenarioError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Aggregation(#[from] AggregationError),
}

/// Top-level estimation error
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CostError {
    #[error("invalid policy specification: {0}")]
    InvalidPolicySpec(#[from] PolicyError),

    #[error("{scenario} simulation for {year} failed: {source}")]
    Simulation {
        year: i32,
        scenario: Scenario,
        #[source]
        source: ScenarioError,
    },

    #[error("analysis horizon is empty")]
    EmptyHorizon,

    #[error("year {year} appears more than once in the analysis horizon")]
    DuplicateYear { year: i32 },

    #[error("failed to build worker pool: {0}")]
    ThreadPool(String),
}

impl CostError {
    /// Attach year and scenario context to a scenario failure
    pub fn simulation(year: i32, scenario: Scenario, source: impl Into<ScenarioError>) -> Self {
        CostError::Simulation {
            year,
            scenario,
            source: source.into(),
        }
    }

    /// Year of the failing simulation, if the error came from one
    pub fn year(&self) -> Option<i32> {
        match self {
            CostError::Simulation { year, .. } | CostError::DuplicateYear { year } => Some(*year),
            _ => None,
        }
    }
}
