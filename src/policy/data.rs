//! Policy specification data structures

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::PolicyError;

/// Number of filing-status slots in every parameter value vector
pub const FILING_STATUS_COUNT: usize = 5;

/// Filing status of a tax unit, in parameter-vector order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilingStatus {
    Single,
    MarriedJoint,
    MarriedSeparate,
    HeadOfHousehold,
    Widow,
}

impl FilingStatus {
    /// All statuses in vector order
    pub const ALL: [FilingStatus; FILING_STATUS_COUNT] = [
        FilingStatus::Single,
        FilingStatus::MarriedJoint,
        FilingStatus::MarriedSeparate,
        FilingStatus::HeadOfHousehold,
        FilingStatus::Widow,
    ];

    /// Position of this status in a parameter value vector
    pub fn index(&self) -> usize {
        match self {
            FilingStatus::Single => 0,
            FilingStatus::MarriedJoint => 1,
            FilingStatus::MarriedSeparate => 2,
            FilingStatus::HeadOfHousehold => 3,
            FilingStatus::Widow => 4,
        }
    }

    /// Map a MARS code (1-5) from microdata to a filing status
    pub fn from_mars(code: u8) -> Option<Self> {
        match code {
            1 => Some(FilingStatus::Single),
            2 => Some(FilingStatus::MarriedJoint),
            3 => Some(FilingStatus::MarriedSeparate),
            4 => Some(FilingStatus::HeadOfHousehold),
            5 => Some(FilingStatus::Widow),
            _ => None,
        }
    }

    pub fn mars(&self) -> u8 {
        self.index() as u8 + 1
    }
}

/// One monetary amount per filing status
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StatusValues(pub [f64; FILING_STATUS_COUNT]);

impl StatusValues {
    pub fn zero() -> Self {
        Self([0.0; FILING_STATUS_COUNT])
    }

    /// Same amount for every filing status
    pub fn uniform(amount: f64) -> Self {
        Self([amount; FILING_STATUS_COUNT])
    }

    pub fn get(&self, status: FilingStatus) -> f64 {
        self.0[status.index()]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

/// A sparse override of policy parameters by year
///
/// Maps parameter name to tax year to per-filing-status values. An empty
/// spec means pure current law. Immutable once built; use
/// [`PolicySpecBuilder`] or [`PolicySpec::from_json_str`] to construct one.
/// Serializes in the reform JSON format; deserializing validates it.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct PolicySpec {
    parameters: BTreeMap<String, BTreeMap<i32, StatusValues>>,
}

impl PolicySpec {
    /// Current law with no adjustments
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn builder() -> PolicySpecBuilder {
        PolicySpecBuilder::default()
    }

    /// Convenience constructor for a single parameter over a run of years
    pub fn with_value<I>(parameter: &str, years: I, values: [f64; FILING_STATUS_COUNT]) -> Result<Self, PolicyError>
    where
        I: IntoIterator<Item = i32>,
    {
        let mut builder = Self::builder();
        for year in years {
            builder = builder.set(parameter, year, values);
        }
        builder.build()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// Parameter names in sorted order
    pub fn parameter_names(&self) -> impl Iterator<Item = &str> {
        self.parameters.keys().map(String::as_str)
    }

    /// Year entries for one parameter
    pub fn parameter(&self, name: &str) -> Option<&BTreeMap<i32, StatusValues>> {
        self.parameters.get(name)
    }

    /// Iterate every (parameter, year, values) entry
    pub fn entries(&self) -> impl Iterator<Item = (&str, i32, &StatusValues)> {
        self.parameters.iter().flat_map(|(name, years)| {
            years
                .iter()
                .map(move |(year, values)| (name.as_str(), *year, values))
        })
    }

    /// Value in effect for `year`: the latest entry at or before that year
    ///
    /// Returns `None` when the spec does not touch the parameter on or
    /// before `year`, in which case current law applies.
    pub fn value_in_effect(&self, parameter: &str, year: i32) -> Option<StatusValues> {
        self.parameters
            .get(parameter)?
            .range(..=year)
            .next_back()
            .map(|(_, values)| *values)
    }

    /// Apply `reform` on top of `self` (the ⊕ operator)
    ///
    /// Reform entries replace baseline entries for the same parameter and
    /// year; everything else from both sides is kept.
    pub fn compose(&self, reform: &PolicySpec) -> PolicySpec {
        let mut parameters = self.parameters.clone();
        for (name, years) in &reform.parameters {
            let target = parameters.entry(name.clone()).or_default();
            for (year, values) in years {
                target.insert(*year, *values);
            }
        }
        PolicySpec { parameters }
    }
}

/// Incremental builder that validates amounts on `build`
#[derive(Debug, Default)]
pub struct PolicySpecBuilder {
    parameters: BTreeMap<String, BTreeMap<i32, StatusValues>>,
}

impl PolicySpecBuilder {
    pub fn set(mut self, parameter: &str, year: i32, values: [f64; FILING_STATUS_COUNT]) -> Self {
        self.parameters
            .entry(parameter.to_string())
            .or_default()
            .insert(year, StatusValues(values));
        self
    }

    pub fn build(self) -> Result<PolicySpec, PolicyError> {
        for (name, years) in &self.parameters {
            for (year, values) in years {
                validate_amounts(name, *year, values.as_slice())?;
            }
        }
        Ok(PolicySpec {
            parameters: self.parameters,
        })
    }
}

pub(crate) fn validate_amounts(parameter: &str, year: i32, values: &[f64]) -> Result<(), PolicyError> {
    if values.len() != FILING_STATUS_COUNT {
        return Err(PolicyError::WrongArity {
            parameter: parameter.to_string(),
            year,
            actual: values.len(),
        });
    }
    for (position, &value) in values.iter().enumerate() {
        if !value.is_finite() || value < 0.0 {
            return Err(PolicyError::InvalidAmount {
                parameter: parameter.to_string(),
                year,
                position,
                value,
            });
        }
    }
    Ok(())
}
