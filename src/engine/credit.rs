//! Reference engine: a nonrefundable per-filing-status contribution credit
//!
//! Current law sets the credit cap to zero for every filing status. A reform
//! raises the cap for some years; values set for a year stay in effect for
//! later years until a later entry replaces them.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use super::{SimulationResult, TaxEngine};
use crate::error::{EngineError, PolicyError};
use crate::policy::{PolicySpec, StatusValues};
use crate::records::RecordSet;

/// Parameter name of the modeled credit cap
pub const DEFAULT_CREDIT_PARAMETER: &str = "CR_SGO_c";

fn default_credit_parameter() -> String {
    DEFAULT_CREDIT_PARAMETER.to_string()
}
fn default_first_year() -> i32 { 2013 }
fn default_last_year() -> i32 { 2035 }
fn default_data_year() -> i32 { 2025 }

/// Configuration for [`CreditEngine`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditEngineConfig {
    /// Name of the credit-cap parameter reforms may set
    #[serde(default = "default_credit_parameter")]
    pub credit_parameter: String,

    /// First simulable tax year
    #[serde(default = "default_first_year")]
    pub first_year: i32,

    /// Last simulable tax year
    #[serde(default = "default_last_year")]
    pub last_year: i32,

    /// Tax year the microdata amounts are stated in
    #[serde(default = "default_data_year")]
    pub data_year: i32,

    /// Annual growth applied to liabilities and contributions away from the data year
    #[serde(default)]
    pub growth_rate: f64,
}

impl Default for CreditEngineConfig {
    fn default() -> Self {
        Self {
            credit_parameter: default_credit_parameter(),
            first_year: default_first_year(),
            last_year: default_last_year(),
            data_year: default_data_year(),
            growth_rate: 0.0,
        }
    }
}

/// Law in effect for one tax year
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CreditLaw {
    pub year: i32,

    /// Maximum credit per filing status
    pub credit_cap: StatusValues,

    /// Factor applied to data-year amounts
    pub growth_factor: f64,
}

/// Reference tax engine
#[derive(Debug, Clone, Default)]
pub struct CreditEngine {
    config: CreditEngineConfig,
}

impl CreditEngine {
    pub fn new(config: CreditEngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CreditEngineConfig {
        &self.config
    }

    fn growth_factor(&self, year: i32) -> f64 {
        (1.0 + self.config.growth_rate).powi(year - self.config.data_year)
    }
}

impl TaxEngine for CreditEngine {
    type Law = CreditLaw;

    fn supported_years(&self) -> RangeInclusive<i32> {
        self.config.first_year..=self.config.last_year
    }

    fn validate_policy(&self, policy: &PolicySpec) -> Result<(), PolicyError> {
        let supported = self.supported_years();
        for (parameter, year, _) in policy.entries() {
            if parameter != self.config.credit_parameter {
                return Err(PolicyError::UnknownParameter {
                    parameter: parameter.to_string(),
                });
            }
            if !supported.contains(&year) {
                return Err(PolicyError::YearOutOfRange {
                    parameter: parameter.to_string(),
                    year,
                    first: *supported.start(),
                    last: *supported.end(),
                });
            }
        }
        Ok(())
    }

    fn law_for(&self, policy: &PolicySpec, year: i32) -> Result<CreditLaw, EngineError> {
        let supported = self.supported_years();
        if !supported.contains(&year) {
            return Err(EngineError::unsupported_year(year, &supported));
        }
        self.validate_policy(policy)?;

        let credit_cap = policy
            .value_in_effect(&self.config.credit_parameter, year)
            .unwrap_or_else(StatusValues::zero);

        Ok(CreditLaw {
            year,
            credit_cap,
            growth_factor: self.growth_factor(year),
        })
    }

    fn simulate(&self, law: &CreditLaw, records: &RecordSet) -> Result<SimulationResult, EngineError> {
        let mut liabilities = Vec::with_capacity(records.len());
        let mut weights = Vec::with_capacity(records.len());

        for record in records {
            let tax = record.tax_before_credits * law.growth_factor;
            let contribution = (record.qualifying_contribution * law.growth_factor).max(0.0);

            // Nonrefundable: the credit can only bring liability down to zero
            let credit = law
                .credit_cap
                .get(record.filing_status)
                .min(contribution)
                .min(tax.max(0.0));

            liabilities.push(tax - credit);
            weights.push(record.weight);
        }

        Ok(SimulationResult::new(law.year, liabilities, weights))
    }
}
