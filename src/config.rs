//! Analysis configuration
//!
//! Loaded from a JSON file; any field may be omitted and falls back to the
//! defaults below. Command-line flags override file values.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::engine::CreditEngineConfig;
use crate::estimate::AggregatorConfig;
use crate::output::DEFAULT_OUTPUT_PATH;
use crate::records::DEFAULT_RECORDS_PATH;

fn default_start_year() -> i32 { 2025 }
fn default_end_year() -> i32 { 2034 }
fn default_reform_path() -> PathBuf { PathBuf::from("reform.json") }
fn default_records_path() -> PathBuf { PathBuf::from(DEFAULT_RECORDS_PATH) }
fn default_output_path() -> PathBuf { PathBuf::from(DEFAULT_OUTPUT_PATH) }
fn default_parallel() -> bool { true }

/// Settings for one cost analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// First year of the analysis window (inclusive)
    #[serde(default = "default_start_year")]
    pub start_year: i32,

    /// Last year of the analysis window (inclusive)
    #[serde(default = "default_end_year")]
    pub end_year: i32,

    /// Explicit year list; overrides the start/end window and keeps its order
    #[serde(default)]
    pub years: Option<Vec<i32>>,

    /// Reform JSON file
    #[serde(default = "default_reform_path")]
    pub reform_path: PathBuf,

    /// Optional baseline adjustment JSON file
    #[serde(default)]
    pub baseline_path: Option<PathBuf>,

    /// Microdata CSV
    #[serde(default = "default_records_path")]
    pub records_path: PathBuf,

    /// Per-year report CSV
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,

    #[serde(default = "default_parallel")]
    pub parallel: bool,

    #[serde(default)]
    pub max_threads: Option<usize>,

    /// Cancel the estimate cooperatively after this many seconds
    #[serde(default)]
    pub time_limit_secs: Option<u64>,

    #[serde(default)]
    pub engine: CreditEngineConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            start_year: default_start_year(),
            end_year: default_end_year(),
            years: None,
            reform_path: default_reform_path(),
            baseline_path: None,
            records_path: default_records_path(),
            output_path: default_output_path(),
            parallel: default_parallel(),
            max_threads: None,
            time_limit_secs: None,
            engine: CreditEngineConfig::default(),
        }
    }
}

impl AnalysisConfig {
    /// Load configuration from a JSON file
    pub fn from_json_path(path: &Path) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Years to estimate, in the order they will be reported
    pub fn horizon(&self) -> Vec<i32> {
        match &self.years {
            Some(years) => years.clone(),
            None => (self.start_year..=self.end_year).collect(),
        }
    }

    pub fn aggregator_config(&self) -> AggregatorConfig {
        AggregatorConfig {
            parallel: self.parallel,
            max_threads: self.max_threads,
        }
    }

    /// Check settings that would otherwise fail deep inside a run
    pub fn validate(&self) -> Result<(), String> {
        if self.years.is_none() && self.start_year > self.end_year {
            return Err(format!(
                "start_year {} is after end_year {}",
                self.start_year, self.end_year
            ));
        }
        if self.max_threads == Some(0) {
            return Err("max_threads must be at least 1".to_string());
        }
        if self.engine.first_year > self.engine.last_year {
            return Err(format!(
                "engine first_year {} is after last_year {}",
                self.engine.first_year, self.engine.last_year
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_cover_ten_year_window() {
        let config = AnalysisConfig::default();
        assert_eq!(config.horizon(), (2025..=2034).collect::<Vec<_>>());
        assert!(config.validate().is_ok());
        assert_eq!(config.engine.credit_parameter, "CR_SGO_c");
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: AnalysisConfig = serde_json::from_str(
            r#"{"start_year": 2026, "end_year": 2028, "engine": {"growth_rate": 0.02}}"#,
        )
        .unwrap();

        assert_eq!(config.horizon(), vec![2026, 2027, 2028]);
        assert_eq!(config.records_path, PathBuf::from("cps_records.csv"));
        assert!(config.parallel);
        assert_eq!(config.engine.growth_rate, 0.02);
        assert_eq!(config.engine.last_year, 2035);
    }

    #[test]
    fn test_explicit_years_keep_order() {
        let config: AnalysisConfig = serde_json::from_str(r#"{"years": [2027, 2025, 2026]}"#).unwrap();
        assert_eq!(config.horizon(), vec![2027, 2025, 2026]);
    }

    #[test]
    fn test_validate_rejects_inverted_window() {
        let config = AnalysisConfig {
            start_year: 2030,
            end_year: 2025,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = AnalysisConfig {
            max_threads: Some(0),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_aggregator_config() {
        let config = AnalysisConfig {
            parallel: false,
            max_threads: Some(2),
            ..Default::default()
        };
        let aggregator = config.aggregator_config();
        assert!(!aggregator.parallel);
        assert_eq!(aggregator.max_threads, Some(2));
    }
}
