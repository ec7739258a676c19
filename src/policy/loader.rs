//! Load reform specifications from JSON
//!
//! Format: `{"PARAM": {"YEAR": [single, mjoint, mseparate, headhh, widow]}}`.
//! The value list may also be wrapped once (`[[...]]`), as policy files
//! written for other tax calculators do.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::data::{validate_amounts, PolicySpec, PolicySpecBuilder, FILING_STATUS_COUNT};
use crate::error::PolicyError;

impl PolicySpec {
    /// Parse a reform from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self, PolicyError> {
        let value: Value = serde_json::from_str(json).map_err(|e| PolicyError::Malformed {
            reason: e.to_string(),
        })?;
        Self::from_json_value(&value)
    }

    /// Parse a reform from an already-decoded JSON value
    pub fn from_json_value(value: &Value) -> Result<Self, PolicyError> {
        let object = value.as_object().ok_or_else(|| PolicyError::Malformed {
            reason: format!("expected an object, found {}", json_kind(value)),
        })?;

        let mut builder = PolicySpecBuilder::default();
        for (parameter, years) in object {
            let years = years.as_object().ok_or_else(|| PolicyError::NotAYearMap {
                parameter: parameter.clone(),
            })?;

            let mut seen = BTreeSet::new();
            for (key, values) in years {
                let year = parse_year_key(parameter, key)?;
                if !seen.insert(year) {
                    return Err(PolicyError::DuplicateYearKey {
                        parameter: parameter.clone(),
                        year,
                    });
                }
                let amounts = parse_amounts(parameter, year, values)?;
                builder = builder.set(parameter, year, amounts);
            }
        }
        builder.build()
    }
}

impl<'de> Deserialize<'de> for PolicySpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        PolicySpec::from_json_value(&value).map_err(serde::de::Error::custom)
    }
}

/// Load a reform JSON file
pub fn load_policy_spec<P: AsRef<Path>>(path: P) -> Result<PolicySpec, Box<dyn std::error::Error + Send + Sync>> {
    let file = File::open(path)?;
    let value: Value = serde_json::from_reader(BufReader::new(file))?;
    Ok(PolicySpec::from_json_value(&value)?)
}

fn parse_year_key(parameter: &str, key: &str) -> Result<i32, PolicyError> {
    key.parse::<i32>().map_err(|_| PolicyError::InvalidYearKey {
        parameter: parameter.to_string(),
        key: key.to_string(),
    })
}

fn parse_amounts(parameter: &str, year: i32, values: &Value) -> Result<[f64; FILING_STATUS_COUNT], PolicyError> {
    let mut list = values.as_array().ok_or_else(|| PolicyError::WrongArity {
        parameter: parameter.to_string(),
        year,
        actual: 0,
    })?;
    if let [Value::Array(inner)] = list.as_slice() {
        list = inner;
    }

    let mut amounts = Vec::with_capacity(list.len());
    for (position, entry) in list.iter().enumerate() {
        let amount = entry.as_f64().ok_or_else(|| PolicyError::NonNumeric {
            parameter: parameter.to_string(),
            year,
            position,
        })?;
        amounts.push(amount);
    }
    validate_amounts(parameter, year, &amounts)?;

    let mut out = [0.0; FILING_STATUS_COUNT];
    out.copy_from_slice(&amounts);
    Ok(out)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::StatusValues;

    #[test]
    fn test_parse_sgo_reform() {
        let spec = PolicySpec::from_json_str(
            r#"{"CR_SGO_c": {"2025": [1700.0, 3400.0, 1700.0, 1700.0, 1700.0],
                             "2026": [1700, 3400, 1700, 1700, 1700]}}"#,
        )
        .unwrap();

        let expected = StatusValues([1700.0, 3400.0, 1700.0, 1700.0, 1700.0]);
        assert_eq!(spec.value_in_effect("CR_SGO_c", 2025), Some(expected));
        assert_eq!(spec.value_in_effect("CR_SGO_c", 2026), Some(expected));
    }

    #[test]
    fn test_empty_object_is_current_law() {
        let spec = PolicySpec::from_json_str("{}").unwrap();
        assert!(spec.is_empty());
    }

    #[test]
    fn test_rejects_non_integer_year() {
        let err = PolicySpec::from_json_str(r#"{"CR_SGO_c": {"FY25": [0, 0, 0, 0, 0]}}"#).unwrap_err();
        assert!(matches!(err, PolicyError::InvalidYearKey { .. }));
    }

    #[test]
    fn test_rejects_wrong_arity() {
        let err = PolicySpec::from_json_str(r#"{"CR_SGO_c": {"2025": [1700, 3400]}}"#).unwrap_err();
        assert_eq!(
            err,
            PolicyError::WrongArity {
                parameter: "CR_SGO_c".to_string(),
                year: 2025,
                actual: 2,
            }
        );
    }

    #[test]
    fn test_rejects_non_numeric_amount() {
        let err =
            PolicySpec::from_json_str(r#"{"CR_SGO_c": {"2025": [1700, "lots", 1700, 1700, 1700]}}"#).unwrap_err();
        assert!(matches!(err, PolicyError::NonNumeric { position: 1, .. }));
    }

    #[test]
    fn test_accepts_singly_nested_values() {
        let spec =
            PolicySpec::from_json_str(r#"{"CR_SGO_c": {"2025": [[1700, 3400, 1700, 1700, 1700]]}}"#).unwrap();
        assert_eq!(
            spec.value_in_effect("CR_SGO_c", 2025),
            Some(StatusValues([1700.0, 3400.0, 1700.0, 1700.0, 1700.0]))
        );

        let err = PolicySpec::from_json_str(r#"{"CR_SGO_c": {"2025": [[[1, 1, 1, 1, 1]]]}}"#).unwrap_err();
        assert!(matches!(err, PolicyError::NonNumeric { position: 0, .. }));
    }

    #[test]
    fn test_rejects_year_given_twice() {
        let err = PolicySpec::from_json_str(
            r#"{"CR_SGO_c": {"2025": [1, 1, 1, 1, 1], "02025": [9, 9, 9, 9, 9]}}"#,
        )
        .unwrap_err();
        assert_eq!(
            err,
            PolicyError::DuplicateYearKey {
                parameter: "CR_SGO_c".to_string(),
                year: 2025,
            }
        );
    }

    #[test]
    fn test_rejects_padded_year_key() {
        let err = PolicySpec::from_json_str(r#"{"CR_SGO_c": {" 2025": [1, 1, 1, 1, 1]}}"#).unwrap_err();
        assert!(matches!(err, PolicyError::InvalidYearKey { .. }));
    }

    #[test]
    fn test_rejects_negative_amount() {
        let err = PolicySpec::from_json_str(r#"{"CR_SGO_c": {"2025": [1700, 3400, -5, 1700, 1700]}}"#).unwrap_err();
        assert!(matches!(err, PolicyError::InvalidAmount { position: 2, .. }));
    }

    #[test]
    fn test_serde_round_trip_uses_reform_format() {
        let spec = PolicySpec::from_json_str(r#"{"CR_SGO_c": {"2025": [1700, 3400, 1700, 1700, 1700]}}"#).unwrap();
        let json = serde_json::to_value(&spec).unwrap();
        assert_eq!(json["CR_SGO_c"]["2025"][1], 3400.0);

        let back: PolicySpec = serde_json::from_value(json).unwrap();
        assert_eq!(back, spec);

        let bad = serde_json::from_str::<PolicySpec>(r#"{"CR_SGO_c": {"2025": [1]}}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_rejects_non_object() {
        assert!(matches!(
            PolicySpec::from_json_str("[1, 2]").unwrap_err(),
            PolicyError::Malformed { .. }
        ));
        assert!(matches!(
            PolicySpec::from_json_str(r#"{"CR_SGO_c": 5}"#).unwrap_err(),
            PolicyError::NotAYearMap { .. }
        ));
        assert!(matches!(
            PolicySpec::from_json_str("not json").unwrap_err(),
            PolicyError::Malformed { .. }
        ));
    }
}
