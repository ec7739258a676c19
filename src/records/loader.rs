//! Load household microdata from CSV
//!
//! Expected columns: `RECID, MARS, s006, tax_before_credits, qualifying_contribution`

use std::path::Path;

use csv::Reader;

use super::{HouseholdRecord, RecordSet};
use crate::error::RecordError;
use crate::policy::FilingStatus;

/// Default microdata file name
pub const DEFAULT_RECORDS_PATH: &str = "cps_records.csv";

/// Raw CSV row matching the microdata columns
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    #[serde(rename = "RECID")]
    record_id: u64,
    #[serde(rename = "MARS")]
    mars: u8,
    #[serde(rename = "s006")]
    weight: f64,
    #[serde(rename = "tax_before_credits")]
    tax_before_credits: f64,
    #[serde(rename = "qualifying_contribution", default)]
    qualifying_contribution: f64,
}

impl CsvRow {
    fn into_record(self) -> Result<HouseholdRecord, RecordError> {
        let filing_status = FilingStatus::from_mars(self.mars).ok_or(RecordError::UnknownFilingStatus {
            record_id: self.record_id,
            code: self.mars,
        })?;

        Ok(HouseholdRecord::new(
            self.record_id,
            filing_status,
            self.weight,
            self.tax_before_credits,
            self.qualifying_contribution,
        ))
    }
}

/// Load all records from a CSV file
pub fn load_records<P: AsRef<Path>>(path: P) -> Result<RecordSet, RecordError> {
    let reader = Reader::from_path(path)?;
    collect_records(reader)
}

/// Load records from any reader (e.g., string buffer, request body)
pub fn load_records_from_reader<R: std::io::Read>(reader: R) -> Result<RecordSet, RecordError> {
    collect_records(Reader::from_reader(reader))
}

/// Build the population from the default microdata location
pub fn construct_population() -> Result<RecordSet, RecordError> {
    load_records(DEFAULT_RECORDS_PATH)
}

fn collect_records<R: std::io::Read>(mut reader: Reader<R>) -> Result<RecordSet, RecordError> {
    let mut records = Vec::new();

    for result in reader.deserialize() {
        let row: CsvRow = result?;
        records.push(row.into_record()?);
    }

    log::debug!("loaded {} household records", records.len());
    Ok(RecordSet::new(records))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
RECID,MARS,s006,tax_before_credits,qualifying_contribution
1,1,1000.0,10000.0,2500.0
2,2,500.0,0.0,0.0
3,4,250.5,-1200.0,300.0
";

    #[test]
    fn test_load_records_from_reader() {
        let records = load_records_from_reader(SAMPLE.as_bytes()).expect("Failed to load records");
        assert_eq!(records.len(), 3);

        let r3 = &records.records()[2];
        assert_eq!(r3.record_id, 3);
        assert_eq!(r3.filing_status, FilingStatus::HeadOfHousehold);
        assert_eq!(r3.weight, 250.5);
        assert_eq!(r3.tax_before_credits, -1200.0);
    }

    #[test]
    fn test_missing_contribution_column_defaults_to_zero() {
        let data = "RECID,MARS,s006,tax_before_credits\n7,3,10.0,55.0\n";
        let records = load_records_from_reader(data.as_bytes()).unwrap();
        assert_eq!(records.records()[0].qualifying_contribution, 0.0);
    }

    #[test]
    fn test_unknown_mars_code() {
        let data = "RECID,MARS,s006,tax_before_credits,qualifying_contribution\n9,6,1.0,0.0,0.0\n";
        let err = load_records_from_reader(data.as_bytes()).unwrap_err();
        assert!(matches!(err, RecordError::UnknownFilingStatus { record_id: 9, code: 6 }));
    }

    #[test]
    fn test_malformed_row() {
        let data = "RECID,MARS,s006,tax_before_credits,qualifying_contribution\n1,1,heavy,0.0,0.0\n";
        assert!(matches!(load_records_from_reader(data.as_bytes()), Err(RecordError::Csv(_))));
    }

    #[test]
    fn test_missing_file() {
        assert!(load_records("does/not/exist.csv").is_err());
    }
}
