//! Household record structures

use crate::policy::FilingStatus;

/// A single weighted household record from the microdata
#[derive(Debug, Clone, PartialEq)]
pub struct HouseholdRecord {
    /// Unique record identifier
    pub record_id: u64,

    /// Filing status of the tax unit
    pub filing_status: FilingStatus,

    /// Sampling weight (number of real households this record stands for)
    pub weight: f64,

    /// Income tax liability before the modeled credit, in data-year dollars.
    /// Negative when refundable credits already exceed liability.
    pub tax_before_credits: f64,

    /// Contribution amount eligible for the modeled credit, in data-year dollars
    pub qualifying_contribution: f64,
}

impl HouseholdRecord {
    pub fn new(
        record_id: u64,
        filing_status: FilingStatus,
        weight: f64,
        tax_before_credits: f64,
        qualifying_contribution: f64,
    ) -> Self {
        Self {
            record_id,
            filing_status,
            weight,
            tax_before_credits,
            qualifying_contribution,
        }
    }
}

/// An immutable weighted population of household records
///
/// Shared across worker threads by reference (or `Arc`); nothing mutates it
/// after construction, so one instance can back every year and scenario.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordSet {
    records: Vec<HouseholdRecord>,
}

impl RecordSet {
    pub fn new(records: Vec<HouseholdRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[HouseholdRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sampling weights in record order
    pub fn weights(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.weight).collect()
    }
}

impl FromIterator<HouseholdRecord> for RecordSet {
    fn from_iter<I: IntoIterator<Item = HouseholdRecord>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a RecordSet {
    type Item = &'a HouseholdRecord;
    type IntoIter = std::slice::Iter<'a, HouseholdRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weights_follow_record_order() {
        let records: RecordSet = vec![
            HouseholdRecord::new(1, FilingStatus::Single, 1000.0, 10_000.0, 2_000.0),
            HouseholdRecord::new(2, FilingStatus::MarriedJoint, 500.0, 0.0, 0.0),
        ]
        .into_iter()
        .collect();

        assert_eq!(records.len(), 2);
        assert_eq!(records.weights(), vec![1000.0, 500.0]);
        assert_eq!(records.records()[1].record_id, 2);
    }

    #[test]
    fn test_empty_population() {
        let records = RecordSet::default();
        assert!(records.is_empty());
        assert!(records.weights().is_empty());
    }
}
