//! Record index
//!
//! Groups decoded records by parameter display name. Buckets keep file-encounter
//! order; consumers that want time order use [`RecordIndex::sorted_by_time`].

use crate::types::TelemetryRecord;
use std::collections::HashMap;

/// Mapping from parameter display name to its records
#[derive(Debug, Clone, Default)]
pub struct RecordIndex {
    /// Buckets in first-seen order
    buckets: Vec<(String, Vec<TelemetryRecord>)>,
    /// Name → bucket position
    positions: HashMap<String, usize>,
}

impl RecordIndex {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Append a record to the bucket for `name`, creating it on first use
    pub(crate) fn append(&mut self, name: String, record: TelemetryRecord) {
        match self.positions.get(&name) {
            Some(&pos) => self.buckets[pos].1.push(record),
            None => {
                log::debug!("New parameter bucket: {}", name);
                self.positions.insert(name.clone(), self.buckets.len());
                self.buckets.push((name, vec![record]));
            }
        }
    }

    /// Records for a name in decode order, empty if the name was never seen
    pub fn records_for_name(&self, name: &str) -> &[TelemetryRecord] {
        self.positions
            .get(name)
            .map(|&pos| self.buckets[pos].1.as_slice())
            .unwrap_or(&[])
    }

    /// Records for a name sorted by ascending timestamp
    ///
    /// The sort is stable, so records with equal timestamps keep decode order.
    pub fn sorted_by_time(&self, name: &str) -> Vec<&TelemetryRecord> {
        let mut records: Vec<&TelemetryRecord> = self.records_for_name(name).iter().collect();
        records.sort_by_key(|record| record.timestamp());
        records
    }

    /// Number of distinct parameter names
    pub fn unique_parameter_count(&self) -> usize {
        self.buckets.len()
    }

    /// Parameter names in first-seen order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.buckets.iter().map(|(name, _)| name.as_str())
    }

    /// (name, records) pairs in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[TelemetryRecord])> {
        self.buckets
            .iter()
            .map(|(name, records)| (name.as_str(), records.as_slice()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.positions.contains_key(name)
    }

    /// Number of records across all buckets
    pub fn total_records(&self) -> usize {
        self.buckets.iter().map(|(_, records)| records.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RecordValue;

    fn record(number: u16, timestamp: u32) -> TelemetryRecord {
        TelemetryRecord::new(number, timestamp, 0, RecordValue::Long(timestamp as i64))
    }

    #[test]
    fn test_append_and_lookup() {
        let mut index = RecordIndex::new();
        index.append("B".to_string(), record(2, 30));
        index.append("A".to_string(), record(1, 10));
        index.append("B".to_string(), record(2, 20));

        assert_eq!(index.unique_parameter_count(), 2);
        assert_eq!(index.total_records(), 3);
        assert_eq!(index.names().collect::<Vec<_>>(), vec!["B", "A"]);
        assert_eq!(index.records_for_name("B").len(), 2);
        assert_eq!(index.records_for_name("B")[0].timestamp(), 30);
    }

    #[test]
    fn test_missing_name_is_empty() {
        let index = RecordIndex::new();
        assert!(index.records_for_name("NOPE").is_empty());
        assert!(index.sorted_by_time("NOPE").is_empty());
        assert!(index.is_empty());
    }

    #[test]
    fn test_sorted_by_time_leaves_index_untouched() {
        let mut index = RecordIndex::new();
        for t in [50, 10, 30, 10] {
            index.append("P".to_string(), record(1, t));
        }

        let sorted: Vec<u32> = index.sorted_by_time("P").iter().map(|r| r.timestamp()).collect();
        assert_eq!(sorted, vec![10, 10, 30, 50]);

        let stored: Vec<u32> = index.records_for_name("P").iter().map(|r| r.timestamp()).collect();
        assert_eq!(stored, vec![50, 10, 30, 10]);
    }
}
