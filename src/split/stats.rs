//! Counters collected while routing.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::model::Bucket;

/// Totals for one output archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputStats {
    /// Bucket that first resolved to this file.
    pub bucket: Bucket,
    pub records: u64,
    pub bytes: u64,
}

/// Summary of a run, keyed by output filename.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SplitStats {
    pub total_records: u64,
    pub total_bytes: u64,
    pub outputs: BTreeMap<String, OutputStats>,
}

impl SplitStats {
    /// Count one record of `bytes` routed to `filename`.
    pub fn record(&mut self, filename: &str, bucket: &Bucket, bytes: u64) {
        self.total_records += 1;
        self.total_bytes += bytes;
        let entry = self
            .outputs
            .entry(filename.to_string())
            .or_insert_with(|| OutputStats {
                bucket: bucket.clone(),
                records: 0,
                bytes: 0,
            });
        entry.records += 1;
        entry.bytes += bytes;
    }

    /// Records routed to `filename` during the run.
    pub fn records_in(&self, filename: &str) -> u64 {
        self.outputs.get(filename).map_or(0, |o| o.records)
    }

    /// Number of distinct custom-label archives.
    pub fn custom_outputs(&self) -> usize {
        self.outputs.values().filter(|o| !o.bucket.is_system()).count()
    }
}
