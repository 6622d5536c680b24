//! Bug registry: append-only record of configurations that produced a bug.

use crate::id::JobId;
use crate::ppset::PpSet;
use parking_lot::Mutex;
use std::path::PathBuf;

/// One recorded bug: the child's trace file, the configuration that found
/// it, and the captured stdout/stderr log.
#[derive(Debug, Clone)]
pub struct BugRecord {
    pub job_id: JobId,
    pub trace_filename: PathBuf,
    pub pp_set: PpSet,
    pub log_filename: PathBuf,
}

/// Append-only during a run; answers "is this configuration already known to
/// be buggy (or a superset of something that is)?" in a single linear scan.
#[derive(Default)]
pub struct BugRegistry {
    records: Mutex<Vec<BugRecord>>,
}

impl BugRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a bug record. Duplicate bugs (same or overlapping configs) are
    /// allowed; the list is never deduplicated.
    pub fn record(&self, record: BugRecord) {
        self.records.lock().push(record);
    }

    /// True iff any recorded entry's config is a subset of `config`.
    pub fn bug_already_found(&self, config: &PpSet) -> bool {
        self.records.lock().iter().any(|r| r.pp_set.subset(config))
    }

    /// Number of recorded bugs.
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of all records, for the shutdown report.
    pub fn snapshot(&self) -> Vec<BugRecord> {
        self.records.lock().clone()
    }

    /// Prints every record and returns whether any existed; used at
    /// shutdown. Printing is the caller's concern in this Rust rendition —
    /// the driver binary owns colour/formatting — so this just returns the
    /// snapshot alongside the boolean.
    pub fn found_any_bugs(&self) -> (bool, Vec<BugRecord>) {
        let records = self.snapshot();
        (!records.is_empty(), records)
    }
}

#[cfg(test)]
#[path = "bugs_tests.rs"]
mod tests;
