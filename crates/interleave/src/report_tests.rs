use super::*;
use interleave_core::{FakeClock, JobId, PpSet};
use std::path::PathBuf;

#[test]
fn empty_bug_list_reports_no_bugs_found() {
    let time = TimeOracle::start(FakeClock::new(), 1_000_000, 1);
    let report = format_report(&[], &time);
    assert!(report.contains("no bugs found"));
}

#[test]
fn each_bug_is_reported_with_its_config_and_trace() {
    let time = TimeOracle::start(FakeClock::new(), 1_000_000, 1);
    let bugs = vec![BugRecord {
        job_id: JobId::next(),
        trace_filename: PathBuf::from("trace.txt"),
        pp_set: PpSet::none(),
        log_filename: PathBuf::from("log.txt"),
    }];
    let report = format_report(&bugs, &time);
    assert!(report.contains("trace.txt"));
    assert!(report.contains("BUG job="));
}
