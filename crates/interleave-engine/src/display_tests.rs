use super::*;
use interleave_core::{JobConfig, PpId, PpSet};
use std::time::Duration;

fn mk_job() -> Job {
    let dir = std::env::temp_dir();
    Job::new(JobConfig::new(PpSet::from_members([PpId::MutexLock]), false, &dir))
}

#[test]
fn format_job_line_includes_config_percent_and_state() {
    let job = mk_job();
    {
        let mut stats = job.stats.write();
        stats.proportion = 0.5;
        stats.elapsed_branches = 42;
        stats.eta = Some(Duration::from_secs(90));
        stats.elapsed = Duration::from_secs(30);
    }
    let line = format_job_line(&job);
    assert!(line.contains("mutex_lock"));
    assert!(line.contains("50.0%"));
    assert!(line.contains("42 branches"));
    assert!(line.contains("state=running"));
}

#[test]
fn format_job_line_shows_question_mark_for_unstable_eta() {
    let job = mk_job();
    let line = format_job_line(&job);
    assert!(line.contains("ETA=?"));
}
