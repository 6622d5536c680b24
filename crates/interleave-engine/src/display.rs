//! Per-job progress line formatting: `[jobid gen] config — P% (branches)
//! ETA=eta elapsed=elapsed state=state`.

use interleave_core::{HumanFriendlyTime, Job, Lifecycle};

pub fn format_job_line(job: &Job) -> String {
    let stats = job.stats_snapshot();
    let state = *job.lifecycle.lock();
    let eta = match stats.eta {
        Some(d) => HumanFriendlyTime::from_usecs(d.as_micros() as u64).to_string(),
        None => "?".to_string(),
    };
    let elapsed = HumanFriendlyTime::from_usecs(stats.elapsed.as_micros() as u64);
    format!(
        "[{} g{}] {} \u{2014} {:.1}% ({} branches) ETA={} elapsed={} state={}",
        job.id(),
        job.generation(),
        job.config.pp_set,
        stats.proportion * 100.0,
        stats.elapsed_branches,
        eta,
        elapsed,
        display_state(state),
    )
}

fn display_state(state: Lifecycle) -> &'static str {
    match state {
        Lifecycle::Normal => "running",
        Lifecycle::Blocked => "blocked",
        Lifecycle::Done => "done",
    }
}

#[cfg(test)]
#[path = "display_tests.rs"]
mod tests;
