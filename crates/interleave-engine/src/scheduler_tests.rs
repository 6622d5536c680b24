use super::*;
use interleave_core::{FakeClock, PpId};

fn mk_ctx() -> Arc<SchedulerContext<FakeClock>> {
    let config = SchedulerConfig {
        eta_factor: 2.0,
        eta_threshold: 32,
        num_cpus: 2,
        max_usecs: 1_000_000_000,
        trace_dir: None,
    };
    SchedulerContext::new(FakeClock::new(), config, std::env::temp_dir())
}

#[test]
fn add_work_cancels_job_that_is_already_a_known_bug_superset() {
    let ctx = mk_ctx();
    ctx.bugs.record(BugRecord {
        job_id: interleave_core::JobId::next(),
        trace_filename: "t".into(),
        pp_set: PpSet::none(),
        log_filename: "l".into(),
    });
    let job = Arc::new(Job::new(ctx.seed_config(PpSet::from_members([PpId::Cli]), false)));
    ctx.add_work(job.clone());
    assert!(job.is_cancelled());
    assert_eq!(ctx.workqueue.lock().pending_count(), 0);
}

#[test]
fn add_work_enqueues_a_clean_config() {
    let ctx = mk_ctx();
    let job = Arc::new(Job::new(ctx.seed_config(PpSet::none(), false)));
    ctx.add_work(job);
    assert_eq!(ctx.workqueue.lock().pending_count(), 1);
}

#[test]
fn should_deprioritize_is_false_until_sample_is_trusted_and_eta_is_bad() {
    let ctx = mk_ctx();
    let job = Arc::new(Job::new(ctx.seed_config(PpSet::none(), false)));
    assert!(!ctx.should_deprioritize(&job), "no progress sample yet");

    // Trusted sample, but ETA is well within budget: still no.
    ctx.on_progress(&job, 100, 0.5, 1_000_000, 2_000_000, None, None);
    assert!(!ctx.should_deprioritize(&job));

    // ETA now blows past eta_factor * time_remaining, but nothing pending
    // to give the slot to.
    ctx.on_progress(&job, 100, 0.01, 1_000_000, 10_000_000_000_000, None, None);
    assert!(!ctx.should_deprioritize(&job), "no admissible pending work");

    let waiting = Arc::new(Job::new(ctx.seed_config(PpSet::from_members([PpId::Cli]), false)));
    ctx.add_work(waiting);
    assert!(ctx.should_deprioritize(&job));
}

#[test]
fn on_bug_found_records_and_prunes_supersets() {
    let ctx = mk_ctx();
    let parent_set = PpSet::from_members([PpId::MutexLock]);
    let parent = Arc::new(Job::new(ctx.seed_config(parent_set.clone(), false)));
    let sibling = Arc::new(Job::new(
        ctx.seed_config(parent_set.union(&PpSet::from_members([PpId::Sti])), false),
    ));
    ctx.add_work(sibling.clone());

    ctx.on_bug_found(&parent, PathBuf::from("trace"), None, None);

    assert_eq!(ctx.bugs.len(), 1);
    assert!(sibling.is_cancelled());
}

#[test]
fn should_continue_reply_aborts_once_deadline_reached() {
    let config = SchedulerConfig {
        eta_factor: 2.0,
        eta_threshold: 32,
        num_cpus: 1,
        max_usecs: 0,
        trace_dir: None,
    };
    let ctx = SchedulerContext::new(FakeClock::new(), config, std::env::temp_dir());
    let job = Job::new(ctx.seed_config(PpSet::none(), false));
    assert_eq!(ctx.should_continue_reply(&job), Outbound::Abort);
}

#[test]
fn should_continue_reply_continues_when_nothing_is_wrong() {
    let ctx = mk_ctx();
    let job = Job::new(ctx.seed_config(PpSet::none(), false));
    assert_eq!(ctx.should_continue_reply(&job), Outbound::Continue);
}
