use super::*;
use interleave_core::{JobConfig, PpId, PpSet};
use std::time::Duration;

fn mk_job(pp_set: PpSet) -> Arc<Job> {
    let dir = std::env::temp_dir();
    Arc::new(Job::new(JobConfig::new(pp_set, false, &dir)))
}

fn with_eta(job: &Arc<Job>, usecs: u64) {
    job.stats.write().eta = Some(Duration::from_micros(usecs));
}

#[test]
fn pending_orders_by_generation_then_priority() {
    let mut wq = Workqueue::new();
    let gen1 = mk_job(PpSet::from_members([PpId::MutexLock])); // generation 1
    let gen0_low = mk_job(PpSet::from_members([PpId::MutexUnlock])); // generation 0, priority 10
    let gen0_high = mk_job(PpSet::from_members([PpId::Cli])); // generation 0, priority 40

    wq.add_pending(gen1.clone());
    wq.add_pending(gen0_low.clone());
    wq.add_pending(gen0_high.clone());

    let order: Vec<_> = wq.all_pending().iter().map(|j| j.id()).collect();
    assert_eq!(order, vec![gen0_high.id(), gen0_low.id(), gen1.id()]);
}

#[test]
fn pop_best_pending_skips_and_cancels_bug_supersets() {
    let mut wq = Workqueue::new();
    let bugs = BugRegistry::new();
    let buggy_super = mk_job(PpSet::from_members([PpId::MutexLock, PpId::MutexUnlock]));
    let clean = mk_job(PpSet::from_members([PpId::Cli]));
    bugs.record(interleave_core::BugRecord {
        job_id: JobId::next(),
        trace_filename: "t".into(),
        pp_set: PpSet::from_members([PpId::MutexLock]),
        log_filename: "l".into(),
    });

    wq.add_pending(buggy_super.clone());
    wq.add_pending(clean.clone());

    let (popped, cancelled) = wq.pop_best_pending(&bugs);
    assert_eq!(cancelled.len(), 1);
    assert_eq!(cancelled[0].id(), buggy_super.id());
    assert!(buggy_super.is_cancelled());
    assert_eq!(popped.expect("one admissible job").id(), clean.id());
}

#[test]
fn deprioritized_orders_by_eta_ascending_with_none_last() {
    let mut wq = Workqueue::new();
    let slow = mk_job(PpSet::none());
    let fast = mk_job(PpSet::none());
    let unstable = mk_job(PpSet::none());
    with_eta(&slow, 1000);
    with_eta(&fast, 10);
    // unstable keeps eta = None

    wq.move_to_running(slow.clone());
    wq.move_to_running(fast.clone());
    wq.move_to_running(unstable.clone());
    wq.move_running_to_deprioritized(slow.id());
    wq.move_running_to_deprioritized(fast.id());
    wq.move_running_to_deprioritized(unstable.id());

    let order: Vec<_> = wq.all_deprioritized().iter().map(|j| j.id()).collect();
    assert_eq!(order, vec![fast.id(), slow.id(), unstable.id()]);
}

#[test]
fn pop_best_deprioritized_returns_smallest_eta_first() {
    let mut wq = Workqueue::new();
    let a = mk_job(PpSet::none());
    let b = mk_job(PpSet::none());
    with_eta(&a, 500);
    with_eta(&b, 50);
    wq.move_to_running(a.clone());
    wq.move_to_running(b.clone());
    wq.move_running_to_deprioritized(a.id());
    wq.move_running_to_deprioritized(b.id());

    let popped = wq.pop_best_deprioritized().expect("non-empty");
    assert_eq!(popped.id(), b.id());
    assert_eq!(wq.deprioritized_count(), 1);
}

#[test]
fn cancel_supersets_of_hits_pending_and_deprioritized_only() {
    let mut wq = Workqueue::new();
    let buggy = PpSet::from_members([PpId::MutexLock]);
    let pending_super = mk_job(PpSet::from_members([PpId::MutexLock, PpId::MutexUnlock]));
    let pending_unrelated = mk_job(PpSet::from_members([PpId::Cli]));
    let running_super = mk_job(PpSet::from_members([PpId::MutexLock, PpId::Cli]));

    wq.add_pending(pending_super.clone());
    wq.add_pending(pending_unrelated.clone());
    wq.move_to_running(running_super.clone());

    let cancelled = wq.cancel_supersets_of(&buggy);
    assert_eq!(cancelled.len(), 1);
    assert_eq!(cancelled[0].id(), pending_super.id());
    assert!(!pending_unrelated.is_cancelled());
    assert!(!running_super.is_cancelled(), "running jobs are not touched here");
}

#[test]
fn has_admissible_pending_is_false_once_everything_is_pruned() {
    let mut wq = Workqueue::new();
    let bugs = BugRegistry::new();
    let job = mk_job(PpSet::from_members([PpId::MutexLock]));
    wq.add_pending(job);
    assert!(wq.has_admissible_pending(&bugs));

    bugs.record(interleave_core::BugRecord {
        job_id: JobId::next(),
        trace_filename: "t".into(),
        pp_set: PpSet::none(),
        log_filename: "l".into(),
    });
    assert!(!wq.has_admissible_pending(&bugs));
}
