//! Scheduler state shared by every job's worker: the workqueue, the bug
//! registry, the time oracle, and the ETA-based deprioritization policy.
//!
//! Lock order (narrowest scope first, to avoid deadlock): workqueue mutex,
//! then a job's lifecycle mutex, then its stats rwlock, then the bug
//! registry mutex. No code path may acquire them out of this order.

use crate::workqueue::Workqueue;
use interleave_core::{BugRecord, BugRegistry, Clock, Job, JobConfig, JobId, PpSet, TimeOracle};
use interleave_wire::{move_file_to, Outbound};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

/// Tunables pulled from CLI flags; defaults come from `interleave_core::config`.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub eta_factor: f64,
    pub eta_threshold: u64,
    pub num_cpus: u32,
    pub max_usecs: u64,
    /// When set, a found bug's trace file is relocated here on discovery.
    pub trace_dir: Option<PathBuf>,
}

pub struct SchedulerContext<C: Clock> {
    pub workqueue: Mutex<Workqueue>,
    pub bugs: BugRegistry,
    pub time: TimeOracle<C>,
    pub config: SchedulerConfig,
    pub work_dir: PathBuf,
    /// Woken whenever the workqueue or bug registry changes state the
    /// dispatch loop should react to (new pending work, a slot freed up, a
    /// bug recorded).
    pub wake: Notify,
    running_count: AtomicU32,
    /// Per-job tasks admitted but not yet reported as finished, including
    /// ones currently parked in `suspended` — distinct from `running_count`,
    /// which only counts CPU-resident (non-suspended) jobs.
    outstanding_tasks: AtomicU32,
    free_cpu_slots: Mutex<Vec<u32>>,
    /// One `Notify` per job currently blocked after acknowledging SUSPEND,
    /// woken by `wake_suspended`/`wake_all_suspended` on resume or shutdown.
    suspended: Mutex<HashMap<JobId, Arc<Notify>>>,
}

impl<C: Clock> SchedulerContext<C> {
    pub fn new(clock: C, config: SchedulerConfig, work_dir: PathBuf) -> Arc<Self> {
        let time = TimeOracle::start(clock, config.max_usecs, config.num_cpus);
        let free_cpu_slots = Mutex::new((0..config.num_cpus).collect());
        Arc::new(Self {
            workqueue: Mutex::new(Workqueue::new()),
            bugs: BugRegistry::new(),
            time,
            config,
            work_dir,
            wake: Notify::new(),
            running_count: AtomicU32::new(0),
            outstanding_tasks: AtomicU32::new(0),
            free_cpu_slots,
            suspended: Mutex::new(HashMap::new()),
        })
    }

    /// Claim one CPU index for accounting, or `None` if all are in use
    /// (shouldn't happen if admission respects `running_count < num_cpus`).
    pub fn acquire_cpu_slot(&self) -> Option<u32> {
        self.free_cpu_slots.lock().pop()
    }

    pub fn release_cpu_slot(&self, which: u32) {
        self.free_cpu_slots.lock().push(which);
    }

    /// Seed a job into Pending and wake the dispatch loop.
    pub fn add_work(&self, job: Arc<Job>) {
        if self.bugs.bug_already_found(&job.config.pp_set) {
            job.mark_cancelled();
            return;
        }
        self.workqueue.lock().add_pending(job);
        self.wake.notify_one();
    }

    pub fn mark_running(&self, job: &Arc<Job>) {
        self.workqueue.lock().move_to_running(job.clone());
        self.running_count.fetch_add(1, Ordering::Relaxed);
        *job.lifecycle.lock() = interleave_core::Lifecycle::Normal;
    }

    pub fn mark_finished(&self, id: interleave_core::JobId) {
        let mut wq = self.workqueue.lock();
        if wq.remove_running(id).is_some() {
            drop(wq);
            self.running_count.fetch_sub(1, Ordering::Relaxed);
            self.wake.notify_one();
        }
    }

    pub fn running_count(&self) -> u32 {
        self.running_count.load(Ordering::Relaxed)
    }

    pub fn task_started(&self) {
        self.outstanding_tasks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn task_finished(&self) {
        self.outstanding_tasks.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn outstanding_tasks(&self) -> u32 {
        self.outstanding_tasks.load(Ordering::Relaxed)
    }

    /// Move a Running job to Deprioritized (called once its worker has sent
    /// SUSPEND) and park a `Notify` for its worker to await. Frees the
    /// job's CPU slot for admission purposes immediately.
    pub fn deprioritize(&self, job: &Arc<Job>) -> Arc<Notify> {
        self.workqueue.lock().move_running_to_deprioritized(job.id());
        self.running_count.fetch_sub(1, Ordering::Relaxed);
        *job.lifecycle.lock() = interleave_core::Lifecycle::Blocked;
        let signal = Arc::new(Notify::new());
        self.suspended.lock().insert(job.id(), signal.clone());
        self.wake.notify_one();
        signal
    }

    /// Wake one suspended job's worker so it can send RESUME (or, if it
    /// finds itself cancelled in the meantime, ABORT instead).
    pub fn wake_suspended(&self, id: JobId) {
        if let Some(signal) = self.suspended.lock().remove(&id) {
            signal.notify_one();
        }
    }

    /// Wake every suspended job's worker, used on shutdown/timeout so none
    /// are left parked forever.
    pub fn wake_all_suspended(&self) {
        for (_, signal) in self.suspended.lock().drain() {
            signal.notify_one();
        }
    }

    /// Whether a running job at `num_cpus` capacity should be suspended to
    /// make room: its ETA exceeds `eta_factor * time_remaining()`, its
    /// sample is trusted (enough elapsed branches), and there is genuinely
    /// admissible pending work waiting.
    pub fn should_deprioritize(&self, job: &Job) -> bool {
        let stats = job.stats.read();
        if stats.elapsed_branches < self.config.eta_threshold {
            return false;
        }
        let Some(eta) = stats.eta else { return false };
        drop(stats);
        let remaining = self.time.time_remaining();
        if eta.as_secs_f64() <= self.config.eta_factor * remaining.as_secs_f64() {
            return false;
        }
        self.workqueue.lock().has_admissible_pending(&self.bugs)
    }

    pub fn on_progress(
        &self,
        job: &Arc<Job>,
        elapsed_branches: u64,
        proportion: f64,
        elapsed_usecs: u64,
        total_estimate_usecs: u64,
        icb_preemption_count: Option<u32>,
        icb_bound: Option<u32>,
    ) {
        let mut stats = job.stats.write();
        stats.elapsed_branches = elapsed_branches;
        stats.proportion = proportion.clamp(0.0, 1.0);
        stats.elapsed = Duration::from_micros(elapsed_usecs);
        stats.eta = total_estimate_usecs
            .checked_sub(elapsed_usecs)
            .map(Duration::from_micros);
        if icb_bound.is_some() {
            stats.icb_bound = icb_bound;
        }
        if icb_preemption_count.is_some() {
            stats.icb_preemptions = icb_preemption_count;
        }
        drop(stats);
        self.wake.notify_one();
    }

    pub fn on_data_race(&self, job: &Job, eip: u64) {
        let child = crate::worker::child_config_for_race(job, eip, &self.work_dir);
        self.add_work(Arc::new(Job::new(child)));
    }

    pub fn on_bug_found(
        &self,
        job: &Job,
        trace_filename: PathBuf,
        icb_preemptions: Option<u32>,
        icb_bound: Option<u32>,
    ) {
        let trace_filename = match &self.config.trace_dir {
            Some(dir) => match move_file_to(&trace_filename, dir) {
                Ok(moved) => moved,
                Err(e) => {
                    tracing::warn!(job_id = %job.id(), error = %e, "failed to relocate trace file");
                    trace_filename
                }
            },
            None => trace_filename,
        };
        {
            let mut flags = job.flags.lock();
            flags.bug_found_at = Some(self.time.now());
            flags.trace_filename = Some(trace_filename.clone());
        }
        {
            let mut stats = job.stats.write();
            stats.icb_bound = icb_bound.or(stats.icb_bound);
            stats.icb_preemptions = icb_preemptions.or(stats.icb_preemptions);
        }
        self.bugs.record(BugRecord {
            job_id: job.id(),
            trace_filename,
            pp_set: job.config.pp_set.clone(),
            log_filename: job.config.log_stdout.clone(),
        });
        let cancelled = self.workqueue.lock().cancel_supersets_of(&job.config.pp_set);
        for c in &cancelled {
            tracing::info!(job_id = %c.id(), "cancelled, superset of a known bug");
            self.wake_suspended(c.id());
        }
        self.wake.notify_waiters();
    }

    pub fn on_assert_fail(&self, job: &Job) {
        job.flags.lock().kill_job = true;
    }

    /// Reply to the child's `SHOULD_CONTINUE`: `Abort` if the job is
    /// cancelled, the deadline is reached, or its own config is already a
    /// known bug superset; `Continue` otherwise.
    pub fn should_continue_reply(&self, job: &Job) -> Outbound {
        if job.is_cancelled()
            || self.time.deadline_reached()
            || self.bugs.bug_already_found(&job.config.pp_set)
        {
            Outbound::Abort
        } else {
            Outbound::Continue
        }
    }

    pub fn seed_config(&self, pp_set: PpSet, should_reproduce: bool) -> JobConfig {
        JobConfig::new(pp_set, should_reproduce, &self.work_dir)
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
