//! Job identity, static configuration, stats, and lifecycle state.

use crate::id::JobId;
use crate::ppset::PpSet;
use parking_lot::RwLock;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Static, immutable-after-construction configuration for one job.
#[derive(Debug, Clone)]
pub struct JobConfig {
    pub id: JobId,
    pub pp_set: PpSet,
    pub generation: u32,
    pub should_reproduce: bool,
    /// Compile-time macros handed to the child (a path to a generated file).
    pub config_static: PathBuf,
    /// Runtime tunables handed to the child (a path to a generated file).
    pub config_dynamic: PathBuf,
    pub log_stdout: PathBuf,
    pub log_stderr: PathBuf,
    pub fifo_in: PathBuf,
    pub fifo_out: PathBuf,
}

impl JobConfig {
    /// Build a fresh job config. `pp_set`'s own `generation()` becomes the
    /// job's generation.
    pub fn new(pp_set: PpSet, should_reproduce: bool, work_dir: &std::path::Path) -> Self {
        let id = JobId::next();
        let generation = pp_set.generation();
        let token: u64 = rand_token();
        let prefix = format!("il_{}_{:x}", id.get(), token);
        Self {
            id,
            generation,
            should_reproduce,
            config_static: work_dir.join(format!("{prefix}.static.cfg")),
            config_dynamic: work_dir.join(format!("{prefix}.dynamic.cfg")),
            log_stdout: work_dir.join(format!("{prefix}.stdout.log")),
            log_stderr: work_dir.join(format!("{prefix}.stderr.log")),
            fifo_in: work_dir.join(format!("{prefix}_in")),
            fifo_out: work_dir.join(format!("{prefix}_out")),
            pp_set,
        }
    }
}

/// A small non-cryptographic random token, used only to avoid FIFO/log
/// filename collisions across concurrent driver invocations sharing a
/// working directory.
fn rand_token() -> u64 {
    use std::collections::hash_map::RandomState;
    use std::hash::{BuildHasher, Hasher};
    RandomState::new().build_hasher().finish()
}

/// Writer = the job's own worker task. Readers = the scheduler and the
/// display thread, both via the read side of the lock.
#[derive(Debug, Clone)]
pub struct JobStats {
    pub elapsed_branches: u64,
    /// Estimated completion proportion in `[0, 1]`.
    pub proportion: f64,
    pub elapsed: Duration,
    /// Predicted remaining wall time, `None` until the estimator stabilizes.
    pub eta: Option<Duration>,
    pub cpu_time: Duration,
    /// Current ICB bound and the PP count observed at that bound, if
    /// iterative context bounding is active for this job.
    pub icb_bound: Option<u32>,
    pub icb_preemptions: Option<u32>,
}

impl Default for JobStats {
    fn default() -> Self {
        Self {
            elapsed_branches: 0,
            proportion: 0.0,
            elapsed: Duration::ZERO,
            eta: None,
            cpu_time: Duration::ZERO,
            icb_bound: None,
            icb_preemptions: None,
        }
    }
}

impl JobStats {
    /// Numeric ETA for comparisons; `None` (unstable) sorts as "worse to
    /// resume" than any stable value by the caller (see `compare_job_eta`).
    pub fn eta_usecs(&self) -> Option<u128> {
        self.eta.map(|d| d.as_micros())
    }
}

/// One of the three pseudostates a job can be in, per the scheduler's
/// workqueue. `Done` subsumes normal completion, crash, timeout and
/// cancellation — `JobOutcome` on `JobState` distinguishes them further.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Normal,
    Blocked,
    Done,
}

crate::simple_display! {
    Lifecycle {
        Normal => "normal",
        Blocked => "blocked",
        Done => "done",
    }
}

/// Terminal outcome of a job, set once it reaches `Lifecycle::Done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    /// Child exited normally with no bug found.
    Clean,
    /// `FOUND_A_BUG` was received.
    Bug,
    /// Cancelled before or during execution (superset pruning, shutdown, or
    /// explicit abort) without ever finding a bug itself.
    Cancelled,
    /// Deadline reached; ABORT was sent and the child exited (or was
    /// abandoned after the grace period).
    TimedOut,
    /// Non-zero exit with no `FOUND_A_BUG`, or a protocol error.
    Crashed,
}

/// Flags and bookkeeping mutated under the job's lifecycle mutex, mirroring
/// the source driver's `struct job` lifecycle fields.
#[derive(Debug, Clone)]
pub struct JobFlags {
    pub cancelled: bool,
    pub complete: bool,
    pub timed_out: bool,
    pub kill_job: bool,
    pub need_rerun: bool,
    pub trace_filename: Option<PathBuf>,
    pub bug_found_at: Option<Instant>,
    pub bug_found_cpu_time: Option<Duration>,
}

impl Default for JobFlags {
    fn default() -> Self {
        Self {
            cancelled: false,
            complete: false,
            timed_out: false,
            kill_job: false,
            need_rerun: false,
            trace_filename: None,
            bug_found_at: None,
            bug_found_cpu_time: None,
        }
    }
}

/// A job instance: static config plus the mutable state the scheduler and
/// the job's worker coordinate over.
pub struct Job {
    pub config: JobConfig,
    pub stats: RwLock<JobStats>,
    pub lifecycle: parking_lot::Mutex<Lifecycle>,
    pub flags: parking_lot::Mutex<JobFlags>,
}

impl Job {
    pub fn new(config: JobConfig) -> Self {
        Self {
            config,
            stats: RwLock::new(JobStats::default()),
            lifecycle: parking_lot::Mutex::new(Lifecycle::Normal),
            flags: parking_lot::Mutex::new(JobFlags::default()),
        }
    }

    pub fn id(&self) -> JobId {
        self.config.id
    }

    pub fn generation(&self) -> u32 {
        self.config.generation
    }

    pub fn priority(&self) -> i64 {
        self.config.pp_set.priority()
    }

    /// Snapshot of stats, cheap enough for the display thread to call per
    /// tick without holding the workqueue lock.
    pub fn stats_snapshot(&self) -> JobStats {
        self.stats.read().clone()
    }

    pub fn is_cancelled(&self) -> bool {
        self.flags.lock().cancelled
    }

    pub fn mark_cancelled(&self) {
        self.flags.lock().cancelled = true;
    }

    /// Deadline-triggered cancellation; distinguished from a plain cancel so
    /// the worker reports `JobOutcome::TimedOut` rather than `Cancelled`.
    pub fn mark_timed_out(&self) {
        let mut flags = self.flags.lock();
        flags.timed_out = true;
        flags.cancelled = true;
    }

    pub fn is_complete(&self) -> bool {
        self.flags.lock().complete
    }
}

/// `compare_job_eta(j0, j1)`: a job whose ETA is not yet stable compares as
/// worse to resume (greater) than any job with a stable ETA. Ties are broken
/// by generation (lower generation preferred).
pub fn compare_job_eta(j0: &Job, j1: &Job) -> std::cmp::Ordering {
    use std::cmp::Ordering;
    let e0 = j0.stats.read().eta_usecs();
    let e1 = j1.stats.read().eta_usecs();
    match (e0, e1) {
        (Some(a), Some(b)) => a.cmp(&b).then_with(|| j0.generation().cmp(&j1.generation())),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => j0.generation().cmp(&j1.generation()),
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
