//! The scheduler's three logical queues: Pending, Running, Deprioritized.
//! A job is in exactly one at any time; Done jobs are simply removed.

use interleave_core::{BugRegistry, Job, JobId, PpSet};
use std::sync::Arc;

/// Single global mutex guards all three queues (see lock-order note in the
/// engine's `scheduler` module).
#[derive(Default)]
pub struct Workqueue {
    pending: Vec<Arc<Job>>,
    running: Vec<Arc<Job>>,
    deprioritized: Vec<Arc<Job>>,
}

impl Workqueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert into Pending, ordered by `(generation ascending, priority
    /// descending)`.
    pub fn add_pending(&mut self, job: Arc<Job>) {
        let pos = self
            .pending
            .partition_point(|j| pending_key(j) <= pending_key(&job));
        self.pending.insert(pos, job);
    }

    pub fn running_count(&self) -> usize {
        self.running.len()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn deprioritized_count(&self) -> usize {
        self.deprioritized.len()
    }

    /// Pop the best admissible Pending job: lowest generation, then highest
    /// priority, skipping (and cancelling) any job whose config is already a
    /// bug superset. Cancelled jobs are returned alongside so the caller can
    /// dispose of them without spawning.
    pub fn pop_best_pending(&mut self, bugs: &BugRegistry) -> (Option<Arc<Job>>, Vec<Arc<Job>>) {
        let mut cancelled = Vec::new();
        loop {
            if self.pending.is_empty() {
                return (None, cancelled);
            }
            let job = self.pending.remove(0);
            if bugs.bug_already_found(&job.config.pp_set) {
                job.mark_cancelled();
                cancelled.push(job);
                continue;
            }
            return (Some(job), cancelled);
        }
    }

    /// True iff some Pending job is not (yet known to be) a bug superset.
    /// Used by the ETA deprioritization decision: a running job is only
    /// suspended if doing so can make room for genuinely admissible work.
    pub fn has_admissible_pending(&self, bugs: &BugRegistry) -> bool {
        self.pending.iter().any(|j| !bugs.bug_already_found(&j.config.pp_set))
    }

    pub fn move_to_running(&mut self, job: Arc<Job>) {
        self.running.push(job);
    }

    pub fn remove_running(&mut self, id: JobId) -> Option<Arc<Job>> {
        let pos = self.running.iter().position(|j| j.id() == id)?;
        Some(self.running.remove(pos))
    }

    pub fn move_running_to_deprioritized(&mut self, id: JobId) -> Option<Arc<Job>> {
        let job = self.remove_running(id)?;
        let pos = self
            .deprioritized
            .partition_point(|j| eta_key(j) <= eta_key(&job));
        self.deprioritized.insert(pos, job.clone());
        Some(job)
    }

    /// Pop the smallest-ETA Deprioritized job, to resume it.
    pub fn pop_best_deprioritized(&mut self) -> Option<Arc<Job>> {
        if self.deprioritized.is_empty() {
            return None;
        }
        Some(self.deprioritized.remove(0))
    }

    /// Scan Pending and Deprioritized, cancelling every job whose config is
    /// a superset of `buggy`. Returns the cancelled jobs (still present in
    /// their queues; the caller/worker observes `cancelled` at its next
    /// checkpoint and removes itself).
    pub fn cancel_supersets_of(&mut self, buggy: &PpSet) -> Vec<Arc<Job>> {
        let mut hit = Vec::new();
        for job in self.pending.iter().chain(self.deprioritized.iter()) {
            if buggy.subset(&job.config.pp_set) && !job.is_cancelled() {
                job.mark_cancelled();
                hit.push(job.clone());
            }
        }
        hit
    }

    pub fn all_running(&self) -> Vec<Arc<Job>> {
        self.running.clone()
    }

    pub fn all_pending(&self) -> Vec<Arc<Job>> {
        self.pending.clone()
    }

    pub fn all_deprioritized(&self) -> Vec<Arc<Job>> {
        self.deprioritized.clone()
    }

    pub fn drain_pending(&mut self) -> Vec<Arc<Job>> {
        std::mem::take(&mut self.pending)
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty() && self.running.is_empty() && self.deprioritized.is_empty()
    }
}

fn pending_key(job: &Job) -> (u32, std::cmp::Reverse<i64>) {
    (job.generation(), std::cmp::Reverse(job.priority()))
}

fn eta_key(job: &Job) -> Option<u128> {
    job.stats.read().eta_usecs()
}

#[cfg(test)]
#[path = "workqueue_tests.rs"]
mod tests;
