//! Time oracle: clock abstraction plus the driver's deadline/CPU accounting.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A clock that provides the current time. Abstracted so the time oracle can
/// be driven deterministically in tests.
pub trait Clock: Clone + Send + Sync + 'static {
    fn now(&self) -> Instant;
}

/// Real wall-clock time.
#[derive(Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Fake clock for deterministic tests.
#[derive(Clone)]
pub struct FakeClock {
    current: Arc<Mutex<Instant>>,
}

impl FakeClock {
    pub fn new() -> Self {
        Self { current: Arc::new(Mutex::new(Instant::now())) }
    }

    pub fn advance(&self, duration: Duration) {
        *self.current.lock() += duration;
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Instant {
        *self.current.lock()
    }
}

/// Decomposed human-friendly duration, with a distinguished "not yet
/// estimable" state used while an ETA estimator hasn't stabilized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HumanFriendlyTime {
    pub years: u64,
    pub days: u64,
    pub hours: u64,
    pub mins: u64,
    pub secs: u64,
    pub infinite: bool,
}

impl HumanFriendlyTime {
    pub const INFINITY: Self =
        Self { years: 0, days: 0, hours: 0, mins: 0, secs: 0, infinite: true };

    /// Decompose a microsecond duration into years/days/hours/minutes/seconds.
    pub fn from_usecs(usecs: u64) -> Self {
        let total_secs = usecs / 1_000_000;
        let secs = total_secs % 60;
        let total_mins = total_secs / 60;
        let mins = total_mins % 60;
        let total_hours = total_mins / 60;
        let hours = total_hours % 24;
        let total_days = total_hours / 24;
        let days = total_days % 365;
        let years = total_days / 365;
        Self { years, days, hours, mins, secs, infinite: false }
    }
}

impl std::fmt::Display for HumanFriendlyTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.infinite {
            return f.write_str("infinity");
        }
        if self.years > 0 {
            write!(f, "{}y{}d{}h{}m{}s", self.years, self.days, self.hours, self.mins, self.secs)
        } else if self.days > 0 {
            write!(f, "{}d{}h{}m{}s", self.days, self.hours, self.mins, self.secs)
        } else if self.hours > 0 {
            write!(f, "{}h{}m{}s", self.hours, self.mins, self.secs)
        } else if self.mins > 0 {
            write!(f, "{}m{}s", self.mins, self.secs)
        } else {
            write!(f, "{}s", self.secs)
        }
    }
}

/// Per-CPU accounting state: either idle, or actively occupied since some
/// instant (open interval), plus the accumulated closed-interval total.
#[derive(Debug, Clone, Copy)]
struct CpuAccount {
    busy_since: Option<Instant>,
    accumulated: Duration,
}

impl Default for CpuAccount {
    fn default() -> Self {
        Self { busy_since: None, accumulated: Duration::ZERO }
    }
}

/// Records the driver's epoch and deadline, and tracks per-CPU busy time for
/// CPU-saturation reporting.
pub struct TimeOracle<C: Clock> {
    clock: C,
    start: Instant,
    budget: Duration,
    cpus: Mutex<HashMap<u32, CpuAccount>>,
}

impl<C: Clock> TimeOracle<C> {
    /// Record epoch and budget. `num_cpus` seeds the accounting table so
    /// `total_cpu_time` is well-defined before any CPU is used.
    pub fn start(clock: C, max_usecs: u64, num_cpus: u32) -> Self {
        let now = clock.now();
        let mut cpus = HashMap::new();
        for i in 0..num_cpus {
            cpus.insert(i, CpuAccount::default());
        }
        Self { start: now, budget: Duration::from_micros(max_usecs), clock, cpus: Mutex::new(cpus) }
    }

    pub fn time_elapsed(&self) -> Duration {
        self.clock.now().saturating_duration_since(self.start)
    }

    /// The underlying clock's current instant, for timestamping events
    /// (e.g. when a bug was found) alongside duration-based accounting.
    pub fn now(&self) -> Instant {
        self.clock.now()
    }

    /// Zero iff the deadline has been reached.
    pub fn time_remaining(&self) -> Duration {
        self.budget.saturating_sub(self.time_elapsed())
    }

    pub fn deadline_reached(&self) -> bool {
        self.time_remaining() == Duration::ZERO
    }

    /// Bracket the period during which a running child occupies CPU `which`.
    /// Reentrancy on the same CPU (calling this twice without an intervening
    /// `stop_using_cpu`) is a caller bug and is a no-op here rather than a panic,
    /// matching the "forbidden" wording in the spec with a safe degrade.
    pub fn start_using_cpu(&self, which: u32) {
        let mut cpus = self.cpus.lock();
        let entry = cpus.entry(which).or_default();
        if entry.busy_since.is_none() {
            entry.busy_since = Some(self.clock.now());
        }
    }

    pub fn stop_using_cpu(&self, which: u32) {
        let mut cpus = self.cpus.lock();
        if let Some(entry) = cpus.get_mut(&which) {
            if let Some(since) = entry.busy_since.take() {
                entry.accumulated += self.clock.now().saturating_duration_since(since);
            }
        }
    }

    /// Sum, across all CPUs, of their active intervals. Open intervals count
    /// through now.
    pub fn total_cpu_time(&self) -> Duration {
        let now = self.clock.now();
        let cpus = self.cpus.lock();
        cpus.values().fold(Duration::ZERO, |acc, a| {
            let open = a.busy_since.map(|s| now.saturating_duration_since(s)).unwrap_or_default();
            acc + a.accumulated + open
        })
    }

    /// `total_cpu_time / (num_cpus * elapsed)`, for the final saturation report.
    pub fn cpu_saturation(&self) -> f64 {
        let num_cpus = self.cpus.lock().len().max(1) as f64;
        let elapsed = self.time_elapsed().as_secs_f64();
        if elapsed <= 0.0 {
            return 0.0;
        }
        self.total_cpu_time().as_secs_f64() / (num_cpus * elapsed)
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
