//! Scheduler tuning knobs shared between the engine and the CLI surface.

/// Elapsed branches an ETA sample needs before it's trusted for
/// deprioritization decisions (`-E`).
pub const DEFAULT_ETA_THRESHOLD: u64 = 32;

/// ETA is deprioritization-worthy once it exceeds `eta_factor *
/// time_remaining()` (`-e`).
pub const DEFAULT_ETA_FACTOR: f64 = 2.0;

/// The CLI's minimum time budget clamp: 10 minutes.
pub const MIN_TIME_BUDGET_USECS: u64 = 10 * 60 * 1_000_000;
