//! interleave-engine: job lifecycle and the work scheduler — the workqueue,
//! ETA-based admission/deprioritization policy, the child dialog, and
//! process/FIFO admission.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod admission;
pub mod display;
pub mod error;
pub mod scheduler;
pub mod worker;
pub mod workqueue;

pub use admission::{spawn, SpawnSpec, SpawnedChild};
pub use display::format_job_line;
pub use error::{EngineError, EngineResult};
pub use scheduler::{SchedulerConfig, SchedulerContext};
pub use worker::{child_config_for_race, run_dialog};
pub use workqueue::Workqueue;
