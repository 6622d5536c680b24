//! interleave-core: PP set algebra, job data model, time oracle, and the
//! bug registry for the iterative-deepening concurrency checker driver.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod macros;

pub mod bugs;
pub mod clock;
pub mod config;
pub mod id;
pub mod job;
pub mod ppset;

pub use bugs::{BugRecord, BugRegistry};
pub use clock::{Clock, FakeClock, HumanFriendlyTime, SystemClock, TimeOracle};
pub use id::JobId;
pub use job::{compare_job_eta, Job, JobConfig, JobFlags, JobOutcome, JobStats, Lifecycle};
pub use ppset::{PpId, PpSet};
