//! Messaging protocol: the typed request/response dialog between the driver
//! and a child simulator process.

use serde::{Deserialize, Serialize};

/// Messages the child sends to the driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Inbound {
    /// Completes the handshake; the driver marks the job ready.
    Hello { child_pid: u32, protocol_version: u32 },

    /// A progress sample. `proportion` is in `[0, 1]`.
    Progress {
        elapsed_branches: u64,
        proportion: f64,
        elapsed_usecs: u64,
        total_estimate_usecs: u64,
        icb_preemption_count: Option<u32>,
        icb_bound: Option<u32>,
    },

    /// A suspected or confirmed data race.
    DataRace {
        eip: u64,
        last_call_site: u64,
        tid: u32,
        most_recent_syscall: Option<String>,
        confirmed: bool,
        deterministic: bool,
        free_re_malloc: bool,
    },

    /// A bug was found; `trace_filename` names the child's persisted trace.
    FoundABug { trace_filename: String, icb_preemptions: Option<u32>, icb_bound: Option<u32> },

    /// The child's own assertion failed (not a found bug).
    AssertFail { file: String, line: u32, function: String, message: String },

    /// The child is asking whether it should keep running.
    ShouldContinue,
}

/// Messages the driver sends to the child.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Outbound {
    /// The child must quiesce at its next safe PP and then signal blocked.
    Suspend,
    /// Undo a prior `Suspend`.
    Resume,
    /// The child must exit as soon as practical.
    Abort,
    /// Reply to `ShouldContinue` when the scheduler decides the job may keep
    /// running.
    Continue,
    /// Sent after a `Progress` sample to tell the child it was put to sleep
    /// for accounting purposes, correcting its own ETA estimate.
    EstimateReply { slept_usecs: u64 },
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
