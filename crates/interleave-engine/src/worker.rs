//! The per-job dialog: reads `Inbound` messages from a child and reacts,
//! writing `Outbound` replies. Generic over the transport so it can be
//! driven by real FIFOs or, in tests, an in-memory duplex pair.

use crate::error::{EngineError, EngineResult};
use crate::scheduler::SchedulerContext;
use interleave_core::{Clock, Job, JobConfig, JobOutcome, PpId, PpSet};
use interleave_wire::{read_typed, write_typed, Inbound, Outbound};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, info, warn};

/// Holds the job's CPU-accounting slot, releasing it (stopping the time
/// oracle's clock for that index) whenever the slot isn't held — across a
/// SUSPEND window, or on drop at the end of the dialog.
struct CpuSlot<'a, C: Clock> {
    ctx: &'a SchedulerContext<C>,
    slot: Option<u32>,
}

impl<'a, C: Clock> CpuSlot<'a, C> {
    fn acquire(ctx: &'a SchedulerContext<C>) -> Self {
        let slot = ctx.acquire_cpu_slot();
        if let Some(s) = slot {
            ctx.time.start_using_cpu(s);
        }
        Self { ctx, slot }
    }

    fn release(&mut self) {
        if let Some(s) = self.slot.take() {
            self.ctx.time.stop_using_cpu(s);
            self.ctx.release_cpu_slot(s);
        }
    }

    fn reacquire(&mut self) {
        if self.slot.is_none() {
            self.slot = self.ctx.acquire_cpu_slot();
            if let Some(s) = self.slot {
                self.ctx.time.start_using_cpu(s);
            }
        }
    }
}

impl<C: Clock> Drop for CpuSlot<'_, C> {
    fn drop(&mut self) {
        self.release();
    }
}

/// Run one job's dialog to completion (clean hangup, ABORT, or a protocol
/// error). Returns the outcome to record against the job.
pub async fn run_dialog<R, W, C>(
    job: Arc<Job>,
    ctx: Arc<SchedulerContext<C>>,
    mut reader: R,
    mut writer: W,
) -> EngineResult<JobOutcome>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
    C: Clock,
{
    match read_typed::<_, Inbound>(&mut reader).await {
        Ok(Inbound::Hello { child_pid, protocol_version }) => {
            debug!(job_id = %job.id(), child_pid, protocol_version, "handshake complete");
        }
        Ok(other) => {
            return Err(EngineError::ProtocolViolation {
                job_id: job.id().get(),
                got: inbound_tag(&other),
            });
        }
        Err(e) => {
            // Child exited (or the pipe broke) before sending any useful
            // state; worth a rerun rather than treating it as a stable crash.
            job.flags.lock().need_rerun = true;
            return Err(e.into());
        }
    }

    let mut cpu = CpuSlot::acquire(&ctx);
    let mut seen_eips: HashSet<u64> = HashSet::new();

    loop {
        if job.is_cancelled() {
            write_typed(&mut writer, &Outbound::Abort).await?;
            return Ok(JobOutcome::Cancelled);
        }

        let msg = match read_typed::<_, Inbound>(&mut reader).await {
            Ok(m) => m,
            Err(interleave_wire::WireError::Io(e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                return Ok(job_eof_outcome(&job));
            }
            Err(e) => return Err(e.into()),
        };

        match msg {
            Inbound::Hello { .. } => {
                warn!(job_id = %job.id(), "unexpected second HELLO, ignoring");
            }

            Inbound::Progress {
                elapsed_branches,
                proportion,
                elapsed_usecs,
                total_estimate_usecs,
                icb_preemption_count,
                icb_bound,
            } => {
                ctx.on_progress(
                    &job,
                    elapsed_branches,
                    proportion,
                    elapsed_usecs,
                    total_estimate_usecs,
                    icb_preemption_count,
                    icb_bound,
                );

                if ctx.should_deprioritize(&job) {
                    write_typed(&mut writer, &Outbound::Suspend).await?;
                    cpu.release();
                    let signal = ctx.deprioritize(&job);
                    info!(job_id = %job.id(), "suspended, moved to deprioritized");
                    signal.notified().await;
                    if job.is_cancelled() {
                        write_typed(&mut writer, &Outbound::Abort).await?;
                        return Ok(job_eof_outcome(&job));
                    }
                    cpu.reacquire();
                    write_typed(&mut writer, &Outbound::Resume).await?;
                    info!(job_id = %job.id(), "resumed from deprioritized");
                } else {
                    write_typed(&mut writer, &Outbound::EstimateReply { slept_usecs: 0 }).await?;
                }
            }

            Inbound::DataRace {
                eip,
                last_call_site,
                tid,
                most_recent_syscall,
                confirmed,
                deterministic,
                free_re_malloc,
            } => {
                info!(
                    job_id = %job.id(),
                    eip,
                    last_call_site,
                    tid,
                    confirmed,
                    deterministic,
                    free_re_malloc,
                    syscall = most_recent_syscall.as_deref().unwrap_or("-"),
                    "data race reported"
                );
                if seen_eips.insert(eip) {
                    ctx.on_data_race(&job, eip);
                } else {
                    debug!(job_id = %job.id(), eip, "duplicate race eip, not spawning again");
                }
            }

            Inbound::FoundABug { trace_filename, icb_preemptions, icb_bound } => {
                info!(job_id = %job.id(), trace_filename, "bug found");
                ctx.on_bug_found(&job, trace_filename.into(), icb_preemptions, icb_bound);
            }

            Inbound::AssertFail { file, line, function, message } => {
                warn!(job_id = %job.id(), file, line, function, message, "child assertion failed");
                ctx.on_assert_fail(&job);
                write_typed(&mut writer, &Outbound::Abort).await?;
                return Ok(job_eof_outcome(&job));
            }

            Inbound::ShouldContinue => {
                let reply = ctx.should_continue_reply(&job);
                write_typed(&mut writer, &reply).await?;
                if matches!(reply, Outbound::Abort) {
                    return Ok(job_eof_outcome(&job));
                }
            }
        }
    }
}

fn inbound_tag(msg: &Inbound) -> &'static str {
    match msg {
        Inbound::Hello { .. } => "HELLO",
        Inbound::Progress { .. } => "PROGRESS",
        Inbound::DataRace { .. } => "DATA_RACE",
        Inbound::FoundABug { .. } => "FOUND_A_BUG",
        Inbound::AssertFail { .. } => "ASSERT_FAIL",
        Inbound::ShouldContinue => "SHOULD_CONTINUE",
    }
}

fn job_eof_outcome(job: &Job) -> JobOutcome {
    let flags = job.flags.lock();
    if flags.bug_found_at.is_some() {
        JobOutcome::Bug
    } else if flags.timed_out {
        JobOutcome::TimedOut
    } else if flags.cancelled {
        JobOutcome::Cancelled
    } else if flags.kill_job {
        JobOutcome::Crashed
    } else {
        JobOutcome::Clean
    }
}

/// Build the next-generation job config for a newly observed data race PP,
/// tagging its generation with the *parent's* generation (see `ppset.rs`)
/// so the union's generation is exactly `parent.generation() + 1`.
pub fn child_config_for_race(parent: &Job, eip: u64, work_dir: &std::path::Path) -> JobConfig {
    let race_pp = PpId::DataRace { eip, generation: parent.generation() };
    let child_set = parent.config.pp_set.union(&PpSet::from_members([race_pp]));
    JobConfig::new(child_set, true, work_dir)
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;
