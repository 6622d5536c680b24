//! The driver's own dispatch loop: admits Pending jobs up to the CPU budget,
//! resumes Deprioritized jobs by ETA, prints periodic progress, and shuts
//! everything down on deadline or cancellation. ETA-based deprioritization
//! itself is decided inline by each job's worker on every PROGRESS message
//! (see `interleave_engine::worker::run_dialog`); this loop only reacts to
//! the resulting queue transitions.

use interleave_core::{Job, JobOutcome, SystemClock};
use interleave_engine::{admission, format_job_line, SchedulerContext};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{info, warn};

/// One admitted job's terminal report, sent back to the dispatch loop so it
/// can free a CPU slot.
struct Finished {
    id: interleave_core::JobId,
    outcome: JobOutcome,
}

/// Run the dispatch loop until the time budget is exhausted, a shutdown is
/// requested, or (in control/verification mode) the single seeded job
/// finishes. `program` is the simulator binary to launch for each job.
pub async fn run(
    ctx: Arc<SchedulerContext<SystemClock>>,
    program: PathBuf,
    leave_logs: bool,
    interval_secs: u64,
    mut shutdown: mpsc::Receiver<()>,
) {
    let (done_tx, mut done_rx) = mpsc::channel::<Finished>(64);
    let interval = Duration::from_secs(interval_secs.max(1));
    let mut last_display = Instant::now();
    let mut timed_out = false;

    loop {
        if ctx.time.deadline_reached() {
            info!("time budget exhausted, winding down");
            timed_out = true;
            break;
        }

        while ctx.running_count() < ctx.config.num_cpus {
            let (job, cancelled) = {
                let mut wq = ctx.workqueue.lock();
                wq.pop_best_pending(&ctx.bugs)
            };
            for c in cancelled {
                info!(job_id = %c.id(), "pruned before admission (bug superset)");
            }
            let Some(job) = job else { break };
            admit(ctx.clone(), job, program.clone(), leave_logs, done_tx.clone());
        }

        // The admission loop above already admitted every admissible Pending
        // job it could; a slot still free here means Pending is empty (or
        // exhausted to supersets), so the next-best use of it is the
        // lowest-ETA Deprioritized job, per the admission preference order.
        if ctx.running_count() < ctx.config.num_cpus {
            let resumed = ctx.workqueue.lock().pop_best_deprioritized();
            match resumed {
                Some(job) => {
                    ctx.mark_running(&job);
                    ctx.wake_suspended(job.id());
                    info!(job_id = %job.id(), "resuming deprioritized job");
                }
                None if ctx.outstanding_tasks() == 0 => {
                    info!("no pending, running, or deprioritized work left");
                    break;
                }
                None => {
                    // Every running job is mid-SUSPEND-handshake; wait for one
                    // to actually land in Deprioritized.
                }
            }
        }

        tokio::select! {
            _ = shutdown.recv() => {
                warn!("shutdown requested");
                break;
            }
            finished = done_rx.recv() => {
                if let Some(f) = finished {
                    ctx.mark_finished(f.id);
                    info!(job_id = %f.id, outcome = ?f.outcome, "job finished");
                }
            }
            _ = tokio::time::sleep(Duration::from_millis(200)) => {}
            _ = ctx.wake.notified() => {}
        }

        if last_display.elapsed() >= interval {
            print_progress(&ctx);
            last_display = Instant::now();
        }
    }

    drain_remaining(&ctx, &mut done_rx, timed_out).await;
}

fn print_progress(ctx: &Arc<SchedulerContext<SystemClock>>) {
    let wq = ctx.workqueue.lock();
    for job in wq.all_running().iter().chain(wq.all_deprioritized().iter()) {
        info!("{}", format_job_line(job));
    }
}

fn admit(
    ctx: Arc<SchedulerContext<SystemClock>>,
    job: Arc<Job>,
    program: PathBuf,
    leave_logs: bool,
    done_tx: mpsc::Sender<Finished>,
) {
    ctx.mark_running(&job);
    ctx.task_started();
    tokio::spawn(async move {
        let spec = admission::SpawnSpec {
            program: &program,
            extra_args: &[],
            config_static: &job.config.config_static,
            config_dynamic: &job.config.config_dynamic,
            fifo_in: &job.config.fifo_in,
            fifo_out: &job.config.fifo_out,
            log_stdout: &job.config.log_stdout,
            log_stderr: &job.config.log_stderr,
        };

        // `run_dialog` manages its own CPU-accounting slot internally, since
        // a SUSPEND/RESUME cycle may release and reacquire it mid-dialog.
        let outcome = match admission::spawn(&spec).await {
            Ok(mut spawned) => {
                let result = interleave_engine::run_dialog(
                    job.clone(),
                    ctx.clone(),
                    spawned.reader,
                    spawned.writer,
                )
                .await;
                let _ = spawned.child.wait().await;
                result.unwrap_or_else(|e| {
                    warn!(job_id = %job.id(), error = %e, "job dialog ended in error");
                    JobOutcome::Crashed
                })
            }
            Err(e) => {
                warn!(job_id = %job.id(), error = %e, "failed to spawn child");
                JobOutcome::Crashed
            }
        };

        let _ = admission::cleanup(&job.config.fifo_in, &job.config.fifo_out);
        let keep_logs = leave_logs || !matches!(outcome, JobOutcome::Clean | JobOutcome::Cancelled);
        if !keep_logs {
            interleave_wire::discard_logs(&job.config.log_stdout, &job.config.log_stderr);
        }
        if outcome == JobOutcome::Clean {
            job.flags.lock().complete = true;
        }
        *job.lifecycle.lock() = interleave_core::Lifecycle::Done;
        ctx.task_finished();

        let _ = done_tx.send(Finished { id: job.id(), outcome }).await;
    });
}

async fn drain_remaining(
    ctx: &Arc<SchedulerContext<SystemClock>>,
    done_rx: &mut mpsc::Receiver<Finished>,
    timed_out: bool,
) {
    let wq = ctx.workqueue.lock();
    let live: Vec<Arc<Job>> =
        wq.all_running().into_iter().chain(wq.all_deprioritized().into_iter()).collect();
    drop(wq);
    for job in live {
        if timed_out {
            job.mark_timed_out();
        } else {
            job.mark_cancelled();
        }
    }
    for job in ctx.workqueue.lock().drain_pending() {
        job.mark_cancelled();
    }
    ctx.wake_all_suspended();
    while ctx.outstanding_tasks() > 0 {
        match done_rx.recv().await {
            Some(f) => ctx.mark_finished(f.id),
            None => break,
        }
    }
}
