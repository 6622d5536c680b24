//! Driver entry point: parse flags, seed baseline configurations, run the
//! dispatch loop to completion, and print the final report.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod cli;
mod driver;
mod report;
mod seeding;

use clap::Parser;
use cli::Cli;
use interleave_core::{Job, SystemClock};
use interleave_engine::{SchedulerConfig, SchedulerContext};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info};

/// Exit code on a usage/configuration error, matching the driver's
/// interface contract.
const EXIT_USAGE_ERROR: i32 = 2;
/// Exit code reserved for an internal assertion failure (driver bug, not a
/// child crash or a found bug).
const EXIT_INTERNAL_ERROR: i32 = 3;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = cli.validate() {
        error!(error = %e, "invalid flag combination");
        std::process::exit(EXIT_USAGE_ERROR);
    }
    let max_usecs = match cli.time_budget_usecs() {
        Ok(v) => v,
        Err(e) => {
            error!(error = %e, "invalid time budget");
            std::process::exit(EXIT_USAGE_ERROR);
        }
    };

    match real_main(cli, max_usecs).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            error!(error = %e, "driver failed to start");
            std::process::exit(EXIT_INTERNAL_ERROR);
        }
    }
}

/// Everything past flag validation: setting up the working directory and
/// scheduler context is the only part of startup that can still fail, so
/// it's the only part wrapped in `anyhow::Result`.
async fn real_main(cli: Cli, max_usecs: u64) -> anyhow::Result<i32> {
    let system_cpus = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1) as u32;
    let num_cpus = cli.cpus.unwrap_or_else(|| default_num_cpus(system_cpus)).clamp(1, system_cpus);
    let work_dir = std::env::temp_dir().join(format!("interleave-{}", std::process::id()));
    std::fs::create_dir_all(&work_dir)
        .map_err(|e| anyhow::anyhow!("could not create working directory {}: {e}", work_dir.display()))?;

    let config = SchedulerConfig {
        eta_factor: cli.eta_factor,
        eta_threshold: cli.eta_threshold,
        num_cpus,
        max_usecs,
        trace_dir: cli.trace_dir.clone(),
    };
    let ctx = SchedulerContext::new(SystemClock, config, work_dir);

    seed_jobs(&ctx, &cli);

    let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
    let ctrl_c_ctx = ctx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("SIGINT received, shutting down");
            print_snapshot(&ctrl_c_ctx);
            let _ = shutdown_tx.send(()).await;
        }
    });

    let program = PathBuf::from(&cli.program);
    driver::run(ctx.clone(), program, cli.leave_logs, cli.interval_secs, shutdown_rx).await;

    let (found_bugs, bugs) = ctx.bugs.found_any_bugs();
    print!("{}", report::format_report(&bugs, &ctx.time));

    Ok(if found_bugs { 1 } else { 0 })
}

fn seed_jobs(ctx: &Arc<SchedulerContext<SystemClock>>, cli: &Cli) {
    let interrupt_driven_kernel = cli.kernel_p || cli.kernel_4;
    if cli.control || cli.verify {
        let seed = seeding::maximal_seed(interrupt_driven_kernel);
        let config = ctx.seed_config(seed.pp_set, seed.should_reproduce);
        ctx.add_work(Arc::new(Job::new(config)));
    } else {
        for seed in seeding::baseline_seeds(interrupt_driven_kernel) {
            let config = ctx.seed_config(seed.pp_set, seed.should_reproduce);
            ctx.add_work(Arc::new(Job::new(config)));
        }
    }
}

fn print_snapshot(ctx: &Arc<SchedulerContext<SystemClock>>) {
    let (_, bugs) = ctx.bugs.found_any_bugs();
    print!("{}", report::format_report(&bugs, &ctx.time));
}

fn default_num_cpus(system_cpus: u32) -> u32 {
    system_cpus.div_ceil(2).max(1)
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("interleave={default_level}")));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

