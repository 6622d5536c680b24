//! Command-line flags, matching the flag table in the driver's interface
//! contract. Usage/help text itself is generated by `clap`; we only
//! validate the semantic constraints between flags.

use clap::Parser;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Parser)]
#[command(name = "interleave", about = "Iterative-deepening concurrency checker driver")]
pub struct Cli {
    /// Test program name.
    #[arg(short = 'p', long = "program", default_value = "thr_exit_join")]
    pub program: String,

    /// Total time budget; suffixes s/m/h/d/y. Minimum is clamped to 10 minutes.
    #[arg(short = 't', long = "time-budget", default_value = "1h")]
    pub time_budget: String,

    /// Number of CPUs; default is ceil(system_cpus/2), capped at system_cpus.
    #[arg(short = 'c', long = "cpus")]
    pub cpus: Option<u32>,

    /// Progress interval, in seconds.
    #[arg(short = 'i', long = "interval", default_value_t = 5)]
    pub interval_secs: u64,

    /// Destination directory for trace files.
    #[arg(short = 'd', long = "trace-dir")]
    pub trace_dir: Option<PathBuf>,

    /// Verbose logging.
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Leave logs even for bug-free jobs.
    #[arg(short = 'l', long = "leave-logs")]
    pub leave_logs: bool,

    /// Control mode: run exactly one maximal configuration.
    #[arg(short = 'C', long = "control")]
    pub control: bool,

    /// Verification mode: maximal configuration only, but still iterative.
    #[arg(short = 'M', long = "verify")]
    pub verify: bool,

    /// Iterative context bounding (preempt-everywhere). `-I` is the long
    /// form, `-0` the source driver's original short flag.
    #[arg(short = 'I', long = "icb")]
    pub icb: bool,
    #[arg(short = '0')]
    pub icb_short: bool,

    /// Pure happens-before race analysis.
    #[arg(short = 'V', long = "hb-pure")]
    pub hb_pure: bool,
    /// Limited happens-before race analysis.
    #[arg(short = 'H', long = "hb-limited")]
    pub hb_limited: bool,

    /// Transactional-memory testing modes.
    #[arg(short = 'X')]
    pub tm_x: bool,
    #[arg(short = 'A')]
    pub tm_a: bool,
    #[arg(short = 'S')]
    pub tm_s: bool,
    #[arg(short = 'R')]
    pub tm_r: bool,
    #[arg(short = 'W')]
    pub tm_w: bool,

    /// Kernel variant flags, mutually exclusive.
    #[arg(short = 'P')]
    pub kernel_p: bool,
    #[arg(short = '4')]
    pub kernel_4: bool,

    /// Wrapper log file.
    #[arg(short = 'L', long = "log-file")]
    pub log_file: Option<PathBuf>,

    /// ETA factor: deprioritize once ETA exceeds `factor * time_remaining()`.
    #[arg(short = 'e', long = "eta-factor", default_value_t = interleave_core::config::DEFAULT_ETA_FACTOR)]
    pub eta_factor: f64,

    /// ETA stability threshold, in elapsed branches.
    #[arg(short = 'E', long = "eta-threshold", default_value_t = interleave_core::config::DEFAULT_ETA_THRESHOLD)]
    pub eta_threshold: u64,
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("-I/-0 (iterative context bounding) is incompatible with plain iterative deepening modes (-C/-M)")]
    IcbWithIterativeDeepening,
    #[error("transactional-memory flags (-X/-A/-S/-R/-W) are incompatible with kernel-variant flags (-P/-4)")]
    TmWithKernelVariant,
    #[error("-P and -4 select mutually exclusive kernel variants")]
    ConflictingKernelVariants,
    #[error("-C (control mode) and -M (verification mode) are mutually exclusive")]
    ConflictingModes,
    #[error("trace directory {0} does not exist or is not a directory")]
    BadTraceDir(PathBuf),
    #[error("could not parse time budget {0:?}: {1}")]
    BadTimeBudget(String, String),
}

impl Cli {
    pub fn icb_requested(&self) -> bool {
        self.icb || self.icb_short
    }

    fn tm_requested(&self) -> bool {
        self.tm_x || self.tm_a || self.tm_s || self.tm_r || self.tm_w
    }

    /// Validate flag compatibility, per the source driver's `option.c`
    /// checks. Must run before any job is constructed.
    pub fn validate(&self) -> Result<(), CliError> {
        if self.control && self.verify {
            return Err(CliError::ConflictingModes);
        }
        if self.icb_requested() && (self.control || self.verify) {
            return Err(CliError::IcbWithIterativeDeepening);
        }
        if self.kernel_p && self.kernel_4 {
            return Err(CliError::ConflictingKernelVariants);
        }
        if self.tm_requested() && (self.kernel_p || self.kernel_4) {
            return Err(CliError::TmWithKernelVariant);
        }
        if let Some(dir) = &self.trace_dir {
            if !dir.is_dir() {
                return Err(CliError::BadTraceDir(dir.clone()));
            }
        }
        Ok(())
    }

    /// Parse the `-t` duration syntax (`s/m/h/d/y` suffix), clamped to the
    /// 10-minute minimum.
    pub fn time_budget_usecs(&self) -> Result<u64, CliError> {
        let usecs = parse_duration_usecs(&self.time_budget)
            .map_err(|e| CliError::BadTimeBudget(self.time_budget.clone(), e))?;
        Ok(usecs.max(interleave_core::config::MIN_TIME_BUDGET_USECS))
    }
}

fn parse_duration_usecs(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration".to_string());
    }
    let (digits, suffix) = s.split_at(s.len() - 1);
    let (value_str, unit_secs) = match suffix {
        "s" => (digits, 1u64),
        "m" => (digits, 60),
        "h" => (digits, 3600),
        "d" => (digits, 86_400),
        "y" => (digits, 31_536_000),
        _ => (s, 1),
    };
    let value: u64 = value_str.parse().map_err(|_| format!("not a number: {value_str}"))?;
    Ok(value.saturating_mul(unit_secs).saturating_mul(1_000_000))
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
