//! Final report: every recorded bug plus a one-line CPU saturation summary.

use interleave_core::{BugRecord, Clock, TimeOracle};

pub fn format_report<C: Clock>(bugs: &[BugRecord], time: &TimeOracle<C>) -> String {
    let mut out = String::new();
    if bugs.is_empty() {
        out.push_str("no bugs found\n");
    } else {
        for bug in bugs {
            out.push_str(&format!(
                "BUG job={} config={} trace={}\n",
                bug.job_id,
                bug.pp_set,
                bug.trace_filename.display(),
            ));
        }
    }
    out.push_str(&format!(
        "cpu saturation: {:.1}% over {:?}\n",
        time.cpu_saturation() * 100.0,
        time.time_elapsed(),
    ));
    out
}

#[cfg(test)]
#[path = "report_tests.rs"]
mod tests;
