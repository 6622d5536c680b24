//! Child process admission: spawn the simulator binary, create and open its
//! FIFO pair, and hand the resulting duplex transport to the worker dialog.

use crate::error::{EngineError, EngineResult};
use interleave_wire::{create_pair, open_driver_side, remove_pair};
use std::path::Path;
use std::process::Stdio;
use tokio::fs::File;
use tokio::process::{Child, Command};

/// What it takes to launch one job's child: the simulator binary, any fixed
/// arguments, and the per-job config files to pass along.
pub struct SpawnSpec<'a> {
    pub program: &'a Path,
    pub extra_args: &'a [String],
    pub config_static: &'a Path,
    pub config_dynamic: &'a Path,
    pub fifo_in: &'a Path,
    pub fifo_out: &'a Path,
    pub log_stdout: &'a Path,
    pub log_stderr: &'a Path,
}

/// A running child plus its open driver-side FIFO handles.
pub struct SpawnedChild {
    pub child: Child,
    pub reader: File,
    pub writer: File,
}

/// Create the FIFO pair, launch the child with its config/log files wired
/// up, and open the driver's side of the pair. The child is expected to
/// open its own ends in the mirror-image order (write `fifo_out` first,
/// then read `fifo_in`) so neither side blocks waiting on the other.
pub async fn spawn(spec: &SpawnSpec<'_>) -> EngineResult<SpawnedChild> {
    create_pair(spec.fifo_in, spec.fifo_out)?;

    let stdout = std::fs::File::create(spec.log_stdout)
        .map_err(|source| EngineError::WorkDir { path: spec.log_stdout.to_path_buf(), source })?;
    let stderr = std::fs::File::create(spec.log_stderr)
        .map_err(|source| EngineError::WorkDir { path: spec.log_stderr.to_path_buf(), source })?;

    let mut cmd = Command::new(spec.program);
    cmd.arg("--config-static")
        .arg(spec.config_static)
        .arg("--config-dynamic")
        .arg(spec.config_dynamic)
        .arg("--fifo-in")
        .arg(spec.fifo_in)
        .arg("--fifo-out")
        .arg(spec.fifo_out)
        .args(spec.extra_args)
        .stdin(Stdio::null())
        .stdout(Stdio::from(stdout))
        .stderr(Stdio::from(stderr));

    let child = cmd.spawn().map_err(EngineError::Spawn)?;
    let (reader, writer) = open_driver_side(spec.fifo_in, spec.fifo_out).await?;

    Ok(SpawnedChild { child, reader, writer })
}

/// Tear down a job's FIFO pair once its dialog has ended.
pub fn cleanup(fifo_in: &Path, fifo_out: &Path) -> EngineResult<()> {
    remove_pair(fifo_in, fifo_out)?;
    Ok(())
}

#[cfg(test)]
#[path = "admission_tests.rs"]
mod tests;
