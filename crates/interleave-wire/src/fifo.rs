//! FIFO pair lifecycle: creation, deadlock-free opening order, and cleanup.
//!
//! Two named pipes per job: `<prefix>_in` (driver to child) and
//! `<prefix>_out` (child to driver). Opening a FIFO for read blocks until a
//! writer opens the other end (and vice versa); the driver always opens its
//! read end (`_out`) first, mirroring the child opening its write end first,
//! so neither side can deadlock waiting on the other's first open.

use nix::sys::stat::Mode;
use nix::unistd::mkfifo;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs::File;

#[derive(Debug, Error)]
pub enum FifoError {
    #[error("failed to create fifo {path}: {source}")]
    Create { path: PathBuf, source: nix::Error },
    #[error("failed to open fifo {path}: {source}")]
    Open { path: PathBuf, source: std::io::Error },
    #[error("failed to remove fifo {path}: {source}")]
    Remove { path: PathBuf, source: std::io::Error },
}

/// Create both named pipes for a job. Caller guarantees `fifo_in`/`fifo_out`
/// are unique (the job id + random token in the path scheme takes care of
/// that across concurrent driver invocations).
pub fn create_pair(fifo_in: &Path, fifo_out: &Path) -> Result<(), FifoError> {
    let mode = Mode::S_IRUSR | Mode::S_IWUSR;
    mkfifo(fifo_in, mode).map_err(|source| FifoError::Create { path: fifo_in.to_path_buf(), source })?;
    mkfifo(fifo_out, mode)
        .map_err(|source| FifoError::Create { path: fifo_out.to_path_buf(), source })?;
    Ok(())
}

/// Open the driver's side of the pair: read end first, then write end.
/// `File::open`/`File::create` run on tokio's blocking pool, so the (pipe)
/// open calls don't stall the executor while waiting for the child to
/// connect.
pub async fn open_driver_side(fifo_in: &Path, fifo_out: &Path) -> Result<(File, File), FifoError> {
    let read_half = File::open(fifo_out)
        .await
        .map_err(|source| FifoError::Open { path: fifo_out.to_path_buf(), source })?;
    let write_half = File::create(fifo_in)
        .await
        .map_err(|source| FifoError::Open { path: fifo_in.to_path_buf(), source })?;
    Ok((read_half, write_half))
}

/// Unlink both FIFOs. Called once the job is `Done`, regardless of whether
/// logs are retained.
pub fn remove_pair(fifo_in: &Path, fifo_out: &Path) -> Result<(), FifoError> {
    for path in [fifo_in, fifo_out] {
        match std::fs::remove_file(path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(source) => return Err(FifoError::Remove { path: path.to_path_buf(), source }),
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "fifo_tests.rs"]
mod tests;
