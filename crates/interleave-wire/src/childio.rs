//! Trace/log file lifecycle once a job terminates.

use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChildIoError {
    #[error("io error relocating {path}: {source}")]
    Relocate { path: PathBuf, source: std::io::Error },
}

/// Relocate a completed trace file into a user-specified trace directory.
/// Tries an atomic rename first (same filesystem); falls back to copy +
/// unlink across filesystems.
pub fn move_file_to(file: &Path, dest_dir: &Path) -> Result<PathBuf, ChildIoError> {
    let file_name = file.file_name().unwrap_or_default();
    let dest = dest_dir.join(file_name);
    match std::fs::rename(file, &dest) {
        Ok(()) => Ok(dest),
        Err(_) => {
            std::fs::copy(file, &dest)
                .map_err(|source| ChildIoError::Relocate { path: file.to_path_buf(), source })?;
            std::fs::remove_file(file)
                .map_err(|source| ChildIoError::Relocate { path: file.to_path_buf(), source })?;
            Ok(dest)
        }
    }
}

/// Remove a job's stdout/stderr log files. Called on clean (no-bug)
/// termination unless `leave_logs` was requested.
pub fn discard_logs(stdout: &Path, stderr: &Path) {
    for path in [stdout, stderr] {
        if let Err(e) = std::fs::remove_file(path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %path.display(), error = %e, "failed to remove job log");
            }
        }
    }
}

#[cfg(test)]
#[path = "childio_tests.rs"]
mod tests;
