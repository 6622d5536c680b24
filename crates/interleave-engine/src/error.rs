use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to spawn child process: {0}")]
    Spawn(#[source] std::io::Error),

    #[error(transparent)]
    Fifo(#[from] interleave_wire::FifoError),

    #[error(transparent)]
    Wire(#[from] interleave_wire::WireError),

    #[error(transparent)]
    ChildIo(#[from] interleave_wire::ChildIoError),

    #[error("child for job {job_id} disconnected before completing its dialog")]
    UnexpectedHangup { job_id: u64 },

    #[error("child for job {job_id} sent {got} where a handshake HELLO was expected")]
    ProtocolViolation { job_id: u64, got: &'static str },

    #[error("could not create working directory {path}: {source}")]
    WorkDir { path: PathBuf, source: std::io::Error },
}

pub type EngineResult<T> = Result<T, EngineError>;
