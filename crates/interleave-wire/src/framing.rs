//! Wire framing: 4-byte big-endian length prefix + JSON payload.
//!
//! The spec leaves the exact on-wire encoding an implementation choice,
//! requiring only a type tag and a tag-determined, length-prefixed payload.
//! A length-prefixed JSON envelope satisfies that while staying inside a
//! single serde-tagged enum per direction (see `message.rs`).

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

#[derive(Debug, Error)]
pub enum WireError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json encode/decode error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("message exceeds max frame size ({0} bytes)")]
    TooLarge(usize),
    #[error("unknown or malformed message tag")]
    UnknownTag,
}

/// Frames longer than this are refused outright; a malformed or malicious
/// peer writing a huge length prefix must not allocate unbounded memory.
pub const MAX_FRAME_BYTES: usize = 16 * 1024 * 1024;

/// Serialize a message to its raw JSON payload (no length prefix).
pub fn encode<T: Serialize>(msg: &T) -> Result<Vec<u8>, WireError> {
    Ok(serde_json::to_vec(msg)?)
}

/// Deserialize a message from its raw JSON payload.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, WireError> {
    serde_json::from_slice(bytes).map_err(|_| WireError::UnknownTag)
}

/// Write a length-prefixed frame: 4-byte big-endian length, then `payload`.
pub async fn write_message<W: AsyncWrite + Unpin>(
    writer: &mut W,
    payload: &[u8],
) -> Result<(), WireError> {
    if payload.len() > MAX_FRAME_BYTES {
        return Err(WireError::TooLarge(payload.len()));
    }
    let len = payload.len() as u32;
    writer.write_all(&len.to_be_bytes()).await?;
    writer.write_all(payload).await?;
    writer.flush().await?;
    Ok(())
}

/// Read one length-prefixed frame and return its raw payload.
pub async fn read_message<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Vec<u8>, WireError> {
    let mut len_buf = [0u8; 4];
    reader.read_exact(&mut len_buf).await?;
    let len = u32::from_be_bytes(len_buf) as usize;
    if len > MAX_FRAME_BYTES {
        return Err(WireError::TooLarge(len));
    }
    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf).await?;
    Ok(buf)
}

/// Read one frame and decode it as `T` in a single call.
pub async fn read_typed<R: AsyncRead + Unpin, T: DeserializeOwned>(
    reader: &mut R,
) -> Result<T, WireError> {
    let bytes = read_message(reader).await?;
    decode(&bytes)
}

/// Encode `msg` and write it as one length-prefixed frame.
pub async fn write_typed<W: AsyncWrite + Unpin, T: Serialize>(
    writer: &mut W,
    msg: &T,
) -> Result<(), WireError> {
    let bytes = encode(msg)?;
    write_message(writer, &bytes).await
}

#[cfg(test)]
#[path = "framing_tests.rs"]
mod tests;
