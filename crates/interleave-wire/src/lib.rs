//! interleave-wire: the messaging protocol between the driver and a child
//! simulator process — framing, FIFO pair lifecycle, and log/trace handling.
//!
//! Wire format: 4-byte length prefix (big-endian) + JSON payload.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod childio;
pub mod fifo;
pub mod framing;
pub mod message;

pub use childio::{discard_logs, move_file_to, ChildIoError};
pub use fifo::{create_pair, open_driver_side, remove_pair, FifoError};
pub use framing::{decode, encode, read_message, read_typed, write_message, write_typed, WireError};
pub use message::{Inbound, Outbound};
