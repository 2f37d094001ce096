//! Binary stream: sequential typed reads and writes over in-memory blocks,
//! plus length-prefixed block I/O over seekable sources.
//!
//! # Invariants
//! - All integers and floats are little-endian.
//! - A read never runs past the end of its block; short data is an error.

mod block;
mod buffer;

pub use block::{BLOCK_HEADER_SIZE, read_block, write_block};
pub use buffer::{ByteReader, ByteWriter, Readable, Writable};

/// Errors from binary stream operations.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("stream truncated: needed {needed} bytes, {available} available")]
    Truncated { needed: u64, available: u64 },
}
