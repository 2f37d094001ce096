use std::io::{Read, Seek, SeekFrom, Write};

use byteorder::{ByteOrder, LittleEndian};

use crate::StreamError;
use crate::buffer::ByteReader;

/// Size of the block length header.
pub const BLOCK_HEADER_SIZE: u64 = 8;

/// Read one length-prefixed block from the current position of `source`.
///
/// The 8-byte header declares the payload size. The declared size is checked
/// against what is left in the source before anything is allocated.
pub fn read_block<R: Read + Seek>(source: &mut R) -> Result<ByteReader, StreamError> {
    let available = remaining(source)?;
    if available < BLOCK_HEADER_SIZE {
        return Err(StreamError::Truncated {
            needed: BLOCK_HEADER_SIZE,
            available,
        });
    }
    let mut header = [0u8; BLOCK_HEADER_SIZE as usize];
    source.read_exact(&mut header)?;
    let declared = LittleEndian::read_u64(&header);

    let available = available - BLOCK_HEADER_SIZE;
    if declared > available {
        tracing::debug!(declared, available, "block header exceeds stream length");
        return Err(StreamError::Truncated {
            needed: declared,
            available,
        });
    }

    let mut payload = vec![0u8; declared as usize];
    source.read_exact(&mut payload)?;
    tracing::trace!(bytes = declared, "read block");
    Ok(ByteReader::new(payload))
}

/// Write `payload` as one length-prefixed block. Returns the bytes written.
pub fn write_block<W: Write>(sink: &mut W, payload: &[u8]) -> Result<u64, StreamError> {
    let mut header = [0u8; BLOCK_HEADER_SIZE as usize];
    LittleEndian::write_u64(&mut header, payload.len() as u64);
    sink.write_all(&header)?;
    sink.write_all(payload)?;
    Ok(BLOCK_HEADER_SIZE + payload.len() as u64)
}

/// Bytes between the current position and the end of the source.
fn remaining<S: Seek>(source: &mut S) -> Result<u64, StreamError> {
    let here = source.stream_position()?;
    let end = source.seek(SeekFrom::End(0))?;
    source.seek(SeekFrom::Start(here))?;
    Ok(end.saturating_sub(here))
}
