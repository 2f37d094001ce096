use byteorder::{ByteOrder, LittleEndian};

use crate::StreamError;

/// Fixed-size little-endian value that can be decoded from a byte stream.
pub trait Readable: Sized {
    /// Encoded size in bytes.
    const SIZE: usize;
    /// Decode from exactly `SIZE` bytes.
    fn decode(bytes: &[u8]) -> Self;
}

/// Value that can be appended to a byte stream in little-endian order.
pub trait Writable {
    fn encode(&self, out: &mut Vec<u8>);
}

macro_rules! impl_primitive {
    ($ty:ty, $size:expr, $read:ident, $write:ident) => {
        impl Readable for $ty {
            const SIZE: usize = $size;

            fn decode(bytes: &[u8]) -> Self {
                LittleEndian::$read(bytes)
            }
        }

        impl Writable for $ty {
            fn encode(&self, out: &mut Vec<u8>) {
                let mut bytes = [0u8; $size];
                LittleEndian::$write(&mut bytes, *self);
                out.extend_from_slice(&bytes);
            }
        }
    };
}

impl_primitive!(u16, 2, read_u16, write_u16);
impl_primitive!(u32, 4, read_u32, write_u32);
impl_primitive!(u64, 8, read_u64, write_u64);
impl_primitive!(i32, 4, read_i32, write_i32);
impl_primitive!(f32, 4, read_f32, write_f32);

/// Sequential reader over an in-memory block.
///
/// Every read checks the remaining length first; running past the end is a
/// `StreamError::Truncated`, never a panic.
#[derive(Debug, Clone, Default)]
pub struct ByteReader {
    buffer: Vec<u8>,
    position: usize,
}

impl ByteReader {
    pub fn new(buffer: Vec<u8>) -> Self {
        Self {
            buffer,
            position: 0,
        }
    }

    /// Bytes consumed so far.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Bytes left to read.
    pub fn remaining(&self) -> usize {
        self.buffer.len() - self.position
    }

    /// Total size of the underlying block.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Read one typed value.
    pub fn read<T: Readable>(&mut self) -> Result<T, StreamError> {
        let bytes = self.take(T::SIZE as u64)?;
        Ok(T::decode(bytes))
    }

    /// Read a `u64` element count followed by that many values.
    pub fn read_vec<T: Readable>(&mut self) -> Result<Vec<T>, StreamError> {
        let count = self.read::<u64>()?;
        let needed = count.saturating_mul(T::SIZE as u64);
        let bytes = self.take(needed)?;
        Ok(bytes.chunks_exact(T::SIZE).map(T::decode).collect())
    }

    fn take(&mut self, needed: u64) -> Result<&[u8], StreamError> {
        let available = self.remaining() as u64;
        if needed > available {
            return Err(StreamError::Truncated { needed, available });
        }
        let start = self.position;
        // Bounded by `remaining()`, so the cast cannot truncate.
        self.position += needed as usize;
        Ok(&self.buffer[start..self.position])
    }
}

/// Growable little-endian writer, the encoding counterpart of `ByteReader`.
#[derive(Debug, Clone, Default)]
pub struct ByteWriter {
    buffer: Vec<u8>,
}

impl ByteWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one typed value.
    pub fn write<T: Writable>(&mut self, value: T) -> &mut Self {
        value.encode(&mut self.buffer);
        self
    }

    /// Append a `u64` element count followed by the values.
    pub fn write_slice<T: Writable>(&mut self, values: &[T]) -> &mut Self {
        (values.len() as u64).encode(&mut self.buffer);
        for v in values {
            v.encode(&mut self.buffer);
        }
        self
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buffer
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_values_are_little_endian() {
        let mut w = ByteWriter::new();
        w.write(0x0102_0304u32).write(-2i32).write(1.5f32);
        assert_eq!(&w.as_bytes()[..4], &[0x04, 0x03, 0x02, 0x01]);
        assert_eq!(w.len(), 12);

        let mut r = ByteReader::new(w.into_inner());
        assert_eq!(r.read::<u32>().unwrap(), 0x0102_0304);
        assert_eq!(r.read::<i32>().unwrap(), -2);
        assert_eq!(r.read::<f32>().unwrap(), 1.5);
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn length_prefixed_sequence() {
        let mut w = ByteWriter::new();
        w.write_slice(&[7u32, 8, 9]).write(42u16);

        let mut r = ByteReader::new(w.into_inner());
        assert_eq!(r.read_vec::<u32>().unwrap(), vec![7, 8, 9]);
        assert_eq!(r.read::<u16>().unwrap(), 42);
    }

    #[test]
    fn reading_past_the_end_is_truncated() {
        let mut r = ByteReader::new(vec![1, 2, 3]);
        let err = r.read::<u32>().unwrap_err();
        assert!(matches!(
            err,
            StreamError::Truncated {
                needed: 4,
                available: 3
            }
        ));
        // A failed read consumes nothing.
        assert_eq!(r.position(), 0);
    }

    #[test]
    fn huge_length_prefix_does_not_allocate() {
        let mut w = ByteWriter::new();
        w.write(u64::MAX).write(1u32);
        let mut r = ByteReader::new(w.into_inner());
        assert!(matches!(
            r.read_vec::<u32>(),
            Err(StreamError::Truncated { available: 4, .. })
        ));
    }

    #[test]
    fn empty_sequence_round_trips() {
        let mut w = ByteWriter::new();
        w.write_slice::<u32>(&[]);
        let mut r = ByteReader::new(w.into_inner());
        assert!(r.read_vec::<u32>().unwrap().is_empty());
    }
}
