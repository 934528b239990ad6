//! Bounded byte reader with a sticky error flag.

use crate::error::{ArchiveError, ArchiveResult};

/// Maximum encoded length of a `u32` varint.
pub const VARU32_MAX_BYTES: usize = 5;

/// A sequential reader over a byte slice.
///
/// All reads are bounds-checked. The first failing read puts the reader into
/// its error state; from then on every read returns that same error and the
/// position no longer advances.
#[derive(Debug, Clone)]
pub struct ArchiveReader<'a> {
    data: &'a [u8],
    pos: usize,
    error: Option<ArchiveError>,
}

impl<'a> ArchiveReader<'a> {
    /// Creates a new `ArchiveReader` from a byte slice.
    #[must_use]
    pub const fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            error: None,
        }
    }

    /// Returns the number of bytes remaining to read.
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Returns `true` if there are no more bytes to read.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Returns the current byte position.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.pos
    }

    /// Returns the recorded error, if the reader has faulted.
    #[must_use]
    pub fn error(&self) -> Option<&ArchiveError> {
        self.error.as_ref()
    }

    /// Returns `true` once any read has failed.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Reads a `u8`.
    pub fn read_u8(&mut self) -> ArchiveResult<u8> {
        let [byte] = self.take::<1>()?;
        Ok(byte)
    }

    /// Reads a little-endian `u32`.
    pub fn read_u32(&mut self) -> ArchiveResult<u32> {
        self.take::<4>().map(u32::from_le_bytes)
    }

    /// Reads a little-endian `i32`.
    pub fn read_i32(&mut self) -> ArchiveResult<i32> {
        self.take::<4>().map(i32::from_le_bytes)
    }

    /// Reads a little-endian IEEE-754 `f32`.
    pub fn read_f32(&mut self) -> ArchiveResult<f32> {
        self.take::<4>().map(f32::from_le_bytes)
    }

    /// Reads a LEB128 varint `u32`.
    pub fn read_varu32(&mut self) -> ArchiveResult<u32> {
        let mut result = 0u32;
        for index in 0..VARU32_MAX_BYTES {
            let byte = self.read_u8()?;
            let shift = index * 7;
            // The fifth byte only has room for the top 4 bits.
            if index == VARU32_MAX_BYTES - 1 && byte > 0x0F {
                return self.fail(ArchiveError::InvalidVarint);
            }
            result |= u32::from(byte & 0x7F) << shift;
            if byte & 0x80 == 0 {
                return Ok(result);
            }
        }
        self.fail(ArchiveError::InvalidVarint)
    }

    /// Reads `len` raw bytes, borrowed from the underlying buffer.
    pub fn read_bytes(&mut self, len: usize) -> ArchiveResult<&'a [u8]> {
        self.ensure(len)?;
        let data: &'a [u8] = self.data;
        let bytes = &data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    fn take<const N: usize>(&mut self) -> ArchiveResult<[u8; N]> {
        self.ensure(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(&self.data[self.pos..self.pos + N]);
        self.pos += N;
        Ok(out)
    }

    fn ensure(&mut self, len: usize) -> ArchiveResult<()> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }
        let available = self.remaining();
        if len > available {
            return self.fail(ArchiveError::UnexpectedEof {
                requested: len,
                available,
            });
        }
        Ok(())
    }

    fn fail<T>(&mut self, err: ArchiveError) -> ArchiveResult<T> {
        self.error = Some(err.clone());
        Err(err)
    }
}
