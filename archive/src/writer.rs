//! Byte writers for encoding archive data.

use crate::error::{ArchiveError, ArchiveResult};
use crate::reader::VARU32_MAX_BYTES;

/// Sequential, append-only write cursor.
///
/// Implementors only provide [`write_bytes`](Self::write_bytes) and the
/// state accessors; typed writes are built on top. A writer that rejects a
/// write must record the error and return it from every later call.
pub trait ArchiveWrite {
    /// Appends raw bytes.
    fn write_bytes(&mut self, bytes: &[u8]) -> ArchiveResult<()>;

    /// Returns the number of bytes written so far.
    fn bytes_written(&self) -> usize;

    /// Returns the recorded error, if the writer has faulted.
    fn error(&self) -> Option<&ArchiveError>;

    /// Returns `true` once any write has failed.
    fn is_error(&self) -> bool {
        self.error().is_some()
    }

    /// Writes a `u8`.
    fn write_u8(&mut self, value: u8) -> ArchiveResult<()> {
        self.write_bytes(&[value])
    }

    /// Writes a little-endian `u32`.
    fn write_u32(&mut self, value: u32) -> ArchiveResult<()> {
        self.write_bytes(&value.to_le_bytes())
    }

    /// Writes a little-endian `i32`.
    fn write_i32(&mut self, value: i32) -> ArchiveResult<()> {
        self.write_bytes(&value.to_le_bytes())
    }

    /// Writes a little-endian IEEE-754 `f32`.
    fn write_f32(&mut self, value: f32) -> ArchiveResult<()> {
        self.write_bytes(&value.to_le_bytes())
    }

    /// Writes a LEB128 varint `u32`.
    fn write_varu32(&mut self, value: u32) -> ArchiveResult<()> {
        let mut buf = [0u8; VARU32_MAX_BYTES];
        let len = encode_varu32(value, &mut buf);
        self.write_bytes(&buf[..len])
    }
}

/// Returns the number of bytes `value` takes as a varint.
#[must_use]
pub const fn varu32_len(value: u32) -> usize {
    match value {
        0..=0x7F => 1,
        0x80..=0x3FFF => 2,
        0x4000..=0x001F_FFFF => 3,
        0x0020_0000..=0x0FFF_FFFF => 4,
        _ => 5,
    }
}

fn encode_varu32(mut value: u32, buf: &mut [u8; VARU32_MAX_BYTES]) -> usize {
    let mut len = 0;
    loop {
        let byte = (value & 0x7F) as u8;
        value >>= 7;
        if value == 0 {
            buf[len] = byte;
            return len + 1;
        }
        buf[len] = byte | 0x80;
        len += 1;
    }
}

/// A writer over a caller-provided fixed-size buffer.
///
/// A write that does not fit is rejected whole (nothing is copied) and puts
/// the writer into its error state.
#[derive(Debug)]
pub struct ArchiveWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
    error: Option<ArchiveError>,
}

impl<'a> ArchiveWriter<'a> {
    /// Creates a writer over `buf`.
    #[must_use]
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self {
            buf,
            pos: 0,
            error: None,
        }
    }

    /// Returns the total capacity of the underlying buffer.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Returns the number of bytes that can still be written.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Finishes writing and returns the number of bytes used.
    #[must_use]
    pub fn finish(self) -> usize {
        self.pos
    }
}

impl ArchiveWrite for ArchiveWriter<'_> {
    fn write_bytes(&mut self, bytes: &[u8]) -> ArchiveResult<()> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }
        let available = self.remaining();
        if bytes.len() > available {
            let err = ArchiveError::BufferOverflow {
                attempted: bytes.len(),
                available,
            };
            self.error = Some(err.clone());
            return Err(err);
        }
        self.buf[self.pos..self.pos + bytes.len()].copy_from_slice(bytes);
        self.pos += bytes.len();
        Ok(())
    }

    fn bytes_written(&self) -> usize {
        self.pos
    }

    fn error(&self) -> Option<&ArchiveError> {
        self.error.as_ref()
    }
}

/// A growable writer backed by a `Vec<u8>`. Never faults.
#[derive(Debug, Default, Clone)]
pub struct ArchiveVecWriter {
    bytes: Vec<u8>,
}

impl ArchiveVecWriter {
    /// Creates a new empty writer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new writer with pre-allocated capacity.
    #[must_use]
    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(bytes),
        }
    }

    /// Returns the bytes written so far.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Finishes writing and returns the byte buffer.
    #[must_use]
    pub fn finish(self) -> Vec<u8> {
        self.bytes
    }

    /// Finishes writing and appends to the provided buffer.
    pub fn finish_into(mut self, buf: &mut Vec<u8>) {
        buf.append(&mut self.bytes);
    }
}

impl ArchiveWrite for ArchiveVecWriter {
    fn write_bytes(&mut self, bytes: &[u8]) -> ArchiveResult<()> {
        self.bytes.extend_from_slice(bytes);
        Ok(())
    }

    fn bytes_written(&self) -> usize {
        self.bytes.len()
    }

    fn error(&self) -> Option<&ArchiveError> {
        None
    }
}
