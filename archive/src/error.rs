//! Error types for archive operations.

use std::fmt;

/// Result type for archive operations.
pub type ArchiveResult<T> = Result<T, ArchiveError>;

/// Errors that put a cursor into its error state.
///
/// Once a cursor records one of these, every later operation on it returns
/// the same error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveError {
    /// Attempted to read past the end of the buffer.
    UnexpectedEof {
        /// Number of bytes requested.
        requested: usize,
        /// Number of bytes left in the buffer.
        available: usize,
    },

    /// Attempted to write past the end of a bounded buffer.
    BufferOverflow {
        /// Number of bytes the write needed.
        attempted: usize,
        /// Number of bytes left in the buffer.
        available: usize,
    },

    /// A varint ran past 5 bytes or overflowed `u32`.
    InvalidVarint,
}

impl fmt::Display for ArchiveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedEof {
                requested,
                available,
            } => {
                write!(
                    f,
                    "attempted to read {requested} bytes but only {available} bytes available"
                )
            }
            Self::BufferOverflow {
                attempted,
                available,
            } => {
                write!(
                    f,
                    "attempted to write {attempted} bytes but only {available} bytes of capacity left"
                )
            }
            Self::InvalidVarint => write!(f, "invalid varint"),
        }
    }
}

impl std::error::Error for ArchiveError {}
