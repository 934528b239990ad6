//! Byte cursors for the abnet codec.
//!
//! This crate provides [`ArchiveReader`] and the [`ArchiveWrite`] writers
//! ([`ArchiveWriter`], [`ArchiveVecWriter`]) that the codec serializes
//! through. Every cursor carries a sticky error flag: the first failed
//! operation is recorded and returned by every operation after it.
//!
//! # Design Principles
//!
//! - **No unsafe code** - Safety is paramount.
//! - **Bounded operations** - All reads and bounded writes are checked.
//! - **No domain knowledge** - This crate knows nothing about requests or targets.
//! - **Explicit errors** - All failures return structured errors, never panic.
//!
//! # Example
//!
//! ```
//! use archive::{ArchiveReader, ArchiveVecWriter, ArchiveWrite};
//!
//! let mut writer = ArchiveVecWriter::new();
//! writer.write_f32(0.25).unwrap();
//! writer.write_i32(-7).unwrap();
//!
//! let bytes = writer.finish();
//!
//! let mut reader = ArchiveReader::new(&bytes);
//! assert_eq!(reader.read_f32().unwrap(), 0.25);
//! assert_eq!(reader.read_i32().unwrap(), -7);
//! assert!(reader.is_empty());
//! ```

mod error;
mod reader;
mod writer;

pub use error::{ArchiveError, ArchiveResult};
pub use reader::{ArchiveReader, VARU32_MAX_BYTES};
pub use writer::{varu32_len, ArchiveVecWriter, ArchiveWrite, ArchiveWriter};
