//! Request timing/replication info and its presence-gated encoding.
//!
//! The wire form is the present fields only, in the fixed order timestamp,
//! RTT estimate, reconciliation id, each as 4 little-endian bytes. The
//! presence word itself is not written: the decoder must be handed the same
//! flags the encoder used. [`RequestInfo::encode_prefixed`] and
//! [`RequestInfo::decode_prefixed`] add a leading flags byte for peers that
//! want the payload to describe itself.

use archive::{ArchiveReader, ArchiveWrite};

use crate::error::CodecResult;
use crate::flags::{RequestFlag, RequestFlags};

/// Bytes each present field occupies on the wire.
pub const FIELD_BYTES: usize = 4;

/// Timestamp, RTT estimate and reconciliation id for a gameplay request,
/// each independently optional.
///
/// Setting a field also marks it present. Presence only accumulates for the
/// life of a value; there is no way to unset a field.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RequestInfo {
    #[cfg_attr(feature = "serde", serde(with = "crate::serde_f32"))]
    timestamp: f32,
    #[cfg_attr(feature = "serde", serde(with = "crate::serde_f32"))]
    estimate_rtt: f32,
    reconciliation_id: i32,
    flags: RequestFlags,
}

/// A mutable view of one field, typed by its wire representation.
enum FieldSlot<'a> {
    Float(&'a mut f32),
    Int(&'a mut i32),
}

type FieldAccessor = fn(&mut RequestInfo) -> FieldSlot<'_>;

fn timestamp_slot(info: &mut RequestInfo) -> FieldSlot<'_> {
    FieldSlot::Float(&mut info.timestamp)
}

fn estimate_rtt_slot(info: &mut RequestInfo) -> FieldSlot<'_> {
    FieldSlot::Float(&mut info.estimate_rtt)
}

fn reconciliation_id_slot(info: &mut RequestInfo) -> FieldSlot<'_> {
    FieldSlot::Int(&mut info.reconciliation_id)
}

/// Wire order. Encode and decode both walk this table.
const REQUEST_FIELDS: [(RequestFlag, FieldAccessor); 3] = [
    (RequestFlag::Timestamp, timestamp_slot),
    (RequestFlag::EstimateRtt, estimate_rtt_slot),
    (RequestFlag::ReconciliationId, reconciliation_id_slot),
];

impl RequestInfo {
    /// Creates an empty request info: no flags, all fields zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            timestamp: 0.0,
            estimate_rtt: 0.0,
            reconciliation_id: 0,
            flags: RequestFlags::NONE,
        }
    }

    /// Creates a request info with all three fields present.
    #[must_use]
    pub const fn with_all(timestamp: f32, estimate_rtt: f32, reconciliation_id: i32) -> Self {
        Self {
            timestamp,
            estimate_rtt,
            reconciliation_id,
            flags: RequestFlags::ALL,
        }
    }

    /// Sets the timestamp (seconds) and marks it present.
    pub fn set_timestamp(&mut self, timestamp: f32) {
        self.timestamp = timestamp;
        self.flags.insert(RequestFlag::Timestamp);
    }

    /// Sets the RTT estimate and marks it present.
    pub fn set_estimate_rtt(&mut self, estimate_rtt: f32) {
        self.estimate_rtt = estimate_rtt;
        self.flags.insert(RequestFlag::EstimateRtt);
    }

    /// Sets the reconciliation id and marks it present.
    pub fn set_reconciliation_id(&mut self, reconciliation_id: i32) {
        self.reconciliation_id = reconciliation_id;
        self.flags.insert(RequestFlag::ReconciliationId);
    }

    #[must_use]
    pub const fn timestamp(&self) -> f32 {
        self.timestamp
    }

    #[must_use]
    pub const fn estimate_rtt(&self) -> f32 {
        self.estimate_rtt
    }

    #[must_use]
    pub const fn reconciliation_id(&self) -> i32 {
        self.reconciliation_id
    }

    /// Returns the presence word.
    #[must_use]
    pub const fn flags(&self) -> RequestFlags {
        self.flags
    }

    /// Returns `true` if `flag` is set.
    #[must_use]
    pub const fn contains(&self, flag: RequestFlag) -> bool {
        self.flags.contains(flag)
    }

    #[must_use]
    pub const fn has_timestamp(&self) -> bool {
        self.contains(RequestFlag::Timestamp)
    }

    #[must_use]
    pub const fn has_estimate_rtt(&self) -> bool {
        self.contains(RequestFlag::EstimateRtt)
    }

    #[must_use]
    pub const fn has_reconciliation_id(&self) -> bool {
        self.contains(RequestFlag::ReconciliationId)
    }

    /// Returns the encoded size of a request info carrying `flags`.
    #[must_use]
    pub const fn encoded_len(flags: RequestFlags) -> usize {
        flags.count() * FIELD_BYTES
    }

    /// Writes the present fields. The flags word is not written.
    pub fn encode<W: ArchiveWrite>(&self, writer: &mut W) -> CodecResult<()> {
        // Slots hand out `&mut`, so walk a copy.
        let mut fields = *self;
        for (flag, slot) in REQUEST_FIELDS {
            if !self.flags.contains(flag) {
                continue;
            }
            match slot(&mut fields) {
                FieldSlot::Float(value) => writer.write_f32(*value)?,
                FieldSlot::Int(value) => writer.write_i32(*value)?,
            }
        }
        Ok(())
    }

    /// Reads the fields present in `flags`, which must be the flags the
    /// encoder used.
    ///
    /// `flags` is ORed into this value's presence word; bits already set
    /// stay set. Fields outside `flags` keep their current values. On a short
    /// read the error is returned at once and the fields read so far stay
    /// populated.
    pub fn decode(
        &mut self,
        flags: RequestFlags,
        reader: &mut ArchiveReader<'_>,
    ) -> CodecResult<()> {
        self.flags = self.flags | flags;
        for (flag, slot) in REQUEST_FIELDS {
            if !flags.contains(flag) {
                continue;
            }
            match slot(&mut *self) {
                FieldSlot::Float(value) => *value = reader.read_f32()?,
                FieldSlot::Int(value) => *value = reader.read_i32()?,
            }
        }
        Ok(())
    }

    /// Writes the raw flags byte, then the present fields.
    pub fn encode_prefixed<W: ArchiveWrite>(&self, writer: &mut W) -> CodecResult<()> {
        writer.write_u8(self.flags.raw())?;
        self.encode(writer)
    }

    /// Reads a flags byte, then the fields it marks present.
    pub fn decode_prefixed(&mut self, reader: &mut ArchiveReader<'_>) -> CodecResult<()> {
        let flags = RequestFlags::from_raw(reader.read_u8()?);
        self.decode(flags, reader)
    }
}
