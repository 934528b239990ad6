//! Request info and target data encoding/decoding for abnet.
//!
//! A [`RequestInfo`] carries three independently optional fields (timestamp,
//! RTT estimate, reconciliation id) gated by a [`RequestFlags`] presence
//! word. Only the present fields go on the wire. The presence word does not,
//! so both peers must agree on it out of band, or opt into the `*_prefixed`
//! framing that writes it as a leading byte.
//!
//! [`NetworkedTargetData`] embeds a request info in one of three target data
//! shapes and serializes it ahead of the shape's location payloads.
//!
//! # Features
//!
//! - Presence-gated request info encoding
//! - Origin, target and origin+target data variants
//! - Fail-fast stage pipeline with stage attribution in errors
//! - Optional self-describing framing
//!
//! # Design Principles
//!
//! - **Correctness first** - All invariants are documented and tested.
//! - **No steady-state allocations** - Encoders write into caller buffers.
//! - **Deterministic** - Same inputs produce same outputs.
//!
//! # Example
//!
//! ```
//! use archive::{ArchiveReader, ArchiveVecWriter};
//! use codec::{CodecLimits, NetworkedTargetData, RequestInfo, TargetDataKind, TargetingLocation};
//!
//! let mut info = RequestInfo::new();
//! info.set_timestamp(12.5);
//! info.set_reconciliation_id(7);
//!
//! let data: NetworkedTargetData = NetworkedTargetData::origin_info(info, TargetingLocation::default());
//! let limits = CodecLimits::default();
//!
//! let mut writer = ArchiveVecWriter::new();
//! data.encode(&mut writer, &limits).unwrap();
//! let bytes = writer.finish();
//!
//! let mut decoded: NetworkedTargetData = NetworkedTargetData::empty(TargetDataKind::OriginInfo);
//! decoded
//!     .decode(info.flags(), &mut ArchiveReader::new(&bytes), &limits)
//!     .unwrap();
//! assert_eq!(decoded, data);
//! ```

mod error;
mod flags;
mod limits;
mod location;
mod request;
#[cfg(feature = "serde")]
mod serde_f32;
mod target;
mod types;

pub use error::{CodecError, CodecResult, LimitKind, Stage};
pub use flags::{RequestFlag, RequestFlags, UnknownFlag};
pub use limits::CodecLimits;
pub use location::{LocationCodec, LocationSource, TargetingLocation};
pub use request::{RequestInfo, FIELD_BYTES};
pub use target::{NetworkedTargetData, TargetDataKind};
pub use types::{NetGuid, Quat, Transform, Vec3};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_api_exports() {
        let _ = RequestInfo::new();
        let _ = RequestFlags::NONE;
        let _ = CodecLimits::default();
        let _ = NetGuid::new(0);
        let _ = TargetingLocation::default();
        let _: CodecResult<()> = Ok(());
    }

    #[test]
    fn empty_request_encodes_to_nothing() {
        let mut writer = archive::ArchiveVecWriter::new();
        RequestInfo::new().encode(&mut writer).unwrap();
        assert!(writer.finish().is_empty());
    }

    #[test]
    fn target_data_kinds() {
        for kind in TargetDataKind::ALL {
            let data: NetworkedTargetData = NetworkedTargetData::empty(kind);
            assert_eq!(data.kind(), kind);
        }
    }
}
