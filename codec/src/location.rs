//! Location payloads embedded in target data.

use archive::{ArchiveReader, ArchiveWrite};

use crate::error::{CodecError, CodecResult, LimitKind};
use crate::limits::CodecLimits;
use crate::types::{NetGuid, Transform};

/// A spatial reference that target data serializes after its request info.
///
/// Implementations follow the same contract as the request info: encode and
/// decode run synchronously and return the first error they hit.
pub trait LocationCodec {
    /// Writes this location.
    fn encode<W: ArchiveWrite>(&self, writer: &mut W, limits: &CodecLimits) -> CodecResult<()>;

    /// Reads this location in place.
    fn decode(&mut self, reader: &mut ArchiveReader<'_>, limits: &CodecLimits)
        -> CodecResult<()>;

    /// Returns the transform this location resolves to.
    fn targeting_transform(&self) -> Transform;
}

const TAG_LITERAL: u8 = 0;
const TAG_ACTOR: u8 = 1;
const TAG_SOCKET: u8 = 2;

/// Where a targeting location takes its transform from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum LocationSource {
    /// The literal transform carried in the payload.
    #[default]
    LiteralTransform,
    /// The transform of a replicated actor.
    ActorTransform { actor: NetGuid },
    /// A named socket on a replicated component.
    SocketTransform { component: NetGuid, socket: String },
}

impl LocationSource {
    /// Returns the wire tag for this source.
    #[must_use]
    pub const fn tag(&self) -> u8 {
        match self {
            Self::LiteralTransform => TAG_LITERAL,
            Self::ActorTransform { .. } => TAG_ACTOR,
            Self::SocketTransform { .. } => TAG_SOCKET,
        }
    }
}

/// The default location payload.
///
/// Wire layout: a `u8` source tag, then the literal transform (tag 0), the
/// actor id as a varint (tag 1), or the component id as a varint followed by
/// a length-prefixed UTF-8 socket name (tag 2).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TargetingLocation {
    pub source: LocationSource,
    /// Only serialized for [`LocationSource::LiteralTransform`].
    pub literal: Transform,
}

impl Default for TargetingLocation {
    fn default() -> Self {
        Self::literal(Transform::IDENTITY)
    }
}

impl TargetingLocation {
    /// A location given directly by `transform`.
    #[must_use]
    pub const fn literal(transform: Transform) -> Self {
        Self {
            source: LocationSource::LiteralTransform,
            literal: transform,
        }
    }

    /// A location taken from an actor's transform.
    #[must_use]
    pub const fn actor(actor: NetGuid) -> Self {
        Self {
            source: LocationSource::ActorTransform { actor },
            literal: Transform::IDENTITY,
        }
    }

    /// A location taken from a named socket on a component.
    #[must_use]
    pub fn socket(component: NetGuid, socket: impl Into<String>) -> Self {
        Self {
            source: LocationSource::SocketTransform {
                component,
                socket: socket.into(),
            },
            literal: Transform::IDENTITY,
        }
    }

    /// Returns `true` if the transform depends on a remote object.
    #[must_use]
    pub const fn is_remote(&self) -> bool {
        !matches!(self.source, LocationSource::LiteralTransform)
    }
}

fn check_socket_len(len: usize, limits: &CodecLimits) -> CodecResult<()> {
    if len > limits.max_socket_name_bytes {
        return Err(CodecError::LimitsExceeded {
            kind: LimitKind::SocketNameBytes,
            limit: limits.max_socket_name_bytes,
            actual: len,
        });
    }
    Ok(())
}

fn socket_wire_len(socket: &str, limits: &CodecLimits) -> CodecResult<u32> {
    check_socket_len(socket.len(), limits)?;
    u32::try_from(socket.len()).map_err(|_| CodecError::LimitsExceeded {
        kind: LimitKind::SocketNameBytes,
        limit: u32::MAX as usize,
        actual: socket.len(),
    })
}

impl LocationCodec for TargetingLocation {
    fn encode<W: ArchiveWrite>(&self, writer: &mut W, limits: &CodecLimits) -> CodecResult<()> {
        match &self.source {
            LocationSource::LiteralTransform => {
                writer.write_u8(TAG_LITERAL)?;
                self.literal.encode(writer)?;
            }
            LocationSource::ActorTransform { actor } => {
                writer.write_u8(TAG_ACTOR)?;
                writer.write_varu32(actor.raw())?;
            }
            LocationSource::SocketTransform { component, socket } => {
                // Checked before the tag so a rejected location writes nothing.
                let len = socket_wire_len(socket, limits)?;
                writer.write_u8(TAG_SOCKET)?;
                writer.write_varu32(component.raw())?;
                writer.write_varu32(len)?;
                writer.write_bytes(socket.as_bytes())?;
            }
        }
        Ok(())
    }

    fn decode(
        &mut self,
        reader: &mut ArchiveReader<'_>,
        limits: &CodecLimits,
    ) -> CodecResult<()> {
        let tag = reader.read_u8()?;
        match tag {
            TAG_LITERAL => {
                self.literal = Transform::decode(reader)?;
                self.source = LocationSource::LiteralTransform;
            }
            TAG_ACTOR => {
                let actor = NetGuid::new(reader.read_varu32()?);
                self.source = LocationSource::ActorTransform { actor };
            }
            TAG_SOCKET => {
                let component = NetGuid::new(reader.read_varu32()?);
                let len = reader.read_varu32()? as usize;
                check_socket_len(len, limits)?;
                let bytes = reader.read_bytes(len)?;
                let socket = std::str::from_utf8(bytes)
                    .map_err(|_| CodecError::InvalidSocketName)?
                    .to_string();
                self.source = LocationSource::SocketTransform { component, socket };
            }
            raw => return Err(CodecError::InvalidLocationSource { raw }),
        }
        Ok(())
    }

    /// Remote references need the host to resolve them; until then they
    /// report the identity transform.
    fn targeting_transform(&self) -> Transform {
        match self.source {
            LocationSource::LiteralTransform => self.literal,
            _ => Transform::IDENTITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Quat, Vec3};
    use archive::{ArchiveError, ArchiveVecWriter};

    fn roundtrip(location: &TargetingLocation) -> TargetingLocation {
        let limits = CodecLimits::for_testing();
        let mut writer = ArchiveVecWriter::new();
        location.encode(&mut writer, &limits).unwrap();
        let bytes = writer.finish();
        let mut reader = ArchiveReader::new(&bytes);
        let mut decoded = TargetingLocation::default();
        decoded.decode(&mut reader, &limits).unwrap();
        assert!(reader.is_empty(), "decode should consume the whole payload");
        decoded
    }

    fn sample_transform() -> Transform {
        Transform {
            rotation: Quat::new(0.0, 0.7071, 0.0, 0.7071),
            translation: Vec3::new(100.0, -50.0, 12.5),
            scale: Vec3::ONE,
        }
    }

    #[test]
    fn literal_roundtrip() {
        let location = TargetingLocation::literal(sample_transform());
        assert_eq!(roundtrip(&location), location);
        assert_eq!(location.targeting_transform(), sample_transform());
        assert!(!location.is_remote());
    }

    #[test]
    fn literal_layout() {
        let mut writer = ArchiveVecWriter::new();
        TargetingLocation::default()
            .encode(&mut writer, &CodecLimits::default())
            .unwrap();
        let bytes = writer.finish();
        assert_eq!(bytes[0], TAG_LITERAL);
        assert_eq!(bytes.len(), 1 + Transform::ENCODED_LEN);
    }

    #[test]
    fn actor_roundtrip() {
        let location = TargetingLocation::actor(NetGuid::new(300));
        let decoded = roundtrip(&location);
        assert_eq!(decoded, location);
        assert!(decoded.is_remote());
        assert_eq!(decoded.targeting_transform(), Transform::IDENTITY);
    }

    #[test]
    fn actor_layout_is_compact() {
        let mut writer = ArchiveVecWriter::new();
        TargetingLocation::actor(NetGuid::new(5))
            .encode(&mut writer, &CodecLimits::default())
            .unwrap();
        assert_eq!(writer.finish(), vec![TAG_ACTOR, 5]);
    }

    #[test]
    fn socket_roundtrip() {
        let location = TargetingLocation::socket(NetGuid::new(9), "weapon_muzzle");
        assert_eq!(roundtrip(&location), location);
    }

    #[test]
    fn decode_replaces_previous_source() {
        let location = TargetingLocation::actor(NetGuid::new(1));
        let mut writer = ArchiveVecWriter::new();
        location
            .encode(&mut writer, &CodecLimits::default())
            .unwrap();
        let bytes = writer.finish();

        let mut decoded = TargetingLocation::socket(NetGuid::new(2), "hand_l");
        decoded
            .decode(&mut ArchiveReader::new(&bytes), &CodecLimits::default())
            .unwrap();
        assert_eq!(decoded.source, location.source);
    }

    #[test]
    fn unknown_tag_rejected() {
        let mut decoded = TargetingLocation::default();
        let err = decoded
            .decode(&mut ArchiveReader::new(&[7]), &CodecLimits::default())
            .unwrap_err();
        assert_eq!(err, CodecError::InvalidLocationSource { raw: 7 });
    }

    #[test]
    fn oversized_socket_rejected_on_encode() {
        let location = TargetingLocation::socket(NetGuid::new(1), "x".repeat(33));
        let mut writer = ArchiveVecWriter::new();
        let err = location
            .encode(&mut writer, &CodecLimits::for_testing())
            .unwrap_err();
        assert!(matches!(
            err,
            CodecError::LimitsExceeded {
                kind: LimitKind::SocketNameBytes,
                limit: 32,
                actual: 33
            }
        ));
    }

    #[test]
    fn rejected_socket_writes_nothing() {
        let location = TargetingLocation::socket(NetGuid::new(4), "z".repeat(300));
        let mut writer = ArchiveVecWriter::new();
        writer.write_u8(0xEE).unwrap();
        let err = location
            .encode(&mut writer, &CodecLimits::default())
            .unwrap_err();
        assert!(matches!(
            err,
            CodecError::LimitsExceeded {
                limit: 256,
                actual: 300,
                ..
            }
        ));
        assert_eq!(writer.finish(), vec![0xEE]);
    }

    #[test]
    fn oversized_socket_rejected_on_decode() {
        // Encoded under generous limits, decoded under tight ones.
        let location = TargetingLocation::socket(NetGuid::new(1), "y".repeat(40));
        let mut writer = ArchiveVecWriter::new();
        location
            .encode(&mut writer, &CodecLimits::default())
            .unwrap();
        let bytes = writer.finish();

        let mut decoded = TargetingLocation::default();
        let err = decoded
            .decode(&mut ArchiveReader::new(&bytes), &CodecLimits::for_testing())
            .unwrap_err();
        assert!(matches!(err, CodecError::LimitsExceeded { actual: 40, .. }));
    }

    #[test]
    fn invalid_utf8_socket_rejected() {
        let bytes = [TAG_SOCKET, 1, 2, 0xFF, 0xFE];
        let mut decoded = TargetingLocation::default();
        let err = decoded
            .decode(&mut ArchiveReader::new(&bytes), &CodecLimits::default())
            .unwrap_err();
        assert_eq!(err, CodecError::InvalidSocketName);
    }

    #[test]
    fn truncated_socket_name_is_archive_error() {
        let bytes = [TAG_SOCKET, 1, 6, b'h', b'a'];
        let mut decoded = TargetingLocation::default();
        let err = decoded
            .decode(&mut ArchiveReader::new(&bytes), &CodecLimits::default())
            .unwrap_err();
        assert_eq!(
            err,
            CodecError::Archive(ArchiveError::UnexpectedEof {
                requested: 6,
                available: 2
            })
        );
    }
}
