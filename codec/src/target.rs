//! Target data variants that pair a request info with location payloads.
//!
//! Every variant serializes in the same fixed order: request info, then the
//! origin if the variant declares one, then the target if it declares one.
//! The first failing stage aborts the call; later stages never run.

use std::fmt;
use std::str::FromStr;

use archive::{ArchiveError, ArchiveReader, ArchiveWrite};

use crate::error::{CodecError, CodecResult, Stage};
use crate::flags::RequestFlags;
use crate::limits::CodecLimits;
use crate::location::{LocationCodec, TargetingLocation};
use crate::request::RequestInfo;
use crate::types::{Transform, Vec3};

/// Which shape of target data a value has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TargetDataKind {
    /// Request info and an origin.
    OriginInfo,
    /// Request info and a target location.
    TargetLocationInfo,
    /// Request info, an origin and a target location.
    LocationInfo,
}

impl TargetDataKind {
    pub const ALL: [Self; 3] = [Self::OriginInfo, Self::TargetLocationInfo, Self::LocationInfo];

    #[must_use]
    pub const fn has_origin(self) -> bool {
        matches!(self, Self::OriginInfo | Self::LocationInfo)
    }

    #[must_use]
    pub const fn has_end_point(self) -> bool {
        matches!(self, Self::TargetLocationInfo | Self::LocationInfo)
    }

    /// Returns a stable numeric code for this kind.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::OriginInfo => 0,
            Self::TargetLocationInfo => 1,
            Self::LocationInfo => 2,
        }
    }

    /// Returns the kind for a numeric code.
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::OriginInfo),
            1 => Some(Self::TargetLocationInfo),
            2 => Some(Self::LocationInfo),
            _ => None,
        }
    }

    /// Returns the short name used on the command line.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::OriginInfo => "origin",
            Self::TargetLocationInfo => "target",
            Self::LocationInfo => "location",
        }
    }

    /// Returns the stages this kind runs, in wire order.
    #[must_use]
    pub fn stages(self) -> &'static [Stage] {
        match self {
            Self::OriginInfo => &[Stage::ReplicationInfo, Stage::Origin],
            Self::TargetLocationInfo => &[Stage::ReplicationInfo, Stage::Target],
            Self::LocationInfo => &[Stage::ReplicationInfo, Stage::Origin, Stage::Target],
        }
    }
}

impl fmt::Display for TargetDataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TargetDataKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| {
                format!("unknown target data kind '{s}' (expected origin, target or location)")
            })
    }
}

/// Target data carrying request timing info for network prediction.
///
/// Each variant holds only the location payloads it declares. Accessors for
/// a location a variant does not declare return identity/zero values.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum NetworkedTargetData<L = TargetingLocation> {
    OriginInfo {
        replication: RequestInfo,
        origin: L,
    },
    TargetLocationInfo {
        replication: RequestInfo,
        target: L,
    },
    LocationInfo {
        replication: RequestInfo,
        origin: L,
        target: L,
    },
}

/// How the request info stage frames its presence word.
#[derive(Clone, Copy)]
enum Presence {
    /// Flags agreed out of band; not on the wire.
    Known(RequestFlags),
    /// Flags byte leads the request info.
    Prefixed,
}

impl<L> NetworkedTargetData<L> {
    pub const fn origin_info(replication: RequestInfo, origin: L) -> Self {
        Self::OriginInfo {
            replication,
            origin,
        }
    }

    pub const fn target_location_info(replication: RequestInfo, target: L) -> Self {
        Self::TargetLocationInfo {
            replication,
            target,
        }
    }

    pub const fn location_info(replication: RequestInfo, origin: L, target: L) -> Self {
        Self::LocationInfo {
            replication,
            origin,
            target,
        }
    }

    /// Creates an empty value of `kind`, ready to decode into.
    #[must_use]
    pub fn empty(kind: TargetDataKind) -> Self
    where
        L: Default,
    {
        let replication = RequestInfo::new();
        match kind {
            TargetDataKind::OriginInfo => Self::origin_info(replication, L::default()),
            TargetDataKind::TargetLocationInfo => {
                Self::target_location_info(replication, L::default())
            }
            TargetDataKind::LocationInfo => {
                Self::location_info(replication, L::default(), L::default())
            }
        }
    }

    #[must_use]
    pub const fn kind(&self) -> TargetDataKind {
        match self {
            Self::OriginInfo { .. } => TargetDataKind::OriginInfo,
            Self::TargetLocationInfo { .. } => TargetDataKind::TargetLocationInfo,
            Self::LocationInfo { .. } => TargetDataKind::LocationInfo,
        }
    }

    #[must_use]
    pub const fn has_origin(&self) -> bool {
        self.kind().has_origin()
    }

    #[must_use]
    pub const fn has_end_point(&self) -> bool {
        self.kind().has_end_point()
    }

    /// Returns the request info.
    #[must_use]
    pub const fn replication(&self) -> &RequestInfo {
        match self {
            Self::OriginInfo { replication, .. }
            | Self::TargetLocationInfo { replication, .. }
            | Self::LocationInfo { replication, .. } => replication,
        }
    }

    /// Returns the request info for the setters.
    pub fn replication_mut(&mut self) -> &mut RequestInfo {
        match self {
            Self::OriginInfo { replication, .. }
            | Self::TargetLocationInfo { replication, .. }
            | Self::LocationInfo { replication, .. } => replication,
        }
    }

    #[must_use]
    pub const fn origin_location(&self) -> Option<&L> {
        match self {
            Self::OriginInfo { origin, .. } | Self::LocationInfo { origin, .. } => Some(origin),
            Self::TargetLocationInfo { .. } => None,
        }
    }

    #[must_use]
    pub const fn target_location(&self) -> Option<&L> {
        match self {
            Self::TargetLocationInfo { target, .. } | Self::LocationInfo { target, .. } => {
                Some(target)
            }
            Self::OriginInfo { .. } => None,
        }
    }

    #[must_use]
    pub const fn has_timestamp(&self) -> bool {
        self.replication().has_timestamp()
    }

    #[must_use]
    pub const fn timestamp(&self) -> f32 {
        self.replication().timestamp()
    }

    #[must_use]
    pub const fn has_estimate_rtt(&self) -> bool {
        self.replication().has_estimate_rtt()
    }

    #[must_use]
    pub const fn estimate_rtt(&self) -> f32 {
        self.replication().estimate_rtt()
    }

    #[must_use]
    pub const fn has_reconciliation_id(&self) -> bool {
        self.replication().has_reconciliation_id()
    }

    #[must_use]
    pub const fn reconciliation_id(&self) -> i32 {
        self.replication().reconciliation_id()
    }
}

impl<L: LocationCodec> NetworkedTargetData<L> {
    /// Returns the origin transform, or identity if there is no origin.
    #[must_use]
    pub fn origin(&self) -> Transform {
        self.origin_location()
            .map_or(Transform::IDENTITY, LocationCodec::targeting_transform)
    }

    /// Returns the target point, or zero if there is no target.
    #[must_use]
    pub fn end_point(&self) -> Vec3 {
        self.end_point_transform().location()
    }

    /// Returns the target transform, or identity if there is no target.
    #[must_use]
    pub fn end_point_transform(&self) -> Transform {
        self.target_location()
            .map_or(Transform::IDENTITY, LocationCodec::targeting_transform)
    }

    /// Encodes request info then the declared locations.
    pub fn encode<W: ArchiveWrite>(&self, writer: &mut W, limits: &CodecLimits) -> CodecResult<()> {
        self.encode_with(writer, limits, false)
    }

    /// Like [`encode`](Self::encode), with a flags byte leading the request info.
    pub fn encode_prefixed<W: ArchiveWrite>(
        &self,
        writer: &mut W,
        limits: &CodecLimits,
    ) -> CodecResult<()> {
        self.encode_with(writer, limits, true)
    }

    /// Decodes request info then the declared locations.
    ///
    /// `flags` must be the presence word the encoder's request info carried.
    /// On failure the value is left partially decoded: stages before the
    /// failing one hold the decoded data, later stages are untouched.
    pub fn decode(
        &mut self,
        flags: RequestFlags,
        reader: &mut ArchiveReader<'_>,
        limits: &CodecLimits,
    ) -> CodecResult<()> {
        self.decode_with(reader, limits, Presence::Known(flags))
    }

    /// Like [`decode`](Self::decode), reading the flags byte from the wire.
    pub fn decode_prefixed(
        &mut self,
        reader: &mut ArchiveReader<'_>,
        limits: &CodecLimits,
    ) -> CodecResult<()> {
        self.decode_with(reader, limits, Presence::Prefixed)
    }

    fn encode_with<W: ArchiveWrite>(
        &self,
        writer: &mut W,
        limits: &CodecLimits,
        prefixed: bool,
    ) -> CodecResult<()> {
        let (replication, origin, target) = match self {
            Self::OriginInfo {
                replication,
                origin,
            } => (replication, Some(origin), None),
            Self::TargetLocationInfo {
                replication,
                target,
            } => (replication, None, Some(target)),
            Self::LocationInfo {
                replication,
                origin,
                target,
            } => (replication, Some(origin), Some(target)),
        };

        let result = if prefixed {
            replication.encode_prefixed(writer)
        } else {
            replication.encode(writer)
        };
        check_stage(Stage::ReplicationInfo, result, writer.error())?;

        for (stage, location) in [(Stage::Origin, origin), (Stage::Target, target)] {
            if let Some(location) = location {
                let result = location.encode(writer, limits);
                check_stage(stage, result, writer.error())?;
            }
        }
        Ok(())
    }

    fn decode_with(
        &mut self,
        reader: &mut ArchiveReader<'_>,
        limits: &CodecLimits,
        presence: Presence,
    ) -> CodecResult<()> {
        let (replication, origin, target) = match self {
            Self::OriginInfo {
                replication,
                origin,
            } => (replication, Some(origin), None),
            Self::TargetLocationInfo {
                replication,
                target,
            } => (replication, None, Some(target)),
            Self::LocationInfo {
                replication,
                origin,
                target,
            } => (replication, Some(origin), Some(target)),
        };

        let result = match presence {
            Presence::Known(flags) => replication.decode(flags, reader),
            Presence::Prefixed => replication.decode_prefixed(reader),
        };
        check_stage(Stage::ReplicationInfo, result, reader.error())?;

        for (stage, location) in [(Stage::Origin, origin), (Stage::Target, target)] {
            if let Some(location) = location {
                let result = location.decode(reader, limits);
                check_stage(stage, result, reader.error())?;
            }
        }
        Ok(())
    }
}

/// Turns one stage's outcome into the pipeline's outcome.
///
/// A stage fails if it returned an error or if the cursor is in its error
/// state afterwards, whichever the stage reported.
fn check_stage(
    stage: Stage,
    result: CodecResult<()>,
    archive_error: Option<&ArchiveError>,
) -> CodecResult<()> {
    let err = match (result, archive_error) {
        (Err(source), _) => CodecError::Stage {
            stage,
            source: Box::new(source),
        },
        (Ok(()), Some(error)) => CodecError::ArchiveFaulted {
            stage,
            error: error.clone(),
        },
        (Ok(()), None) => {
            tracing::trace!(%stage, "target data stage complete");
            return Ok(());
        }
    };
    tracing::debug!(%stage, error = %err, "target data pipeline aborted");
    Err(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::RequestFlag;
    use crate::types::NetGuid;
    use archive::{ArchiveVecWriter, ArchiveWriter};

    fn literal_at(x: f32) -> TargetingLocation {
        TargetingLocation::literal(Transform::from_translation(Vec3::new(x, 0.0, 0.0)))
    }

    fn encode(data: &NetworkedTargetData) -> Vec<u8> {
        let mut writer = ArchiveVecWriter::new();
        data.encode(&mut writer, &CodecLimits::default()).unwrap();
        writer.finish()
    }

    #[test]
    fn capability_table() {
        let info = RequestInfo::new();
        let origin: NetworkedTargetData = NetworkedTargetData::origin_info(info, literal_at(1.0));
        let target: NetworkedTargetData =
            NetworkedTargetData::target_location_info(info, literal_at(2.0));
        let both: NetworkedTargetData =
            NetworkedTargetData::location_info(info, literal_at(1.0), literal_at(2.0));

        assert!(origin.has_origin() && !origin.has_end_point());
        assert!(!target.has_origin() && target.has_end_point());
        assert!(both.has_origin() && both.has_end_point());
    }

    #[test]
    fn capabilities_do_not_depend_on_data() {
        for kind in TargetDataKind::ALL {
            let empty = NetworkedTargetData::<TargetingLocation>::empty(kind);
            let mut populated = empty.clone();
            populated.replication_mut().set_timestamp(1.0);
            assert_eq!(empty.has_origin(), populated.has_origin());
            assert_eq!(empty.has_end_point(), populated.has_end_point());
            assert_eq!(empty.kind(), kind);
        }
    }

    #[test]
    fn undeclared_accessors_return_defaults() {
        let data = NetworkedTargetData::origin_info(RequestInfo::new(), literal_at(5.0));
        assert_eq!(data.end_point(), Vec3::ZERO);
        assert_eq!(data.end_point_transform(), Transform::IDENTITY);
        assert!(data.target_location().is_none());
        assert_eq!(data.origin().translation.x, 5.0);

        let data = NetworkedTargetData::target_location_info(RequestInfo::new(), literal_at(7.0));
        assert_eq!(data.origin(), Transform::IDENTITY);
        assert!(data.origin_location().is_none());
        assert_eq!(data.end_point(), Vec3::new(7.0, 0.0, 0.0));
    }

    #[test]
    fn request_accessors_delegate() {
        let data = NetworkedTargetData::location_info(
            RequestInfo::with_all(4.0, 0.1, 12),
            literal_at(0.0),
            literal_at(1.0),
        );
        assert!(data.has_timestamp());
        assert_eq!(data.timestamp(), 4.0);
        assert!(data.has_estimate_rtt());
        assert_eq!(data.estimate_rtt(), 0.1);
        assert!(data.has_reconciliation_id());
        assert_eq!(data.reconciliation_id(), 12);
    }

    #[test]
    fn encode_order_is_replication_origin_target() {
        let mut info = RequestInfo::new();
        info.set_reconciliation_id(3);
        let data = NetworkedTargetData::location_info(
            info,
            TargetingLocation::actor(NetGuid::new(1)),
            TargetingLocation::actor(NetGuid::new(2)),
        );
        assert_eq!(encode(&data), vec![3, 0, 0, 0, 1, 1, 1, 2]);
    }

    #[test]
    fn roundtrip_each_kind() {
        let info = RequestInfo::with_all(1.25, 0.08, 900);
        let values = [
            NetworkedTargetData::origin_info(info, literal_at(1.0)),
            NetworkedTargetData::target_location_info(
                info,
                TargetingLocation::socket(NetGuid::new(4), "hand_r"),
            ),
            NetworkedTargetData::location_info(
                info,
                literal_at(3.0),
                TargetingLocation::actor(NetGuid::new(77)),
            ),
        ];
        for value in values {
            let bytes = encode(&value);
            let mut decoded: NetworkedTargetData = NetworkedTargetData::empty(value.kind());
            let mut reader = ArchiveReader::new(&bytes);
            decoded
                .decode(info.flags(), &mut reader, &CodecLimits::default())
                .unwrap();
            assert_eq!(decoded, value);
            assert!(reader.is_empty());
        }
    }

    #[test]
    fn prefixed_roundtrip() {
        let mut info = RequestInfo::new();
        info.set_timestamp(8.0);
        let value = NetworkedTargetData::target_location_info(info, literal_at(2.0));
        let mut writer = ArchiveVecWriter::new();
        value
            .encode_prefixed(&mut writer, &CodecLimits::default())
            .unwrap();
        let bytes = writer.finish();
        assert_eq!(bytes[0], RequestFlag::Timestamp.bit());

        let mut decoded: NetworkedTargetData =
            NetworkedTargetData::empty(TargetDataKind::TargetLocationInfo);
        decoded
            .decode_prefixed(&mut ArchiveReader::new(&bytes), &CodecLimits::default())
            .unwrap();
        assert_eq!(decoded, value);
    }

    #[test]
    fn truncated_origin_stops_before_target() {
        let value = NetworkedTargetData::location_info(
            RequestInfo::with_all(1.0, 2.0, 3),
            literal_at(1.0),
            TargetingLocation::actor(NetGuid::new(5)),
        );
        let bytes = encode(&value);
        // Request info (12) + origin tag + part of the transform.
        let cut = &bytes[..12 + 1 + 8];

        let mut decoded: NetworkedTargetData =
            NetworkedTargetData::empty(TargetDataKind::LocationInfo);
        let err = decoded
            .decode(RequestFlags::ALL, &mut ArchiveReader::new(cut), &CodecLimits::default())
            .unwrap_err();
        assert_eq!(err.stage(), Some(Stage::Origin));
        assert!(err.archive_error().is_some());
        assert_eq!(decoded.reconciliation_id(), 3);
        assert_eq!(decoded.target_location(), Some(&TargetingLocation::default()));
    }

    #[test]
    fn encode_overflow_reports_stage() {
        let value = NetworkedTargetData::origin_info(RequestInfo::new(), literal_at(1.0));
        let mut buf = [0u8; 8];
        let mut writer = ArchiveWriter::new(&mut buf);
        let err = value
            .encode(&mut writer, &CodecLimits::default())
            .unwrap_err();
        assert_eq!(err.stage(), Some(Stage::Origin));
    }

    #[test]
    fn check_stage_catches_faulted_cursor() {
        let fault = ArchiveError::UnexpectedEof {
            requested: 4,
            available: 0,
        };
        let err = check_stage(Stage::Target, Ok(()), Some(&fault)).unwrap_err();
        assert_eq!(
            err,
            CodecError::ArchiveFaulted {
                stage: Stage::Target,
                error: fault
            }
        );
        assert!(check_stage(Stage::Origin, Ok(()), None).is_ok());
    }

    #[test]
    fn kind_names_and_codes() {
        for kind in TargetDataKind::ALL {
            assert_eq!(kind.name().parse::<TargetDataKind>(), Ok(kind));
            assert_eq!(TargetDataKind::from_code(kind.code()), Some(kind));
            assert_eq!(kind.stages()[0], Stage::ReplicationInfo);
            assert_eq!(
                kind.stages().len(),
                1 + usize::from(kind.has_origin()) + usize::from(kind.has_end_point())
            );
        }
        assert!("sphere".parse::<TargetDataKind>().is_err());
        assert_eq!(TargetDataKind::from_code(3), None);
    }
}
