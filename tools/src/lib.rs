//! Introspection and debugging tools for the abnet codec.
//!
//! This crate provides utilities for working with encoded payload files:
//!
//! - Decode a request info or target data payload into a JSON document
//! - Encode a JSON document back into payload bytes
//! - Inspect the byte span each pipeline stage occupies
//!
//! Plain payloads do not carry their presence flags, so every entry point
//! takes a [`Framing`] saying where the flags come from.
//!
//! # Design Principles
//!
//! - **First-class tooling** - These tools are part of the product, not afterthoughts.
//! - **Human-readable output** - Make it easy to understand what the codec is doing.

use std::fmt::{self, Write as _};
use std::str::FromStr;

use archive::{ArchiveReader, ArchiveVecWriter};
use codec::{
    CodecError, CodecLimits, CodecResult, LocationCodec, NetworkedTargetData, RequestFlags,
    RequestInfo, Stage, TargetDataKind, TargetingLocation,
};
use serde::{Deserialize, Serialize};

/// What a payload file holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    /// A bare request info.
    Request,
    /// Target data of the given kind.
    Target(TargetDataKind),
}

impl PayloadKind {
    /// Returns the stages this payload runs, in wire order.
    pub fn stages(self) -> &'static [Stage] {
        match self {
            Self::Request => &[Stage::ReplicationInfo],
            Self::Target(kind) => kind.stages(),
        }
    }
}

impl fmt::Display for PayloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Request => f.write_str("request"),
            Self::Target(kind) => write!(f, "{kind}"),
        }
    }
}

impl FromStr for PayloadKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "request" {
            return Ok(Self::Request);
        }
        s.parse::<TargetDataKind>().map(Self::Target).map_err(|_| {
            format!("unknown payload kind '{s}' (expected request, origin, target or location)")
        })
    }
}

/// Where the request info's presence flags come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    /// Agreed out of band; the payload holds only the present fields.
    Plain(RequestFlags),
    /// A flags byte leads the request info.
    Prefixed,
}

/// A decoded payload, in the shape `encode` reads back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Document {
    Request(RequestInfo),
    Target(NetworkedTargetData),
}

impl Document {
    pub const fn kind(&self) -> PayloadKind {
        match self {
            Self::Request(_) => PayloadKind::Request,
            Self::Target(data) => PayloadKind::Target(data.kind()),
        }
    }

    pub const fn replication(&self) -> &RequestInfo {
        match self {
            Self::Request(info) => info,
            Self::Target(data) => data.replication(),
        }
    }
}

/// Result of decoding a payload file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodeReport {
    pub document: Document,
    /// Bytes the payload occupied.
    pub consumed: usize,
    /// Bytes left over after the payload.
    pub trailing: usize,
}

/// Decodes `bytes` as a payload of `kind`.
pub fn decode_payload(
    bytes: &[u8],
    kind: PayloadKind,
    framing: Framing,
    limits: &CodecLimits,
) -> CodecResult<DecodeReport> {
    let mut reader = ArchiveReader::new(bytes);
    let document = match kind {
        PayloadKind::Request => {
            let mut info = RequestInfo::new();
            match framing {
                Framing::Plain(flags) => info.decode(flags, &mut reader)?,
                Framing::Prefixed => info.decode_prefixed(&mut reader)?,
            }
            Document::Request(info)
        }
        PayloadKind::Target(kind) => {
            let mut data = NetworkedTargetData::empty(kind);
            match framing {
                Framing::Plain(flags) => data.decode(flags, &mut reader, limits)?,
                Framing::Prefixed => data.decode_prefixed(&mut reader, limits)?,
            }
            Document::Target(data)
        }
    };
    let report = DecodeReport {
        document,
        consumed: reader.position(),
        trailing: reader.remaining(),
    };
    if report.trailing > 0 {
        tracing::warn!(trailing = report.trailing, "payload has trailing bytes");
    }
    Ok(report)
}

/// Encodes `document`, optionally with a leading flags byte.
pub fn encode_document(
    document: &Document,
    prefixed: bool,
    limits: &CodecLimits,
) -> CodecResult<Vec<u8>> {
    let mut writer = ArchiveVecWriter::new();
    match (document, prefixed) {
        (Document::Request(info), false) => info.encode(&mut writer)?,
        (Document::Request(info), true) => info.encode_prefixed(&mut writer)?,
        (Document::Target(data), false) => data.encode(&mut writer, limits)?,
        (Document::Target(data), true) => data.encode_prefixed(&mut writer, limits)?,
    }
    Ok(writer.finish())
}

/// What a span of payload bytes holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SpanLabel {
    /// The leading flags byte of a prefixed payload.
    Flags,
    Stage(Stage),
}

impl fmt::Display for SpanLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flags => f.write_str("flags"),
            Self::Stage(stage) => write!(f, "{stage}"),
        }
    }
}

/// Byte range one stage occupied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StageSpan {
    pub label: SpanLabel,
    pub start: usize,
    pub len: usize,
}

/// Stage-by-stage layout of a payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InspectReport {
    pub kind: String,
    /// Presence flags the request info was read with.
    pub flags: RequestFlags,
    pub total: usize,
    /// Completed stages, in wire order.
    pub spans: Vec<StageSpan>,
    pub trailing: usize,
    /// The error that stopped the walk, if any.
    pub error: Option<String>,
}

/// Walks `bytes` stage by stage and records where each stage starts and ends.
///
/// Unlike [`decode_payload`], a failing stage does not fail the call; the
/// report lists the stages that completed and the error that stopped it.
pub fn inspect_payload(
    bytes: &[u8],
    kind: PayloadKind,
    framing: Framing,
    limits: &CodecLimits,
) -> InspectReport {
    let mut reader = ArchiveReader::new(bytes);
    let mut report = InspectReport {
        kind: kind.to_string(),
        flags: RequestFlags::NONE,
        total: bytes.len(),
        spans: Vec::new(),
        trailing: 0,
        error: None,
    };

    let flags = match framing {
        Framing::Plain(flags) => Ok(flags),
        Framing::Prefixed => record(&mut report, &mut reader, SpanLabel::Flags, |reader| {
            Ok(RequestFlags::from_raw(reader.read_u8()?))
        }),
    };
    let walked = flags.and_then(|flags| {
        report.flags = flags;
        let mut info = RequestInfo::new();
        record(
            &mut report,
            &mut reader,
            SpanLabel::Stage(Stage::ReplicationInfo),
            |reader| info.decode(flags, reader),
        )?;
        for &stage in &kind.stages()[1..] {
            let mut location = TargetingLocation::default();
            record(&mut report, &mut reader, SpanLabel::Stage(stage), |reader| {
                location.decode(reader, limits)
            })?;
        }
        Ok(())
    });

    if let Err(err) = walked {
        report.error = Some(err.to_string());
    }
    report.trailing = reader.remaining();
    report
}

fn record<T>(
    report: &mut InspectReport,
    reader: &mut ArchiveReader<'_>,
    label: SpanLabel,
    step: impl FnOnce(&mut ArchiveReader<'_>) -> CodecResult<T>,
) -> CodecResult<T> {
    let start = reader.position();
    let value = step(reader).map_err(|err| match label {
        SpanLabel::Stage(stage) => CodecError::Stage {
            stage,
            source: Box::new(err),
        },
        SpanLabel::Flags => err,
    })?;
    report.spans.push(StageSpan {
        label,
        start,
        len: reader.position() - start,
    });
    Ok(value)
}

/// Renders a decode report for humans.
pub fn format_decode_pretty(report: &DecodeReport) -> String {
    let mut out = String::new();
    let document = &report.document;
    let info = document.replication();
    let _ = writeln!(out, "kind: {}", document.kind());
    let _ = writeln!(out, "flags: {}", info.flags());
    if info.has_timestamp() {
        let _ = writeln!(out, "  timestamp: {}", info.timestamp());
    }
    if info.has_estimate_rtt() {
        let _ = writeln!(out, "  estimate_rtt: {}", info.estimate_rtt());
    }
    if info.has_reconciliation_id() {
        let _ = writeln!(out, "  reconciliation_id: {}", info.reconciliation_id());
    }
    if let Document::Target(data) = document {
        if let Some(origin) = data.origin_location() {
            let _ = writeln!(out, "origin: {}", describe_location(origin));
        }
        if let Some(target) = data.target_location() {
            let _ = writeln!(out, "target: {}", describe_location(target));
        }
    }
    let _ = write!(
        out,
        "consumed: {} bytes, trailing: {} bytes",
        report.consumed, report.trailing
    );
    out
}

/// Renders an inspect report for humans.
pub fn format_inspect_pretty(report: &InspectReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "kind: {} flags: {} total: {} bytes",
        report.kind, report.flags, report.total
    );
    for span in &report.spans {
        let _ = writeln!(
            out,
            "  {}: [{}..{}) {} bytes",
            span.label,
            span.start,
            span.start + span.len,
            span.len
        );
    }
    if let Some(error) = &report.error {
        let _ = writeln!(out, "error: {error}");
    }
    let _ = write!(out, "trailing: {} bytes", report.trailing);
    out
}

fn describe_location(location: &TargetingLocation) -> String {
    use codec::LocationSource;

    match &location.source {
        LocationSource::LiteralTransform => {
            let t = location.literal;
            format!(
                "literal at ({}, {}, {})",
                t.translation.x, t.translation.y, t.translation.z
            )
        }
        LocationSource::ActorTransform { actor } => format!("actor {}", actor.raw()),
        LocationSource::SocketTransform { component, socket } => {
            format!("socket '{socket}' on {}", component.raw())
        }
    }
}
