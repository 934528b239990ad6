//! Error types for codec operations.

use std::fmt;

use archive::ArchiveError;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while encoding or decoding request and target data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The underlying cursor faulted (short read, full buffer, bad varint).
    Archive(ArchiveError),

    /// A stage of a target data pipeline failed.
    Stage {
        /// The stage that failed.
        stage: Stage,
        /// Why it failed.
        source: Box<CodecError>,
    },

    /// A stage reported success but left the cursor in its error state.
    ArchiveFaulted {
        /// The stage after which the fault was observed.
        stage: Stage,
        /// The error recorded by the cursor.
        error: ArchiveError,
    },

    /// Unknown location source tag.
    InvalidLocationSource { raw: u8 },

    /// Socket name bytes are not valid UTF-8.
    InvalidSocketName,

    /// A configured limit was exceeded.
    LimitsExceeded {
        kind: LimitKind,
        limit: usize,
        actual: usize,
    },
}

/// A step of the target data pipeline, in wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Stage {
    ReplicationInfo,
    Origin,
    Target,
}

/// Specific limit that was exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitKind {
    SocketNameBytes,
}

impl CodecError {
    /// Returns the pipeline stage this error is attributed to, if any.
    #[must_use]
    pub const fn stage(&self) -> Option<Stage> {
        match self {
            Self::Stage { stage, .. } | Self::ArchiveFaulted { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// Returns the cursor error at the root of this error, if any.
    #[must_use]
    pub fn archive_error(&self) -> Option<&ArchiveError> {
        match self {
            Self::Archive(err) | Self::ArchiveFaulted { error: err, .. } => Some(err),
            Self::Stage { source, .. } => source.archive_error(),
            _ => None,
        }
    }
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Archive(e) => write!(f, "archive error: {e}"),
            Self::Stage { stage, source } => write!(f, "{stage} stage failed: {source}"),
            Self::ArchiveFaulted { stage, error } => {
                write!(f, "archive faulted after {stage} stage: {error}")
            }
            Self::InvalidLocationSource { raw } => {
                write!(f, "invalid location source tag {raw}")
            }
            Self::InvalidSocketName => write!(f, "socket name is not valid utf-8"),
            Self::LimitsExceeded {
                kind,
                limit,
                actual,
            } => {
                write!(f, "{kind} limit exceeded: {actual} > {limit}")
            }
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ReplicationInfo => "replication info",
            Self::Origin => "origin",
            Self::Target => "target",
        };
        write!(f, "{name}")
    }
}

impl fmt::Display for LimitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::SocketNameBytes => "socket name bytes",
        };
        write!(f, "{name}")
    }
}

impl std::error::Error for CodecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Archive(e) | Self::ArchiveFaulted { error: e, .. } => Some(e),
            Self::Stage { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

impl From<ArchiveError> for CodecError {
    fn from(err: ArchiveError) -> Self {
        Self::Archive(err)
    }
}
