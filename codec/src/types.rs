//! Core value types for the codec.

use archive::{ArchiveReader, ArchiveWrite};

use crate::error::CodecResult;

/// A network object identifier.
///
/// Identifiers are assigned by the host's replication layer; the codec
/// carries them without resolving them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct NetGuid(u32);

impl NetGuid {
    /// Creates a new network id.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw id value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Returns `true` for the null id (no object).
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl From<u32> for NetGuid {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<NetGuid> for u32 {
    fn from(id: NetGuid) -> Self {
        id.0
    }
}

/// A 3-component vector.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec3 {
    #[cfg_attr(feature = "serde", serde(with = "crate::serde_f32"))]
    pub x: f32,
    #[cfg_attr(feature = "serde", serde(with = "crate::serde_f32"))]
    pub y: f32,
    #[cfg_attr(feature = "serde", serde(with = "crate::serde_f32"))]
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);
    pub const ONE: Self = Self::new(1.0, 1.0, 1.0);

    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// A rotation quaternion.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Quat {
    #[cfg_attr(feature = "serde", serde(with = "crate::serde_f32"))]
    pub x: f32,
    #[cfg_attr(feature = "serde", serde(with = "crate::serde_f32"))]
    pub y: f32,
    #[cfg_attr(feature = "serde", serde(with = "crate::serde_f32"))]
    pub z: f32,
    #[cfg_attr(feature = "serde", serde(with = "crate::serde_f32"))]
    pub w: f32,
}

impl Quat {
    pub const IDENTITY: Self = Self::new(0.0, 0.0, 0.0, 1.0);

    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }
}

impl Default for Quat {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Rotation, translation and scale.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Transform {
    pub rotation: Quat,
    pub translation: Vec3,
    pub scale: Vec3,
}

impl Transform {
    /// No rotation, no translation, unit scale.
    pub const IDENTITY: Self = Self {
        rotation: Quat::IDENTITY,
        translation: Vec3::ZERO,
        scale: Vec3::ONE,
    };

    /// Encoded size in bytes (ten `f32` values).
    pub const ENCODED_LEN: usize = 10 * 4;

    /// Creates an unrotated, unit-scale transform at `translation`.
    #[must_use]
    pub const fn from_translation(translation: Vec3) -> Self {
        Self {
            rotation: Quat::IDENTITY,
            translation,
            scale: Vec3::ONE,
        }
    }

    /// Returns the translation component.
    #[must_use]
    pub const fn location(&self) -> Vec3 {
        self.translation
    }

    pub(crate) fn encode<W: ArchiveWrite>(&self, writer: &mut W) -> CodecResult<()> {
        let Quat { x, y, z, w } = self.rotation;
        for value in [x, y, z, w] {
            writer.write_f32(value)?;
        }
        write_vec3(writer, self.translation)?;
        write_vec3(writer, self.scale)
    }

    pub(crate) fn decode(reader: &mut ArchiveReader<'_>) -> CodecResult<Self> {
        let rotation = Quat::new(
            reader.read_f32()?,
            reader.read_f32()?,
            reader.read_f32()?,
            reader.read_f32()?,
        );
        let translation = read_vec3(reader)?;
        let scale = read_vec3(reader)?;
        Ok(Self {
            rotation,
            translation,
            scale,
        })
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

fn write_vec3<W: ArchiveWrite>(writer: &mut W, v: Vec3) -> CodecResult<()> {
    writer.write_f32(v.x)?;
    writer.write_f32(v.y)?;
    writer.write_f32(v.z)?;
    Ok(())
}

fn read_vec3(reader: &mut ArchiveReader<'_>) -> CodecResult<Vec3> {
    Ok(Vec3::new(
        reader.read_f32()?,
        reader.read_f32()?,
        reader.read_f32()?,
    ))
}
