//! Presence flags for optional request fields.

use std::fmt;
use std::ops::BitOr;
use std::str::FromStr;

/// One optional field of a request info, named by its presence bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum RequestFlag {
    Timestamp = 1 << 0,
    EstimateRtt = 1 << 1,
    ReconciliationId = 1 << 2,
}

impl RequestFlag {
    /// All flags in wire order.
    pub const ALL: [Self; 3] = [Self::Timestamp, Self::EstimateRtt, Self::ReconciliationId];

    /// Returns the bit this flag occupies.
    #[must_use]
    pub const fn bit(self) -> u8 {
        self as u8
    }

    /// Returns the short name used on the command line.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Timestamp => "timestamp",
            Self::EstimateRtt => "rtt",
            Self::ReconciliationId => "reconciliation-id",
        }
    }
}

impl fmt::Display for RequestFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown flag name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownFlag(pub String);

impl fmt::Display for UnknownFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown request flag '{}' (expected timestamp, rtt or reconciliation-id)",
            self.0
        )
    }
}

impl std::error::Error for UnknownFlag {}

impl FromStr for RequestFlag {
    type Err = UnknownFlag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "timestamp" | "ts" => Ok(Self::Timestamp),
            "rtt" | "estimate-rtt" => Ok(Self::EstimateRtt),
            "reconciliation-id" | "id" => Ok(Self::ReconciliationId),
            other => Err(UnknownFlag(other.to_string())),
        }
    }
}

/// Presence bitmask for the optional request fields.
///
/// Only the low three bits are interpreted. The remaining bits are reserved;
/// they are kept verbatim so the stored word always round-trips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct RequestFlags(u8);

impl RequestFlags {
    /// No field present.
    pub const NONE: Self = Self(0);

    /// All three fields present.
    pub const ALL: Self = Self(Self::KNOWN_MASK);

    /// Bits that carry meaning.
    const KNOWN_MASK: u8 = 0b111;

    /// Creates flags from a raw value, reserved bits included.
    #[must_use]
    pub const fn from_raw(raw: u8) -> Self {
        Self(raw)
    }

    /// Returns the raw flag word, reserved bits included.
    #[must_use]
    pub const fn raw(self) -> u8 {
        self.0
    }

    /// Returns only the interpreted bits.
    #[must_use]
    pub const fn known(self) -> Self {
        Self(self.0 & Self::KNOWN_MASK)
    }

    /// Returns the reserved bits that are set.
    #[must_use]
    pub const fn reserved_bits(self) -> u8 {
        self.0 & !Self::KNOWN_MASK
    }

    /// Returns `true` if `flag` is set.
    #[must_use]
    pub const fn contains(self, flag: RequestFlag) -> bool {
        self.0 & flag.bit() != 0
    }

    /// Returns `true` if no interpreted bit is set.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 & Self::KNOWN_MASK == 0
    }

    /// Returns the number of interpreted bits set.
    #[must_use]
    pub const fn count(self) -> usize {
        (self.0 & Self::KNOWN_MASK).count_ones() as usize
    }

    /// Iterates over the set flags in wire order.
    pub fn iter(self) -> impl Iterator<Item = RequestFlag> {
        RequestFlag::ALL
            .into_iter()
            .filter(move |flag| self.contains(*flag))
    }

    /// ORs `flag` in. There is deliberately no way to clear a bit.
    pub(crate) fn insert(&mut self, flag: RequestFlag) {
        self.0 |= flag.bit();
    }
}

impl From<RequestFlag> for RequestFlags {
    fn from(flag: RequestFlag) -> Self {
        Self(flag.bit())
    }
}

impl BitOr for RequestFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOr<RequestFlag> for RequestFlags {
    type Output = Self;

    fn bitor(self, rhs: RequestFlag) -> Self {
        Self(self.0 | rhs.bit())
    }
}

impl BitOr for RequestFlag {
    type Output = RequestFlags;

    fn bitor(self, rhs: Self) -> RequestFlags {
        RequestFlags(self.bit() | rhs.bit())
    }
}

impl FromIterator<RequestFlag> for RequestFlags {
    fn from_iter<I: IntoIterator<Item = RequestFlag>>(iter: I) -> Self {
        let mut flags = Self::NONE;
        for flag in iter {
            flags.insert(flag);
        }
        flags
    }
}

impl fmt::Display for RequestFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            f.write_str("none")?;
        } else {
            for (index, flag) in self.iter().enumerate() {
                if index > 0 {
                    f.write_str("|")?;
                }
                f.write_str(flag.name())?;
            }
        }
        if self.reserved_bits() != 0 {
            write!(f, " (reserved 0x{:02x})", self.reserved_bits())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_bits() {
        assert_eq!(RequestFlag::Timestamp.bit(), 0b001);
        assert_eq!(RequestFlag::EstimateRtt.bit(), 0b010);
        assert_eq!(RequestFlag::ReconciliationId.bit(), 0b100);
    }

    #[test]
    fn default_is_empty() {
        let flags = RequestFlags::default();
        assert_eq!(flags, RequestFlags::NONE);
        assert!(flags.is_empty());
        assert_eq!(flags.count(), 0);
        assert_eq!(flags.iter().count(), 0);
    }

    #[test]
    fn bitor_composition() {
        let flags = RequestFlag::Timestamp | RequestFlag::ReconciliationId;
        assert!(flags.contains(RequestFlag::Timestamp));
        assert!(!flags.contains(RequestFlag::EstimateRtt));
        assert!(flags.contains(RequestFlag::ReconciliationId));
        assert_eq!(flags.raw(), 0b101);

        let all = flags | RequestFlag::EstimateRtt;
        assert_eq!(all, RequestFlags::ALL);
        assert_eq!(
            RequestFlags::from(RequestFlag::EstimateRtt) | RequestFlags::from_raw(0b101),
            RequestFlags::ALL
        );
    }

    #[test]
    fn reserved_bits_are_preserved() {
        let flags = RequestFlags::from_raw(0b1010_0011);
        assert_eq!(flags.raw(), 0b1010_0011);
        assert_eq!(flags.known().raw(), 0b011);
        assert_eq!(flags.reserved_bits(), 0b1010_0000);
        assert_eq!(flags.count(), 2);
        assert!(flags.contains(RequestFlag::Timestamp));
        assert!(flags.contains(RequestFlag::EstimateRtt));
        assert!(!flags.contains(RequestFlag::ReconciliationId));
    }

    #[test]
    fn reserved_only_is_empty() {
        let flags = RequestFlags::from_raw(0b1000);
        assert!(flags.is_empty());
        assert_eq!(flags.raw(), 0b1000);
    }

    #[test]
    fn insert_accumulates() {
        let mut flags = RequestFlags::NONE;
        flags.insert(RequestFlag::ReconciliationId);
        flags.insert(RequestFlag::ReconciliationId);
        flags.insert(RequestFlag::Timestamp);
        assert_eq!(flags.raw(), 0b101);
    }

    #[test]
    fn iter_is_wire_order() {
        let flags: RequestFlags = [RequestFlag::ReconciliationId, RequestFlag::Timestamp]
            .into_iter()
            .collect();
        let order: Vec<_> = flags.iter().collect();
        assert_eq!(
            order,
            vec![RequestFlag::Timestamp, RequestFlag::ReconciliationId]
        );
    }

    #[test]
    fn parse_names() {
        assert_eq!("timestamp".parse(), Ok(RequestFlag::Timestamp));
        assert_eq!("rtt".parse(), Ok(RequestFlag::EstimateRtt));
        assert_eq!("id".parse(), Ok(RequestFlag::ReconciliationId));
        for flag in RequestFlag::ALL {
            assert_eq!(flag.name().parse(), Ok(flag));
        }
        let err = "latency".parse::<RequestFlag>().unwrap_err();
        assert!(err.to_string().contains("latency"));
    }

    #[test]
    fn display() {
        assert_eq!(RequestFlags::NONE.to_string(), "none");
        assert_eq!(
            RequestFlags::ALL.to_string(),
            "timestamp|rtt|reconciliation-id"
        );
        assert_eq!(
            RequestFlags::from_raw(0x42).to_string(),
            "rtt (reserved 0x40)"
        );
    }
}
