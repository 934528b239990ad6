//! Limits for codec-level encoding and decoding.

/// Codec-specific limits enforced on both encode and decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecLimits {
    /// Maximum length of a socket name in a location payload, in bytes.
    pub max_socket_name_bytes: usize,
}

impl Default for CodecLimits {
    fn default() -> Self {
        Self {
            max_socket_name_bytes: 256,
        }
    }
}

impl CodecLimits {
    /// Creates limits suitable for testing with smaller values.
    #[must_use]
    pub const fn for_testing() -> Self {
        Self {
            max_socket_name_bytes: 32,
        }
    }

    /// Creates limits with no restrictions (use with caution).
    #[must_use]
    pub const fn unlimited() -> Self {
        Self {
            max_socket_name_bytes: usize::MAX,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_limits_are_reasonable() {
        let limits = CodecLimits::default();
        assert!(limits.max_socket_name_bytes >= 64);
    }

    #[test]
    fn testing_limits_smaller() {
        assert!(
            CodecLimits::for_testing().max_socket_name_bytes
                < CodecLimits::default().max_socket_name_bytes
        );
    }

    #[test]
    fn unlimited_limits() {
        assert_eq!(CodecLimits::unlimited().max_socket_name_bytes, usize::MAX);
    }
}
