//! Serde helpers that keep every `f32` bit pattern.
//!
//! Finite values serialize as plain numbers. NaN and the infinities, which
//! JSON has no literal for, serialize as a `"0x"`-prefixed hex string of
//! their bits, so payloads carrying them survive a text round trip.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum Repr {
    Number(f32),
    Bits(String),
}

pub fn serialize<S: Serializer>(value: &f32, serializer: S) -> Result<S::Ok, S::Error> {
    if value.is_finite() {
        serializer.serialize_f32(*value)
    } else {
        serializer.collect_str(&format_args!("{:#010x}", value.to_bits()))
    }
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f32, D::Error> {
    match Repr::deserialize(deserializer)? {
        Repr::Number(value) => Ok(value),
        Repr::Bits(text) => parse_bits(&text).ok_or_else(|| {
            D::Error::custom(format!(
                "invalid f32 bit pattern '{text}' (expected a number or 0x-prefixed hex)"
            ))
        }),
    }
}

fn parse_bits(text: &str) -> Option<f32> {
    let digits = text.strip_prefix("0x")?;
    u32::from_str_radix(digits, 16).ok().map(f32::from_bits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_bits_accepts_hex() {
        let nan = parse_bits("0x7fc00001").unwrap();
        assert!(nan.is_nan());
        assert_eq!(nan.to_bits(), 0x7fc0_0001);
        assert_eq!(parse_bits("0xff800000"), Some(f32::NEG_INFINITY));
    }

    #[test]
    fn parse_bits_rejects_other_text() {
        assert_eq!(parse_bits("7fc00000"), None);
        assert_eq!(parse_bits("0xnope"), None);
        assert_eq!(parse_bits("NaN"), None);
    }

    #[test]
    fn hex_format_is_fixed_width() {
        assert_eq!(format!("{:#010x}", f32::INFINITY.to_bits()), "0x7f800000");
    }
}
