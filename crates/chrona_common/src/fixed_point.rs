//! Signed fixed-point encoding of simulated time.
//!
//! Every time-valued quantity in the generated harness (requested time steps,
//! the arbitrated `emu_dt`, the accumulated `emu_time`, capture trigger values)
//! is a signed integer counting units of `2^exponent` seconds. A [`TimeFormat`]
//! pairs the bit width of such an integer with its exponent and converts real
//! times into the encoded form and back.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Widest encoding supported; encoded values are held in an `i64`.
pub const MAX_WIDTH: u32 = 64;

/// Smallest exponent accepted (2^-1022 is the smallest normal `f64`).
pub const MIN_EXPONENT: i32 = -1022;

/// Largest exponent accepted.
pub const MAX_EXPONENT: i32 = 1023;

/// Errors produced while building a format or encoding a time value.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FixedPointError {
    /// The bit width is zero or wider than [`MAX_WIDTH`].
    #[error("invalid fixed-point width {0} (expected 1..={MAX_WIDTH})")]
    InvalidWidth(u32),

    /// The exponent lies outside the range representable by `f64`.
    #[error("invalid fixed-point exponent {0} (expected {MIN_EXPONENT}..={MAX_EXPONENT})")]
    InvalidExponent(i32),

    /// The input time is NaN or infinite.
    #[error("time value {0} is not finite")]
    NotFinite(f64),

    /// The encoded magnitude does not fit in the configured width.
    #[error("time value {value} does not fit in {width} signed bits at 2^{exponent} s resolution")]
    OutOfRange {
        /// The real-valued time that was being encoded.
        value: f64,
        /// The configured bit width.
        width: u32,
        /// The configured exponent.
        exponent: i32,
    },
}

/// A signed fixed-point time format: `width` bits, one unit = `2^exponent` seconds.
///
/// Deserialization goes through [`TimeFormat::new`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawTimeFormat")]
pub struct TimeFormat {
    width: u32,
    exponent: i32,
}

#[derive(Deserialize)]
struct RawTimeFormat {
    width: u32,
    exponent: i32,
}

impl TryFrom<RawTimeFormat> for TimeFormat {
    type Error = FixedPointError;

    fn try_from(raw: RawTimeFormat) -> Result<Self, Self::Error> {
        Self::new(raw.width, raw.exponent)
    }
}

impl TimeFormat {
    /// Creates a format after checking the width and exponent ranges.
    pub fn new(width: u32, exponent: i32) -> Result<Self, FixedPointError> {
        if width == 0 || width > MAX_WIDTH {
            return Err(FixedPointError::InvalidWidth(width));
        }
        if !(MIN_EXPONENT..=MAX_EXPONENT).contains(&exponent) {
            return Err(FixedPointError::InvalidExponent(exponent));
        }
        Ok(Self { width, exponent })
    }

    /// Returns the bit width.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the power-of-two exponent of one time unit.
    pub fn exponent(&self) -> i32 {
        self.exponent
    }

    /// Returns the duration of one encoded unit in seconds.
    pub fn resolution(&self) -> f64 {
        2f64.powi(self.exponent)
    }

    /// Encodes a time in seconds as `round(t * 2^-exponent)`.
    ///
    /// Ties round to even. Values whose encoded magnitude exceeds the width
    /// are rejected instead of wrapping.
    pub fn encode(&self, seconds: f64) -> Result<i64, FixedPointError> {
        if !seconds.is_finite() {
            return Err(FixedPointError::NotFinite(seconds));
        }
        let scaled = (seconds * 2f64.powi(-self.exponent)).round_ties_even();
        let bound = 2f64.powi(self.width as i32 - 1);
        if !scaled.is_finite() || scaled < -bound || scaled >= bound {
            return Err(FixedPointError::OutOfRange {
                value: seconds,
                width: self.width,
                exponent: self.exponent,
            });
        }
        Ok(scaled as i64)
    }

    /// Decodes an integer back into seconds.
    pub fn decode(&self, encoded: i64) -> f64 {
        encoded as f64 * self.resolution()
    }

    /// Encodes a time and wraps the result with this format's width.
    pub fn literal(&self, seconds: f64) -> Result<FixedLiteral, FixedPointError> {
        Ok(FixedLiteral {
            width: self.width,
            value: self.encode(seconds)?,
        })
    }
}

/// An encoded time value together with its explicit bit width.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FixedLiteral {
    /// The bit width of the encoding.
    pub width: u32,
    /// The signed encoded value.
    pub value: i64,
}

impl FixedLiteral {
    /// Returns the two's-complement bit pattern truncated to `width` bits.
    pub fn bits(&self) -> u64 {
        if self.width >= 64 {
            self.value as u64
        } else {
            (self.value as u64) & ((1u64 << self.width) - 1)
        }
    }

    /// Formats the value as a sized signed SystemVerilog literal.
    ///
    /// The most negative value has no in-range decimal magnitude and is
    /// written as its hex bit pattern, e.g. `8'sh80`.
    pub fn to_sv_signed(&self) -> String {
        let width = self.width.clamp(1, 64);
        if self.value < 0 && self.value.unsigned_abs() == 1u64 << (width - 1) {
            format!("{}'sh{:x}", self.width, self.bits())
        } else if self.value < 0 {
            format!("-{}'sd{}", self.width, self.value.unsigned_abs())
        } else {
            format!("{}'sd{}", self.width, self.value)
        }
    }
}

/// Formats the raw bit pattern as `<width>'u<bits>`, the form expected by
/// on-chip capture trigger comparators.
impl fmt::Display for FixedLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}'u{}", self.width, self.bits())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fmt(width: u32, exponent: i32) -> TimeFormat {
        TimeFormat::new(width, exponent).unwrap()
    }

    #[test]
    fn rejects_bad_width() {
        assert_eq!(TimeFormat::new(0, -10), Err(FixedPointError::InvalidWidth(0)));
        assert_eq!(
            TimeFormat::new(65, -10),
            Err(FixedPointError::InvalidWidth(65))
        );
        assert!(TimeFormat::new(64, -10).is_ok());
    }

    #[test]
    fn rejects_bad_exponent() {
        assert_eq!(
            TimeFormat::new(32, -2000),
            Err(FixedPointError::InvalidExponent(-2000))
        );
    }

    #[test]
    fn encode_exact_multiple() {
        let f = fmt(16, -4);
        assert_eq!(f.encode(1.0).unwrap(), 16);
        assert_eq!(f.encode(-2.5).unwrap(), -40);
        assert_eq!(f.encode(0.0).unwrap(), 0);
    }

    #[test]
    fn encode_rounds_half_to_even() {
        let f = fmt(16, 0);
        assert_eq!(f.encode(2.5).unwrap(), 2);
        assert_eq!(f.encode(3.5).unwrap(), 4);
        assert_eq!(f.encode(0.49).unwrap(), 0);
        assert_eq!(f.encode(-1.5).unwrap(), -2);
    }

    #[test]
    fn range_limits() {
        let f = fmt(8, 0);
        assert_eq!(f.encode(127.0).unwrap(), 127);
        assert_eq!(f.encode(-128.0).unwrap(), -128);
        assert!(matches!(
            f.encode(128.0),
            Err(FixedPointError::OutOfRange { width: 8, .. })
        ));
        assert!(matches!(
            f.encode(-129.0),
            Err(FixedPointError::OutOfRange { .. })
        ));
    }

    #[test]
    fn full_width_limits() {
        let f = fmt(64, 0);
        assert_eq!(f.encode(-9_223_372_036_854_775_808.0).unwrap(), i64::MIN);
        assert!(f.encode(9.3e18).is_err());
    }

    #[test]
    fn non_finite_rejected() {
        let f = fmt(32, -20);
        assert!(matches!(
            f.encode(f64::NAN),
            Err(FixedPointError::NotFinite(_))
        ));
        assert!(matches!(
            f.encode(f64::INFINITY),
            Err(FixedPointError::NotFinite(_))
        ));
    }

    #[test]
    fn decode_recovers_within_one_unit() {
        let f = fmt(39, -46);
        for t in [0.0, 1e-9, 3.3e-7, 1e-6, -4.2e-8, 1.234_567e-3] {
            let back = f.decode(f.encode(t).unwrap());
            assert!(
                (back - t).abs() <= f.resolution(),
                "t={t} back={back} res={}",
                f.resolution()
            );
        }
    }

    #[test]
    fn literal_bits_and_display() {
        let f = fmt(8, 0);
        let lit = f.literal(5.0).unwrap();
        assert_eq!(lit.bits(), 5);
        assert_eq!(lit.to_string(), "8'u5");

        let neg = f.literal(-1.0).unwrap();
        assert_eq!(neg.bits(), 0xff);
        assert_eq!(neg.to_string(), "8'u255");
    }

    #[test]
    fn literal_sv_signed() {
        let f = fmt(27, 0);
        assert_eq!(f.literal(12.0).unwrap().to_sv_signed(), "27'sd12");
        assert_eq!(f.literal(-12.0).unwrap().to_sv_signed(), "-27'sd12");
    }

    #[test]
    fn most_negative_literal_uses_bit_pattern() {
        let f = fmt(8, 0);
        assert_eq!(f.literal(-128.0).unwrap().to_sv_signed(), "8'sh80");
        assert_eq!(f.literal(-127.0).unwrap().to_sv_signed(), "-8'sd127");
        let lit = FixedLiteral {
            width: 64,
            value: i64::MIN,
        };
        assert_eq!(lit.to_sv_signed(), "64'sh8000000000000000");
    }

    #[test]
    fn serde_roundtrip() {
        let f = fmt(27, -46);
        let json = serde_json::to_string(&f).unwrap();
        let back: TimeFormat = serde_json::from_str(&json).unwrap();
        assert_eq!(f, back);
    }

    #[test]
    fn deserialize_validates() {
        for json in [
            r#"{"width":0,"exponent":0}"#,
            r#"{"width":65,"exponent":-46}"#,
            r#"{"width":27,"exponent":-5000}"#,
        ] {
            assert!(serde_json::from_str::<TimeFormat>(json).is_err(), "{json}");
        }
        let ok: TimeFormat = serde_json::from_str(r#"{"width":27,"exponent":-46}"#).unwrap();
        assert_eq!(ok, fmt(27, -46));
    }
}
