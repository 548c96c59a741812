//! Arbitrary-precision decimal numbers.
//!
//! Sigma numbers keep the exact digit sequence they were written with. A [`Number`]
//! is an unscaled [`BigInt`] plus a decimal scale, so `1.20` and `1.2` are distinct
//! values and `-1.23e-97` survives a round trip digit for digit.
//!
//! Narrowing to machine integers is exact or it fails; narrowing to floating point
//! follows IEEE rounding.
//!
//! ```rust
//! use sigma::Number;
//!
//! let n: Number = "-1.23e-97".parse().unwrap();
//! assert_eq!(n.to_string(), "-1.23E-97");
//!
//! let whole: Number = "4.00".parse().unwrap();
//! assert_eq!(whole.to_i64_exact(), Some(4));
//! assert_eq!("4.5".parse::<Number>().unwrap().to_i64_exact(), None);
//! ```

use num_bigint::{BigInt, Sign};
use std::fmt;
use std::str::FromStr;

/// Largest power of ten that can still hold a value inside the `i128`/`u128` range.
const MAX_INTEGER_DIGITS: i64 = 39;

/// An exact decimal: `unscaled × 10^-scale`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct Number {
    unscaled: BigInt,
    scale: i64,
}

/// Error returned when a token is not a valid Sigma number.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseNumberError;

impl fmt::Display for ParseNumberError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("invalid number")
    }
}

impl std::error::Error for ParseNumberError {}

impl Number {
    /// Creates a number from its unscaled digits and scale.
    #[must_use]
    pub fn new(unscaled: BigInt, scale: i64) -> Self {
        Number { unscaled, scale }
    }

    #[must_use]
    pub fn unscaled(&self) -> &BigInt {
        &self.unscaled
    }

    #[must_use]
    pub fn scale(&self) -> i64 {
        self.scale
    }

    #[inline]
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.unscaled.sign() == Sign::NoSign
    }

    #[inline]
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.unscaled.sign() == Sign::Minus
    }

    /// Returns the value as an integer if it has no fractional part and fits in
    /// an `i128`.
    #[must_use]
    pub fn to_i128_exact(&self) -> Option<i128> {
        self.to_integer().and_then(|i| i128::try_from(&i).ok())
    }

    #[must_use]
    pub fn to_u128_exact(&self) -> Option<u128> {
        self.to_integer().and_then(|i| u128::try_from(&i).ok())
    }

    /// Returns the value as an `i64` if the conversion is exact.
    #[must_use]
    pub fn to_i64_exact(&self) -> Option<i64> {
        self.to_i128_exact().and_then(|i| i64::try_from(i).ok())
    }

    /// Converts to the nearest `f64`. Values beyond the `f64` range become infinite.
    #[must_use]
    pub fn to_f64(&self) -> f64 {
        self.to_string().parse().unwrap_or(f64::NAN)
    }

    /// Converts to the nearest `f32`. Values beyond the `f32` range become infinite.
    #[must_use]
    pub fn to_f32(&self) -> f32 {
        self.to_string().parse().unwrap_or(f32::NAN)
    }

    /// Integer value when there is no fractional part and the magnitude stays within
    /// 128-bit range. Large positive exponents are rejected before any power of ten
    /// is computed.
    fn to_integer(&self) -> Option<BigInt> {
        if self.is_zero() {
            return Some(BigInt::default());
        }
        let ten = BigInt::from(10);
        let mut unscaled = self.unscaled.clone();
        let mut scale = self.scale;
        while scale > 0 {
            if &unscaled % &ten != BigInt::default() {
                return None;
            }
            unscaled /= &ten;
            scale -= 1;
        }
        if scale == 0 {
            return Some(unscaled);
        }
        let shift = scale.checked_neg()?;
        if shift > MAX_INTEGER_DIGITS {
            return None;
        }
        Some(unscaled * ten.pow(shift as u32))
    }

    fn try_from_f64(value: f64) -> Result<Self, ParseNumberError> {
        if !value.is_finite() {
            return Err(ParseNumberError);
        }
        // Display for floats is the shortest representation that round-trips.
        value.to_string().parse()
    }
}

impl FromStr for Number {
    type Err = ParseNumberError;

    /// Parses `[sign] 1*DIGIT ["." 1*DIGIT] [("e"/"E") [sign] 1*DIGIT]`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        let mut i = 0;
        let mut digits = String::with_capacity(s.len());

        if let Some(&sign) = bytes.first() {
            if sign == b'-' || sign == b'+' {
                if sign == b'-' {
                    digits.push('-');
                }
                i += 1;
            }
        }

        let int_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            digits.push(bytes[i] as char);
            i += 1;
        }
        if i == int_start {
            return Err(ParseNumberError);
        }

        let mut fraction_len: i64 = 0;
        if i < bytes.len() && bytes[i] == b'.' {
            i += 1;
            let frac_start = i;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                digits.push(bytes[i] as char);
                i += 1;
            }
            if i == frac_start {
                return Err(ParseNumberError);
            }
            fraction_len = (i - frac_start) as i64;
        }

        let mut exponent: i64 = 0;
        if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
            i += 1;
            let exp_text = &s[i..];
            let unsigned = exp_text.strip_prefix(&['+', '-'][..]).unwrap_or(exp_text);
            if unsigned.is_empty() || !unsigned.bytes().all(|b| b.is_ascii_digit()) {
                return Err(ParseNumberError);
            }
            exponent = exp_text
                .strip_prefix('+')
                .unwrap_or(exp_text)
                .parse()
                .map_err(|_| ParseNumberError)?;
            i = bytes.len();
        }

        if i != bytes.len() {
            return Err(ParseNumberError);
        }

        let unscaled = BigInt::from_str(&digits).map_err(|_| ParseNumberError)?;
        let scale = fraction_len
            .checked_sub(exponent)
            .ok_or(ParseNumberError)?;
        Ok(Number { unscaled, scale })
    }
}

impl fmt::Display for Number {
    /// Canonical decimal form: plain notation when the scale is non-negative and the
    /// adjusted exponent is at least -6, otherwise `d.dddE±n`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let magnitude = self.unscaled.magnitude().to_string();
        let sign = if self.is_negative() { "-" } else { "" };
        let adjusted = (magnitude.len() as i128 - 1) - self.scale as i128;

        if self.scale >= 0 && adjusted >= -6 {
            let scale = self.scale as usize;
            if scale == 0 {
                return write!(f, "{}{}", sign, magnitude);
            }
            if magnitude.len() > scale {
                let (int_part, frac_part) = magnitude.split_at(magnitude.len() - scale);
                return write!(f, "{}{}.{}", sign, int_part, frac_part);
            }
            let zeros = "0".repeat(scale - magnitude.len());
            return write!(f, "{}0.{}{}", sign, zeros, magnitude);
        }

        let (first, rest) = magnitude.split_at(1);
        write!(f, "{}{}", sign, first)?;
        if !rest.is_empty() {
            write!(f, ".{}", rest)?;
        }
        if adjusted >= 0 {
            write!(f, "E+{}", adjusted)
        } else {
            write!(f, "E{}", adjusted)
        }
    }
}

macro_rules! impl_from_integer {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Number {
                fn from(value: $ty) -> Self {
                    Number { unscaled: BigInt::from(value), scale: 0 }
                }
            }
        )*
    };
}

impl_from_integer!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

impl From<BigInt> for Number {
    fn from(value: BigInt) -> Self {
        Number {
            unscaled: value,
            scale: 0,
        }
    }
}

impl TryFrom<f64> for Number {
    type Error = ParseNumberError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Number::try_from_f64(value)
    }
}

impl TryFrom<f32> for Number {
    type Error = ParseNumberError;

    fn try_from(value: f32) -> Result<Self, Self::Error> {
        if !value.is_finite() {
            return Err(ParseNumberError);
        }
        // Go through the f32's own shortest form so 1.234f32 stays 1.234.
        value.to_string().parse()
    }
}
