// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Exact scalar arithmetic
//!
//! Every coordinate in the kernel is an arbitrary-precision rational. Decimal
//! literals are converted to the rational they denote without passing through
//! floating point, so `0.1` is exactly one tenth.

use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};
use std::fmt;

/// Exact scalar used for all coordinates.
pub type Scalar = BigRational;

/// Largest power of ten a decimal literal may scale by.
const MAX_DECIMAL_SCALE: u32 = 10_000;

/// Error returned when a numeric literal cannot be read exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScalarParseError {
    pub literal: String,
}

impl fmt::Display for ScalarParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' is not a finite decimal or rational number", self.literal)
    }
}

impl std::error::Error for ScalarParseError {}

/// Build a scalar from an integer.
pub fn scalar(value: i64) -> Scalar {
    BigRational::from_integer(BigInt::from(value))
}

/// Build the scalar `numer / denom`. Panics if `denom` is zero.
pub fn ratio(numer: i64, denom: i64) -> Scalar {
    BigRational::new(BigInt::from(numer), BigInt::from(denom))
}

/// Convert a finite float to the rational with exactly the same value.
pub fn from_f64(value: f64) -> Option<Scalar> {
    BigRational::from_float(value)
}

/// Nearest `f64` to an exact scalar.
pub fn to_f64(value: &Scalar) -> f64 {
    value.to_f64().unwrap_or_else(|| {
        // Ratio::to_f64 only fails when both parts overflow; fall back to a
        // quotient of the leading digits.
        let numer = value.numer().to_f64().unwrap_or(f64::NAN);
        let denom = value.denom().to_f64().unwrap_or(f64::NAN);
        numer / denom
    })
}

/// Parse a decimal literal (`-1.25`, `3e-2`, `.5`) or a fraction (`1/3`)
/// into an exact scalar.
pub fn parse_scalar(text: &str) -> Result<Scalar, ScalarParseError> {
    let fail = || ScalarParseError {
        literal: text.to_string(),
    };
    let literal = text.trim();
    if literal.is_empty() {
        return Err(fail());
    }

    if let Some((numer, denom)) = literal.split_once('/') {
        let numer = parse_decimal(numer).ok_or_else(fail)?;
        let denom = parse_decimal(denom).ok_or_else(fail)?;
        if denom.is_zero() {
            return Err(fail());
        }
        return Ok(numer / denom);
    }

    parse_decimal(literal).ok_or_else(fail)
}

fn parse_decimal(literal: &str) -> Option<Scalar> {
    let (negative, body) = match literal.as_bytes().first()? {
        b'-' => (true, &literal[1..]),
        b'+' => (false, &literal[1..]),
        _ => (false, literal),
    };

    let (mantissa, exponent) = match body.find(|c: char| c == 'e' || c == 'E') {
        Some(pos) => (&body[..pos], body[pos + 1..].parse::<i32>().ok()?),
        None => (body, 0),
    };

    let (int_part, frac_part) = match mantissa.split_once('.') {
        Some((i, f)) => (i, f),
        None => (mantissa, ""),
    };
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    if !int_part.bytes().all(|b| b.is_ascii_digit()) || !frac_part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let digits = format!("{int_part}{frac_part}");
    let mut value = BigRational::from_integer(digits.parse::<BigInt>().ok()?);
    let scale = exponent.checked_sub(i32::try_from(frac_part.len()).ok()?)?;
    if scale.unsigned_abs() > MAX_DECIMAL_SCALE {
        return None;
    }
    let shift = BigRational::from_integer(power_of_ten(scale.unsigned_abs()));
    if scale >= 0 {
        value *= shift;
    } else {
        value /= shift;
    }

    Some(if negative { -value } else { value })
}

fn power_of_ten(exponent: u32) -> BigInt {
    num_traits::pow(BigInt::from(10), exponent as usize)
}

/// Render a scalar as a decimal string if its expansion terminates.
///
/// Returns `None` for values such as `1/3` whose denominator has prime
/// factors other than 2 and 5.
pub fn to_decimal_string(value: &Scalar) -> Option<String> {
    if value.is_integer() {
        return Some(value.numer().to_string());
    }

    let two = BigInt::from(2);
    let five = BigInt::from(5);
    let mut denom = value.denom().clone();
    let (mut twos, mut fives) = (0u32, 0u32);
    while denom.is_multiple_of(&two) {
        denom /= &two;
        twos += 1;
    }
    while denom.is_multiple_of(&five) {
        denom /= &five;
        fives += 1;
    }
    if !denom.is_one() {
        return None;
    }

    let places = twos.max(fives);
    let scaled = value * BigRational::from_integer(power_of_ten(places));
    let digits = scaled.numer().abs().to_string();
    let places = places as usize;
    let padded = if digits.len() <= places {
        format!("{}{}", "0".repeat(places + 1 - digits.len()), digits)
    } else {
        digits
    };
    let (int_part, frac_part) = padded.split_at(padded.len() - places);
    let sign = if value.is_negative() { "-" } else { "" };
    Some(format!("{sign}{int_part}.{frac_part}"))
}

/// Render a scalar as `p/q` (or `p` for integers).
pub fn to_fraction_string(value: &Scalar) -> String {
    if value.is_integer() {
        value.numer().to_string()
    } else {
        format!("{}/{}", value.numer(), value.denom())
    }
}

/// Human-readable exact rendering: decimal when it terminates, else `p/q`.
pub fn display_scalar(value: &Scalar) -> String {
    to_decimal_string(value).unwrap_or_else(|| to_fraction_string(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_decimal_is_exact() {
        assert_eq!(parse_scalar("0.1").unwrap(), ratio(1, 10));
        assert_eq!(parse_scalar("-2.50").unwrap(), ratio(-5, 2));
        assert_eq!(parse_scalar(".5").unwrap(), ratio(1, 2));
        assert_eq!(parse_scalar("7.").unwrap(), scalar(7));
        assert_eq!(parse_scalar("+3").unwrap(), scalar(3));
    }

    #[test]
    fn test_parse_exponent_and_fraction() {
        assert_eq!(parse_scalar("1e3").unwrap(), scalar(1000));
        assert_eq!(parse_scalar("25E-2").unwrap(), ratio(1, 4));
        assert_eq!(parse_scalar("1/3").unwrap(), ratio(1, 3));
        assert_eq!(parse_scalar("-0.5/2").unwrap(), ratio(-1, 4));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for bad in ["", "abc", "1.2.3", "1/0", "nan", "inf", "1e", "-", "."] {
            assert!(parse_scalar(bad).is_err(), "{bad} should not parse");
        }
    }

    #[test]
    fn test_parse_rejects_extreme_exponents() {
        for bad in ["1.5e-2147483648", "1e2147483647", "1e2000000000", "2/1e99999", "1e-10001"] {
            assert!(parse_scalar(bad).is_err(), "{bad} should not parse");
        }
        assert_eq!(parse_scalar("1e300").unwrap(), BigRational::from_integer(power_of_ten(300)));
        assert_eq!(parse_scalar("25e-10000").unwrap(), BigRational::new(BigInt::from(25), power_of_ten(10000)));
    }

    #[test]
    fn test_decimal_rendering() {
        assert_eq!(to_decimal_string(&scalar(-4)).as_deref(), Some("-4"));
        assert_eq!(to_decimal_string(&ratio(1, 8)).as_deref(), Some("0.125"));
        assert_eq!(to_decimal_string(&ratio(-3, 20)).as_deref(), Some("-0.15"));
        assert_eq!(to_decimal_string(&ratio(1001, 100)).as_deref(), Some("10.01"));
        assert_eq!(to_decimal_string(&ratio(1, 3)), None);
        assert_eq!(to_fraction_string(&ratio(2, 6)), "1/3");
        assert_eq!(display_scalar(&ratio(2, 3)), "2/3");
    }

    #[test]
    fn test_float_conversion_is_exact() {
        let half = from_f64(0.5).unwrap();
        assert_eq!(half, ratio(1, 2));
        assert!(from_f64(f64::NAN).is_none());
        assert_eq!(to_f64(&ratio(3, 4)), 0.75);
    }
}
