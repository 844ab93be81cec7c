//! Locale-invariant scalar text conversion.
//!
//! Typed deserialization funnels raw scalar text through these helpers, so a
//! quoted `'99'` coerces into a numeric field the same way a plain `99` does.
//! Hex literals (`0x...`) are parsed as unsigned 32-bit magnitudes and then
//! widened or range-checked into the requested type.

use crate::error::{Error, Location};

/// Parse a strict boolean: exactly `true` or `false`, case-sensitive.
pub(crate) fn parse_bool(s: &str, location: Location) -> Result<bool, Error> {
    match s.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(Error::coercion("a boolean (`true`/`false`)", other, location)),
    }
}

/// Parse a decimal or hex integer into any signed type.
pub(crate) fn parse_int_signed<T>(
    s: &str,
    ty: &'static str,
    location: Location,
) -> Result<T, Error>
where
    T: TryFrom<i128>,
{
    let t = s.trim();
    let (neg, rest) = match t.strip_prefix('-') {
        Some(r) => (true, r),
        None => (false, t.strip_prefix('+').unwrap_or(t)),
    };

    let magnitude: i128 = if let Some(hex) = hex_digits(rest) {
        if neg {
            return Err(Error::coercion(ty, s, location));
        }
        parse_hex_u32(hex).ok_or_else(|| Error::coercion(ty, s, location))? as i128
    } else {
        parse_decimal_u128(rest)
            .and_then(|v| i128::try_from(v).ok())
            .ok_or_else(|| Error::coercion(ty, s, location))?
    };

    let value = if neg { -magnitude } else { magnitude };
    T::try_from(value).map_err(|_| Error::coercion(ty, s, location))
}

/// Parse a decimal or hex integer into any unsigned type.
pub(crate) fn parse_int_unsigned<T>(
    s: &str,
    ty: &'static str,
    location: Location,
) -> Result<T, Error>
where
    T: TryFrom<u128>,
{
    let t = s.trim();
    let rest = t.strip_prefix('+').unwrap_or(t);

    let value: u128 = if let Some(hex) = hex_digits(rest) {
        parse_hex_u32(hex).ok_or_else(|| Error::coercion(ty, s, location))? as u128
    } else {
        parse_decimal_u128(rest).ok_or_else(|| Error::coercion(ty, s, location))?
    };

    T::try_from(value).map_err(|_| Error::coercion(ty, s, location))
}

/// Parse a float. Accepts plain integers too (`f: 1` is `1.0`).
pub(crate) fn parse_f64(s: &str, location: Location) -> Result<f64, Error> {
    let t = s.trim();
    if t.is_empty() {
        return Err(Error::coercion("a float", s, location));
    }
    t.parse::<f64>()
        .map_err(|_| Error::coercion("a float", s, location))
}

pub(crate) fn parse_f32(s: &str, location: Location) -> Result<f32, Error> {
    let t = s.trim();
    if t.is_empty() {
        return Err(Error::coercion("a float", s, location));
    }
    t.parse::<f32>()
        .map_err(|_| Error::coercion("a float", s, location))
}

fn hex_digits(s: &str) -> Option<&str> {
    s.strip_prefix("0x").or_else(|| s.strip_prefix("0X"))
}

/// Hex magnitudes are limited to unsigned 32 bits by the format.
fn parse_hex_u32(digits: &str) -> Option<u32> {
    if digits.is_empty() {
        return None;
    }
    let mut value: u32 = 0;
    for b in digits.bytes() {
        let d = match b {
            b'0'..=b'9' => (b - b'0') as u32,
            b'a'..=b'f' => 10 + (b - b'a') as u32,
            b'A'..=b'F' => 10 + (b - b'A') as u32,
            _ => return None,
        };
        value = value.checked_mul(16)?.checked_add(d)?;
    }
    Some(value)
}

fn parse_decimal_u128(digits: &str) -> Option<u128> {
    if digits.is_empty() {
        return None;
    }
    let mut value: u128 = 0;
    for b in digits.bytes() {
        match b {
            b'0'..=b'9' => {
                value = value.checked_mul(10)?;
                value = value.checked_add((b - b'0') as u128)?;
            }
            _ => return None,
        }
    }
    Some(value)
}
