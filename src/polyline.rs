//! Encoded polyline codec.
//!
//! Coordinates are scaled by `10^precision`, delta-encoded against the
//! previous point, zig-zag sign-encoded and written as 5-bit groups offset
//! into the printable range `63..=126`. Latitude precedes longitude.
//! The encoding is lossy: decoded values are within `10^-precision` of the
//! originals.

use std::iter::Peekable;

use crate::error::PolylineError;

/// Precision used for map rendering.
pub const DEFAULT_PRECISION: u32 = 5;

const CHUNK_BITS: u32 = 5;
const CHUNK_MASK: i64 = 0x1f;
const CONTINUATION: i64 = 0x20;
const CHAR_OFFSET: i64 = 63;
const MAX_SHIFT: u32 = 60;

/// Encodes (lat, lng) points with [`DEFAULT_PRECISION`].
pub fn encode(points: &[(f64, f64)]) -> Result<String, PolylineError> {
    encode_with_precision(points, DEFAULT_PRECISION)
}

/// Decodes a string produced by [`encode`].
pub fn decode(encoded: &str) -> Result<Vec<(f64, f64)>, PolylineError> {
    decode_with_precision(encoded, DEFAULT_PRECISION)
}

pub fn encode_with_precision(points: &[(f64, f64)], precision: u32) -> Result<String, PolylineError> {
    let factor = 10f64.powi(precision as i32);
    let mut output = String::with_capacity(points.len() * 8);
    let mut previous = (0i64, 0i64);

    for (index, &(lat, lng)) in points.iter().enumerate() {
        let lat = scale(lat, factor, index)?;
        let lng = scale(lng, factor, index)?;
        write_value(lat - previous.0, &mut output);
        write_value(lng - previous.1, &mut output);
        previous = (lat, lng);
    }

    Ok(output)
}

pub fn decode_with_precision(encoded: &str, precision: u32) -> Result<Vec<(f64, f64)>, PolylineError> {
    let factor = 10f64.powi(precision as i32);
    let mut points = Vec::new();
    let mut chars = encoded.chars().enumerate().peekable();
    let (mut lat, mut lng) = (0i64, 0i64);

    while chars.peek().is_some() {
        lat = accumulate(lat, &mut chars)?;
        if chars.peek().is_none() {
            return Err(PolylineError::UnpairedLatitude);
        }
        lng = accumulate(lng, &mut chars)?;
        points.push((lat as f64 / factor, lng as f64 / factor));
    }

    Ok(points)
}

/// Adds the next delta to a running coordinate.
fn accumulate<I>(total: i64, chars: &mut Peekable<I>) -> Result<i64, PolylineError>
where
    I: Iterator<Item = (usize, char)>,
{
    let position = chars.peek().map_or(0, |&(position, _)| position);
    total
        .checked_add(read_value(chars)?)
        .ok_or(PolylineError::CoordinateOverflow { position })
}

fn scale(value: f64, factor: f64, index: usize) -> Result<i64, PolylineError> {
    if !value.is_finite() {
        return Err(PolylineError::NonFiniteCoordinate { index });
    }
    let scaled = (value * factor).round();
    // Leave headroom for the delta and the zig-zag shift.
    if scaled.abs() >= (1i64 << 61) as f64 {
        return Err(PolylineError::Overflow { index });
    }
    Ok(scaled as i64)
}

fn write_value(delta: i64, output: &mut String) {
    let mut value = if delta < 0 { !(delta << 1) } else { delta << 1 };
    while value >= CONTINUATION {
        push_chunk((CONTINUATION | (value & CHUNK_MASK)) + CHAR_OFFSET, output);
        value >>= CHUNK_BITS;
    }
    push_chunk(value + CHAR_OFFSET, output);
}

fn push_chunk(code: i64, output: &mut String) {
    // code is always within 63..=126
    output.push(code as u8 as char);
}

fn read_value<I>(chars: &mut I) -> Result<i64, PolylineError>
where
    I: Iterator<Item = (usize, char)>,
{
    let mut result = 0i64;
    let mut shift = 0u32;

    loop {
        let (position, ch) = chars.next().ok_or(PolylineError::Truncated)?;
        if !('?'..='~').contains(&ch) {
            return Err(PolylineError::InvalidCharacter { ch, position });
        }
        if shift > MAX_SHIFT {
            return Err(PolylineError::ValueTooLong { position });
        }

        let chunk = ch as i64 - CHAR_OFFSET;
        result |= (chunk & CHUNK_MASK) << shift;
        shift += CHUNK_BITS;

        if chunk & CONTINUATION == 0 {
            break;
        }
    }

    Ok(if result & 1 == 1 { !(result >> 1) } else { result >> 1 })
}
