//! Encoded polyline geometry.
//!
//! Routing providers ship route geometry as a compact ASCII string: each
//! coordinate is a pair of zig-zag encoded deltas, split into 5-bit chunks
//! offset by 63. Decoding happens here, at the boundary, and never fails
//! loudly: a string that cannot be decoded into valid coordinates yields an
//! empty path, which callers treat as "no geometry available".

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::coordinate::Coordinate;

const CHAR_OFFSET: u8 = 63;
const CHUNK_BITS: u32 = 5;
const CHUNK_MASK: u64 = 0x1f;
const CONTINUATION: u64 = 0x20;

/// Number of decimal digits carried by each encoded component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Precision {
    Five,
    Six,
}

impl Precision {
    fn factor(self) -> f64 {
        match self {
            Precision::Five => 1e5,
            Precision::Six => 1e6,
        }
    }
}

/// A decoded route geometry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    points: Vec<Coordinate>,
}

impl Polyline {
    pub fn new(points: Vec<Coordinate>) -> Self {
        Self { points }
    }

    /// Decodes `encoded`, yielding an empty polyline on any failure.
    pub fn decode(encoded: &str, precision: Precision) -> Self {
        Self::new(decode(encoded, precision))
    }

    pub fn encode(&self, precision: Precision) -> String {
        encode(&self.points, precision)
    }

    pub fn points(&self) -> &[Coordinate] {
        &self.points
    }

    pub fn into_points(self) -> Vec<Coordinate> {
        self.points
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[derive(Debug, PartialEq)]
enum DecodeFault {
    InvalidByte(usize),
    Truncated,
    Overflow,
    OutOfBounds,
}

/// Decodes an encoded path into coordinates, in encoded order.
///
/// Returns an empty vector if the string is malformed or any decoded point
/// falls outside geographic bounds (the usual symptom of a precision
/// mismatch). Partially decoded geometry is never returned.
pub fn decode(encoded: &str, precision: Precision) -> Vec<Coordinate> {
    match try_decode(encoded.as_bytes(), precision.factor()) {
        Ok(points) => points,
        Err(fault) => {
            debug!("Discarding undecodable geometry ({:?})", fault);
            Vec::new()
        }
    }
}

fn try_decode(bytes: &[u8], factor: f64) -> Result<Vec<Coordinate>, DecodeFault> {
    let mut points = Vec::with_capacity(bytes.len() / 4);
    let mut index = 0;
    let mut lat: i64 = 0;
    let mut lon: i64 = 0;

    while index < bytes.len() {
        lat += next_delta(bytes, &mut index)?;
        if index >= bytes.len() {
            return Err(DecodeFault::Truncated);
        }
        lon += next_delta(bytes, &mut index)?;

        let point = Coordinate::new(lon as f64 / factor, lat as f64 / factor);
        if !point.is_valid() {
            return Err(DecodeFault::OutOfBounds);
        }
        points.push(point);
    }

    Ok(points)
}

fn next_delta(bytes: &[u8], index: &mut usize) -> Result<i64, DecodeFault> {
    let mut accumulated: u64 = 0;
    let mut shift: u32 = 0;

    loop {
        let byte = *bytes.get(*index).ok_or(DecodeFault::Truncated)?;
        if !(CHAR_OFFSET..=126).contains(&byte) {
            return Err(DecodeFault::InvalidByte(*index));
        }
        *index += 1;

        if shift >= u64::BITS - CHUNK_BITS {
            return Err(DecodeFault::Overflow);
        }

        let chunk = u64::from(byte - CHAR_OFFSET);
        accumulated |= (chunk & CHUNK_MASK) << shift;
        shift += CHUNK_BITS;

        if chunk & CONTINUATION == 0 {
            break;
        }
    }

    let magnitude = (accumulated >> 1) as i64;
    Ok(if accumulated & 1 == 1 {
        !magnitude
    } else {
        magnitude
    })
}

/// Encodes coordinates into the compact path format.
pub fn encode(points: &[Coordinate], precision: Precision) -> String {
    let factor = precision.factor();
    let mut encoded = String::with_capacity(points.len() * 8);
    let mut previous_lat: i64 = 0;
    let mut previous_lon: i64 = 0;

    for point in points {
        let lat = (point.lat * factor).round() as i64;
        let lon = (point.lon * factor).round() as i64;

        push_delta(&mut encoded, lat - previous_lat);
        push_delta(&mut encoded, lon - previous_lon);

        previous_lat = lat;
        previous_lon = lon;
    }

    encoded
}

fn push_delta(out: &mut String, delta: i64) {
    let mut value = if delta < 0 {
        !((delta as u64) << 1)
    } else {
        (delta as u64) << 1
    };

    while value >= CONTINUATION {
        out.push(char::from((CONTINUATION | (value & CHUNK_MASK)) as u8 + CHAR_OFFSET));
        value >>= CHUNK_BITS;
    }
    out.push(char::from(value as u8 + CHAR_OFFSET));
}
