//! Standard base32 geohash, used to bucket nearby queries into cache cells.
//!
//! Bits alternate longitude/latitude starting with longitude, five bits per
//! character, so keys are interchangeable with any other geohash library.
//! At the default precision of 7 a cell is roughly 153m x 153m.

use crate::domain::model::Coordinate;
use crate::utils::error::{DiscoveryError, Result};

pub const DEFAULT_PRECISION: usize = 7;
pub const MAX_PRECISION: usize = 12;

const BASE32: &[u8; 32] = b"0123456789bcdefghjkmnpqrstuvwxyz";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_latitude: f64,
    pub max_latitude: f64,
    pub min_longitude: f64,
    pub max_longitude: f64,
}

impl BoundingBox {
    pub fn center(&self) -> Coordinate {
        Coordinate {
            latitude: (self.min_latitude + self.max_latitude) / 2.0,
            longitude: (self.min_longitude + self.max_longitude) / 2.0,
        }
    }

    pub fn contains(&self, c: &Coordinate) -> bool {
        c.latitude >= self.min_latitude
            && c.latitude <= self.max_latitude
            && c.longitude >= self.min_longitude
            && c.longitude <= self.max_longitude
    }
}

fn check_precision(precision: usize) -> Result<()> {
    if precision == 0 || precision > MAX_PRECISION {
        return Err(DiscoveryError::validation(
            "precision",
            precision,
            format!("Geohash precision must be between 1 and {}", MAX_PRECISION),
        ));
    }
    Ok(())
}

pub fn encode(c: &Coordinate, precision: usize) -> Result<String> {
    check_precision(precision)?;

    let mut lat_range = (-90.0_f64, 90.0_f64);
    let mut lng_range = (-180.0_f64, 180.0_f64);
    let mut hash = String::with_capacity(precision);
    let mut even_bit = true;
    let mut bit = 0;
    let mut index = 0usize;

    while hash.len() < precision {
        let (range, value) = if even_bit {
            (&mut lng_range, c.longitude)
        } else {
            (&mut lat_range, c.latitude)
        };
        let mid = (range.0 + range.1) / 2.0;
        if value >= mid {
            index = (index << 1) | 1;
            range.0 = mid;
        } else {
            index <<= 1;
            range.1 = mid;
        }
        even_bit = !even_bit;

        bit += 1;
        if bit == 5 {
            hash.push(BASE32[index] as char);
            bit = 0;
            index = 0;
        }
    }

    Ok(hash)
}

/// The cell a geohash stands for.
pub fn decode_bbox(hash: &str) -> Result<BoundingBox> {
    check_precision(hash.len())?;

    let mut lat_range = (-90.0_f64, 90.0_f64);
    let mut lng_range = (-180.0_f64, 180.0_f64);
    let mut even_bit = true;

    for ch in hash.chars() {
        let index = BASE32
            .iter()
            .position(|&b| b as char == ch.to_ascii_lowercase())
            .ok_or_else(|| {
                DiscoveryError::validation("geohash", hash, format!("'{}' is not base32", ch))
            })?;

        for shift in (0..5).rev() {
            let range = if even_bit {
                &mut lng_range
            } else {
                &mut lat_range
            };
            let mid = (range.0 + range.1) / 2.0;
            if (index >> shift) & 1 == 1 {
                range.0 = mid;
            } else {
                range.1 = mid;
            }
            even_bit = !even_bit;
        }
    }

    Ok(BoundingBox {
        min_latitude: lat_range.0,
        max_latitude: lat_range.1,
        min_longitude: lng_range.0,
        max_longitude: lng_range.1,
    })
}
