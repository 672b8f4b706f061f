//! Coordinate conversion module
//!
//! Provides conversions between geographic coordinates (latitude/longitude)
//! and Web Mercator tile coordinates, the addressing scheme used by compact
//! cache levels.

mod types;

pub use types::{
    CoordError, TileBounds, TileCoord, MAX_LAT, MAX_LON, MAX_ZOOM, MIN_LAT, MIN_LON, MIN_ZOOM,
};

use std::f64::consts::PI;

/// Converts geographic coordinates to tile coordinates.
///
/// Uses the slippy-tile formula
/// `row = floor((1 - ln(tan(φ) + sec(φ)) / π) / 2 · 2^zoom)`, where
/// `ln(tan φ + sec φ)` is evaluated as `asinh(tan φ)`.
///
/// # Arguments
///
/// * `lat` - Latitude in degrees (-85.05112878 to 85.05112878)
/// * `lon` - Longitude in degrees (-180.0 to 180.0)
/// * `zoom` - Zoom level (0 to 24)
///
/// # Returns
///
/// A `Result` containing the tile coordinates or an error if inputs are invalid.
#[inline]
pub fn to_tile_coords(lat: f64, lon: f64, zoom: u8) -> Result<TileCoord, CoordError> {
    if !(MIN_LAT..=MAX_LAT).contains(&lat) {
        return Err(CoordError::InvalidLatitude(lat));
    }
    if !(MIN_LON..=MAX_LON).contains(&lon) {
        return Err(CoordError::InvalidLongitude(lon));
    }
    if zoom > MAX_ZOOM {
        return Err(CoordError::InvalidZoom(zoom));
    }

    let n = 2.0_f64.powi(zoom as i32);
    let max_index = (1u64 << zoom) - 1;

    // lon == 180 and lat == MIN_LAT land exactly on the far edge
    let col = (((lon + 180.0) / 360.0 * n).floor() as u64).min(max_index) as u32;

    let lat_rad = lat.to_radians();
    let row = (((1.0 - lat_rad.tan().asinh() / PI) / 2.0 * n).floor() as u64).min(max_index) as u32;

    Ok(TileCoord { row, col, zoom })
}

/// Converts tile coordinates back to geographic coordinates.
///
/// Returns the latitude/longitude of the tile's northwest corner.
#[inline]
pub fn tile_to_lat_lon(tile: &TileCoord) -> (f64, f64) {
    grid_corner(f64::from(tile.row), f64::from(tile.col), tile.zoom)
}

/// Latitude/longitude of grid position `(row, col)`, which may lie one
/// past the last tile.
pub(crate) fn grid_corner(row: f64, col: f64, zoom: u8) -> (f64, f64) {
    let n = 2.0_f64.powi(zoom as i32);

    let lon = col / n * 360.0 - 180.0;

    let y = row / n;
    let lat_rad = (PI * (1.0 - 2.0 * y)).sinh().atan();
    let lat = lat_rad.to_degrees();

    (lat, lon)
}
