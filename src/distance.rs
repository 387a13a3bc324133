// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::Coordinate;

/// Radius of Earth used for all great-circle calculations, in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Calculates the great-circle distance between two positions
/// on Earth using the [haversine formula](https://en.wikipedia.org/wiki/Haversine_formula).
/// Returns the result in kilometers.
///
/// This is the unit for user-facing, point-to-point estimates.
/// Edge weights and route costs use [earth_distance_m].
pub fn earth_distance_km(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();

    let sin_dlat_half = ((b.lat - a.lat).to_radians() * 0.5).sin();
    let sin_dlon_half = ((b.lon - a.lon).to_radians() * 0.5).sin();

    let h = sin_dlat_half * sin_dlat_half + lat1.cos() * lat2.cos() * sin_dlon_half * sin_dlon_half;

    2.0 * EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).max(0.0).sqrt())
}

/// Same as [earth_distance_km], but returns the result in meters.
/// All [Graph](crate::Graph) edge weights are expressed in this unit.
#[inline]
pub fn earth_distance_m(a: Coordinate, b: Coordinate) -> f64 {
    earth_distance_km(a, b) * 1000.0
}
