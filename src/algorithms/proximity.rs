//! Proximity classification against configured map markers

use crate::algorithms::geodesy::haversine_distance_m;
use crate::core::{CurrentPosition, MapMarker};

/// IDs of all markers whose radius contains the current position.
/// The boundary is inclusive: a marker at exactly its radius counts as near.
pub fn find_nearby(position: &CurrentPosition, markers: &[MapMarker]) -> Vec<String> {
    markers
        .iter()
        .filter(|marker| is_near(position, marker))
        .map(|marker| marker.id.clone())
        .collect()
}

/// Whether the current position lies within a single marker's radius
pub fn is_near(position: &CurrentPosition, marker: &MapMarker) -> bool {
    let distance = haversine_distance_m(position.lat, position.lng, marker.lat, marker.lng);
    distance <= marker.radius_m
}
