//! Great-circle distance on a spherical earth model

use crate::core::EARTH_RADIUS_M;

/// Distance between two geographic coordinates via the haversine formula (meters)
pub fn haversine_distance_m(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();

    let a = (d_lat / 2.0).sin() * (d_lat / 2.0).sin()
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin() * (d_lng / 2.0).sin();

    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_distance() {
        let d = haversine_distance_m(51.4920, 11.9560, 51.4920, 11.9560);
        assert!(d.abs() < 1e-9);
    }

    #[test]
    fn test_known_distance_one_degree_latitude() {
        // One degree of latitude spans roughly 111.2 km on a 6371 km sphere
        let d = haversine_distance_m(51.0, 11.0, 52.0, 11.0);
        assert!((d - 111_194.9).abs() < 10.0);
    }

    #[test]
    fn test_symmetry() {
        let d1 = haversine_distance_m(51.4920, 11.9560, 51.4914, 11.9567);
        let d2 = haversine_distance_m(51.4914, 11.9567, 51.4920, 11.9560);
        assert!((d1 - d2).abs() < 1e-9);
    }

    #[test]
    fn test_garden_marker_spacing() {
        // Distance between the first two calibration markers of the garden map
        let d = haversine_distance_m(51.492060, 11.956057, 51.491434, 11.956762);
        assert!(d > 50.0 && d < 150.0);
    }
}
