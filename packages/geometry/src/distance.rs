//! Great-circle distance via the Haversine formula.

/// Mean Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Returns the great-circle distance in kilometers between two WGS84
/// coordinates.
///
/// Inputs are `(latitude, longitude)` pairs in degrees. The result is
/// always defined for valid degree ranges; callers are responsible for
/// validating coordinates upstream.
#[must_use]
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_to_self_is_zero() {
        assert!(haversine_km(37.8021, -122.4344, 37.8021, -122.4344).abs() < 1e-12);
    }

    #[test]
    fn distance_is_symmetric() {
        let a = (37.802_09, -122.434_42);
        let b = (37.805_10, -122.431_00);
        let ab = haversine_km(a.0, a.1, b.0, b.1);
        let ba = haversine_km(b.0, b.1, a.0, a.1);
        assert!((ab - ba).abs() < 1e-12);
    }

    #[test]
    fn known_distance_sf_to_la() {
        // SF City Hall to LA City Hall, roughly 559 km.
        let d = haversine_km(37.7793, -122.4193, 34.0537, -118.2427);
        assert!((d - 559.0).abs() < 5.0, "got {d}");
    }

    #[test]
    fn thirty_meters_is_under_cluster_threshold() {
        // ~30 m apart along a meridian: 0.00027 degrees of latitude.
        let d = haversine_km(37.8021, -122.4344, 37.802_37, -122.4344);
        assert!(d > 0.025 && d < 0.035, "got {d}");
    }
}
