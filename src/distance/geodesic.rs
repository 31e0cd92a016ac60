//! Great-circle and planar distance functions.

/// Mean Earth radius used by [`Haversine`].
pub const EARTH_RADIUS_KM: f64 = 6_371.0;

/// Distance between two `(latitude, longitude)` pairs, in km.
pub trait DistanceFn: Send + Sync {
    /// Distance from `a` to `b`.
    fn distance_km(&self, a: (f64, f64), b: (f64, f64)) -> f64;
}

/// Great-circle distance on a spherical Earth.
///
/// # Examples
///
/// ```
/// use relief_dispatch::distance::{DistanceFn, Haversine};
///
/// let lisbon = (38.7223, -9.1393);
/// let porto = (41.1579, -8.6291);
/// let d = Haversine.distance_km(lisbon, porto);
/// assert!(d > 270.0 && d < 280.0);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Haversine;

impl DistanceFn for Haversine {
    fn distance_km(&self, a: (f64, f64), b: (f64, f64)) -> f64 {
        let (lat1, lon1) = (a.0.to_radians(), a.1.to_radians());
        let (lat2, lon2) = (b.0.to_radians(), b.1.to_radians());
        let dlat = lat2 - lat1;
        let dlon = lon2 - lon1;

        let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
    }
}

/// Straight-line distance treating coordinates as planar km offsets.
///
/// Useful for synthetic grids where `(x, y)` are already kilometres.
#[derive(Debug, Clone, Copy, Default)]
pub struct Euclidean;

impl DistanceFn for Euclidean {
    fn distance_km(&self, a: (f64, f64), b: (f64, f64)) -> f64 {
        let dx = a.0 - b.0;
        let dy = a.1 - b.1;
        (dx * dx + dy * dy).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_zero() {
        assert_eq!(Haversine.distance_km((10.0, 20.0), (10.0, 20.0)), 0.0);
    }

    #[test]
    fn test_haversine_one_degree_longitude_at_equator() {
        let d = Haversine.distance_km((0.0, 0.0), (0.0, 1.0));
        // 2πR / 360
        assert!((d - 111.195).abs() < 0.01);
    }

    #[test]
    fn test_haversine_symmetric() {
        let a = (38.57, -7.91);
        let b = (38.88, -7.16);
        assert!((Haversine.distance_km(a, b) - Haversine.distance_km(b, a)).abs() < 1e-9);
    }

    #[test]
    fn test_haversine_triangle_inequality() {
        let a = (38.57, -7.91);
        let b = (38.84, -7.58);
        let c = (38.88, -7.16);
        let direct = Haversine.distance_km(a, c);
        let via = Haversine.distance_km(a, b) + Haversine.distance_km(b, c);
        assert!(direct <= via + 1e-9);
    }

    #[test]
    fn test_euclidean() {
        assert!((Euclidean.distance_km((0.0, 0.0), (3.0, 4.0)) - 5.0).abs() < 1e-10);
    }
}
