//! Distances between zone coordinates.
//!
//! Road weights and the search heuristic both come from a [`DistanceFn`], so
//! using the same function for each keeps the heuristic admissible.

mod geodesic;

pub use geodesic::{DistanceFn, Euclidean, Haversine, EARTH_RADIUS_KM};
