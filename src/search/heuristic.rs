//! Remaining-cost estimates for informed search.

use crate::distance::{DistanceFn, Haversine};
use crate::models::Zone;

/// Estimate of the remaining road distance from one zone to the goal.
///
/// A* is cost-optimal only if the estimate never exceeds the true remaining
/// cost. Greedy best-first has no such requirement.
pub trait Heuristic: Send + Sync {
    /// Estimated cost from `from` to `goal`.
    fn estimate(&self, from: &Zone, goal: &Zone) -> f64;
}

impl<H: Heuristic + ?Sized> Heuristic for &H {
    fn estimate(&self, from: &Zone, goal: &Zone) -> f64 {
        (**self).estimate(from, goal)
    }
}

impl<H: Heuristic + ?Sized> Heuristic for Box<H> {
    fn estimate(&self, from: &Zone, goal: &Zone) -> f64 {
        (**self).estimate(from, goal)
    }
}

/// Straight-line distance between zone coordinates.
///
/// Admissible whenever road weights are at least the distance between their
/// endpoints under the same [`DistanceFn`], which holds for graphs built by
/// [`GraphBuilder`](crate::graph::GraphBuilder).
#[derive(Debug, Clone, Copy, Default)]
pub struct GreatCircle<D = Haversine> {
    distance: D,
}

impl<D: DistanceFn> GreatCircle<D> {
    /// Uses `distance` instead of the haversine formula.
    pub fn with_distance(distance: D) -> Self {
        Self { distance }
    }
}

impl<D: DistanceFn> Heuristic for GreatCircle<D> {
    fn estimate(&self, from: &Zone, goal: &Zone) -> f64 {
        self.distance.distance_km(from.coordinates(), goal.coordinates())
    }
}

/// Always zero. A* degenerates to uniform-cost search.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHeuristic;

impl Heuristic for NoHeuristic {
    fn estimate(&self, _from: &Zone, _goal: &Zone) -> f64 {
        0.0
    }
}
