//! Graph search over a [`ZoneGraph`](crate::graph::ZoneGraph).
//!
//! Five strategies share one routine in [`Pathfinder`]; [`Algorithm`] picks
//! the frontier discipline and [`Heuristic`] supplies remaining-cost
//! estimates for Greedy and A*.

mod algorithm;
mod frontier;
mod heuristic;
mod pathfinder;

pub use algorithm::Algorithm;
pub use heuristic::{GreatCircle, Heuristic, NoHeuristic};
pub use pathfinder::{Pathfinder, SearchResult};
