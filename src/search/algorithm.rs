//! Search strategy names and their frontier disciplines.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DispatchError;

/// A named graph-search strategy.
///
/// # Examples
///
/// ```
/// use relief_dispatch::search::Algorithm;
///
/// assert_eq!("ucs".parse::<Algorithm>().unwrap(), Algorithm::UniformCost);
/// assert_eq!(Algorithm::AStar.to_string(), "AStar");
/// assert!("dijkstra".parse::<Algorithm>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Algorithm {
    /// Breadth-first: fewest edges.
    #[serde(rename = "BFS")]
    Bfs,
    /// Depth-first: first path found.
    #[serde(rename = "DFS")]
    Dfs,
    /// Uniform-cost: minimal accumulated weight.
    #[serde(rename = "UCS")]
    UniformCost,
    /// Greedy best-first on the heuristic alone.
    #[serde(rename = "Greedy")]
    Greedy,
    /// A*: accumulated weight plus heuristic.
    #[serde(rename = "AStar")]
    AStar,
}

impl Algorithm {
    /// Every strategy, in the order they are usually reported.
    pub const ALL: [Algorithm; 5] = [
        Algorithm::Bfs,
        Algorithm::Dfs,
        Algorithm::UniformCost,
        Algorithm::Greedy,
        Algorithm::AStar,
    ];

    /// Canonical name.
    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Bfs => "BFS",
            Algorithm::Dfs => "DFS",
            Algorithm::UniformCost => "UCS",
            Algorithm::Greedy => "Greedy",
            Algorithm::AStar => "AStar",
        }
    }

    /// Whether the strategy guarantees a minimal-weight path.
    pub fn is_cost_optimal(self) -> bool {
        matches!(self, Algorithm::UniformCost | Algorithm::AStar)
    }

    pub(crate) fn discipline(self) -> Discipline {
        match self {
            Algorithm::Bfs => Discipline::Fifo,
            Algorithm::Dfs => Discipline::Lifo,
            Algorithm::UniformCost => Discipline::Cost,
            Algorithm::Greedy => Discipline::Heuristic,
            Algorithm::AStar => Discipline::CostPlusHeuristic,
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = DispatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "bfs" | "breadthfirst" => Ok(Algorithm::Bfs),
            "dfs" | "depthfirst" => Ok(Algorithm::Dfs),
            "ucs" | "uniformcost" => Ok(Algorithm::UniformCost),
            "greedy" | "greedybestfirst" => Ok(Algorithm::Greedy),
            "astar" | "a*" => Ok(Algorithm::AStar),
            _ => Err(DispatchError::UnknownAlgorithm(s.to_owned())),
        }
    }
}

/// How the frontier orders pending labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Discipline {
    /// Queue of paths.
    Fifo,
    /// Stack of paths.
    Lifo,
    /// Min-heap on accumulated cost.
    Cost,
    /// Min-heap on heuristic estimate.
    Heuristic,
    /// Min-heap on cost plus estimate, ties to smaller cost.
    CostPlusHeuristic,
}

impl Discipline {
    /// Cost-tracking disciplines prune by best known cost instead of a
    /// visited set.
    pub(crate) fn tracks_cost(self) -> bool {
        matches!(self, Discipline::Cost | Discipline::CostPlusHeuristic)
    }

    pub(crate) fn uses_heuristic(self) -> bool {
        matches!(self, Discipline::Heuristic | Discipline::CostPlusHeuristic)
    }

    /// `(key, tiebreak)` for a heap entry.
    pub(crate) fn priority(self, g: f64, h: f64) -> (f64, f64) {
        match self {
            Discipline::Cost => (g, 0.0),
            Discipline::Heuristic => (h, 0.0),
            Discipline::CostPlusHeuristic => (g + h, g),
            Discipline::Fifo | Discipline::Lifo => (0.0, 0.0),
        }
    }
}
