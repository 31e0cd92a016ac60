//! One search routine parameterized by frontier discipline.

use tracing::debug;

use super::algorithm::Algorithm;
use super::frontier::{Frontier, Label};
use super::heuristic::{GreatCircle, Heuristic};
use crate::error::Result;
use crate::graph::ZoneGraph;
use crate::models::ZoneId;

/// Outcome of a single search.
///
/// A goal that cannot be reached is a normal result: `path` is `None` and
/// `cost` is `+∞`.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    /// Zones visited, start first. `None` if the goal is unreachable.
    pub path: Option<Vec<ZoneId>>,
    /// Sum of road weights along `path`.
    pub cost: f64,
    /// Number of zones expanded.
    pub expanded: usize,
}

impl SearchResult {
    /// The "no path" result.
    pub fn unreachable(expanded: usize) -> Self {
        Self {
            path: None,
            cost: f64::INFINITY,
            expanded,
        }
    }

    /// Returns `true` if a path was found.
    pub fn is_found(&self) -> bool {
        self.path.is_some()
    }

    /// Number of roads on the path.
    pub fn hops(&self) -> Option<usize> {
        self.path.as_ref().map(|p| p.len().saturating_sub(1))
    }
}

/// Graph search over open roads.
///
/// Every [`Algorithm`] shares this routine; they differ only in how the
/// frontier is ordered and whether nodes are pruned by a closed set (BFS,
/// DFS, Greedy) or by best known cost (UCS, A*). Closed roads are treated as
/// absent. The goal test is applied when a label is popped.
///
/// # Examples
///
/// ```
/// use relief_dispatch::graph::ZoneGraph;
/// use relief_dispatch::models::{RoadCondition, Zone};
/// use relief_dispatch::search::{Algorithm, Pathfinder};
///
/// let mut g = ZoneGraph::undirected();
/// for (id, lon) in [("S", 0.0), ("M", 0.5), ("N", 1.0)] {
///     g.add_zone(Zone::normal(id, 0.0, lon, 1)).unwrap();
/// }
/// g.add_road("S", "M", 60.0, RoadCondition::open()).unwrap();
/// g.add_road("M", "N", 60.0, RoadCondition::open()).unwrap();
/// g.add_road("S", "N", 500.0, RoadCondition::open()).unwrap();
///
/// let ucs = Pathfinder::new(&g, Algorithm::UniformCost).search("S", "N").unwrap();
/// assert_eq!(ucs.cost, 120.0);
///
/// let bfs = Pathfinder::new(&g, Algorithm::Bfs).search("S", "N").unwrap();
/// assert_eq!(bfs.hops(), Some(1));
/// assert_eq!(bfs.cost, 500.0);
/// ```
pub struct Pathfinder<'g, H = GreatCircle> {
    graph: &'g ZoneGraph,
    algorithm: Algorithm,
    heuristic: H,
}

impl<'g> Pathfinder<'g> {
    /// Creates a pathfinder using the great-circle heuristic.
    pub fn new(graph: &'g ZoneGraph, algorithm: Algorithm) -> Self {
        Self {
            graph,
            algorithm,
            heuristic: GreatCircle::default(),
        }
    }
}

impl<'g, H: Heuristic> Pathfinder<'g, H> {
    /// Replaces the heuristic used by Greedy and A*.
    pub fn with_heuristic<H2: Heuristic>(self, heuristic: H2) -> Pathfinder<'g, H2> {
        Pathfinder {
            graph: self.graph,
            algorithm: self.algorithm,
            heuristic,
        }
    }

    /// The configured algorithm.
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Finds a path from `start` to `goal`.
    ///
    /// Fails only with [`DispatchError::UnknownZone`](crate::DispatchError::UnknownZone).
    pub fn search(&self, start: &str, goal: &str) -> Result<SearchResult> {
        let source = self.graph.index_of(start)?;
        let target = self.graph.index_of(goal)?;

        if source == target {
            return Ok(SearchResult {
                path: Some(vec![self.graph.zone_at(source).id().clone()]),
                cost: 0.0,
                expanded: 0,
            });
        }

        let result = self.run(source, target);
        debug!(
            algorithm = %self.algorithm,
            start,
            goal,
            found = result.is_found(),
            cost = result.cost,
            expanded = result.expanded,
            "search finished"
        );
        Ok(result)
    }

    fn run(&self, source: usize, target: usize) -> SearchResult {
        let discipline = self.algorithm.discipline();
        let goal_zone = self.graph.zone_at(target);
        let estimate = |node: usize| {
            if discipline.uses_heuristic() {
                self.heuristic.estimate(self.graph.zone_at(node), goal_zone)
            } else {
                0.0
            }
        };

        let n = self.graph.len();
        let mut best_g = vec![f64::INFINITY; n];
        let mut closed = vec![false; n];
        let mut labels = vec![Label {
            node: source,
            parent: None,
            g: 0.0,
        }];
        let mut frontier = Frontier::new(discipline);
        frontier.push(0, discipline.priority(0.0, estimate(source)));
        best_g[source] = 0.0;

        let mut expanded = 0;
        while let Some(current) = frontier.pop() {
            let Label { node, g, .. } = labels[current];

            if discipline.tracks_cost() {
                if g > best_g[node] {
                    continue;
                }
            } else {
                if closed[node] {
                    continue;
                }
                closed[node] = true;
            }

            if node == target {
                return self.trace_back(&labels, current, expanded);
            }
            expanded += 1;

            // roads are pushed in insertion order, so LIFO expands the last one first
            for road in self.graph.roads_from(node) {
                if road.condition.closed {
                    continue;
                }

                let next_g = g + road.weight;
                if discipline.tracks_cost() {
                    if next_g >= best_g[road.to] {
                        continue;
                    }
                    best_g[road.to] = next_g;
                } else if closed[road.to] {
                    continue;
                }

                labels.push(Label {
                    node: road.to,
                    parent: Some(current),
                    g: next_g,
                });
                frontier.push(labels.len() - 1, discipline.priority(next_g, estimate(road.to)));
            }
        }

        SearchResult::unreachable(expanded)
    }

    fn trace_back(&self, labels: &[Label], last: usize, expanded: usize) -> SearchResult {
        let mut path = Vec::new();
        let mut cursor = Some(last);
        while let Some(i) = cursor {
            path.push(self.graph.zone_at(labels[i].node).id().clone());
            cursor = labels[i].parent;
        }
        path.reverse();

        SearchResult {
            path: Some(path),
            cost: labels[last].g,
            expanded,
        }
    }
}
