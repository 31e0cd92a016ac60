//! Zone graph: topology, closures, and per-zone attributes.

use std::collections::{BTreeSet, HashMap};

use crate::error::{DispatchError, Result};
use crate::models::{RoadCondition, Weather, Zone, ZoneId, ZoneKind};

/// Outgoing road stored by index.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Road {
    pub(crate) to: usize,
    pub(crate) weight: f64,
    pub(crate) condition: RoadCondition,
}

/// A neighbouring zone as seen from one endpoint of a road.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor<'a> {
    /// The adjacent zone.
    pub zone: &'a ZoneId,
    /// Road length.
    pub weight: f64,
    /// Whether the road is closed for this run.
    pub closed: bool,
    /// Weather on the road.
    pub weather: Weather,
}

/// Weighted graph of zones and roads.
///
/// Roads are directed internally; an undirected graph stores each road in
/// both directions. Topology and closures are fixed once built, so a graph
/// can be shared read-only across search workers.
///
/// # Examples
///
/// ```
/// use relief_dispatch::graph::ZoneGraph;
/// use relief_dispatch::models::{RoadCondition, Zone, ZoneKind};
///
/// let mut g = ZoneGraph::undirected();
/// g.add_zone(Zone::supply("A", 0.0, 0.0)).unwrap();
/// g.add_zone(Zone::normal("B", 0.0, 1.0, 10)).unwrap();
/// g.add_road("A", "B", 12.5, RoadCondition::open()).unwrap();
///
/// assert_eq!(g.edge_cost("B", "A").unwrap(), 12.5);
/// assert_eq!(g.zones_of_type(ZoneKind::Normal).len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct ZoneGraph {
    directed: bool,
    zones: Vec<Zone>,
    index: HashMap<ZoneId, usize>,
    adjacency: Vec<Vec<Road>>,
}

impl ZoneGraph {
    /// Creates an empty graph.
    pub fn new(directed: bool) -> Self {
        Self {
            directed,
            zones: Vec::new(),
            index: HashMap::new(),
            adjacency: Vec::new(),
        }
    }

    /// Creates an empty undirected graph.
    pub fn undirected() -> Self {
        Self::new(false)
    }

    /// Creates an empty directed graph.
    pub fn directed() -> Self {
        Self::new(true)
    }

    /// Adds a zone. Ids must be unique.
    pub fn add_zone(&mut self, zone: Zone) -> Result<()> {
        if self.index.contains_key(zone.id()) {
            return Err(DispatchError::DuplicateZone(zone.id().clone()));
        }
        self.index.insert(zone.id().clone(), self.zones.len());
        self.zones.push(zone);
        self.adjacency.push(Vec::new());
        Ok(())
    }

    /// Adds a road, replacing any existing road between the same endpoints.
    ///
    /// Fails with [`DispatchError::UnknownZone`] if either endpoint is absent
    /// and with [`DispatchError::InvalidRoad`] for negative or NaN weights.
    pub fn add_road(&mut self, from: &str, to: &str, weight: f64, condition: RoadCondition) -> Result<()> {
        let a = self.index_of(from)?;
        let b = self.index_of(to)?;
        if weight.is_nan() || weight < 0.0 {
            return Err(DispatchError::InvalidRoad {
                from: self.zones[a].id().clone(),
                to: self.zones[b].id().clone(),
                weight,
            });
        }
        self.upsert(a, b, weight, condition);
        if !self.directed && a != b {
            self.upsert(b, a, weight, condition);
        }
        Ok(())
    }

    fn upsert(&mut self, from: usize, to: usize, weight: f64, condition: RoadCondition) {
        let roads = &mut self.adjacency[from];
        match roads.iter_mut().find(|r| r.to == to) {
            Some(road) => {
                road.weight = weight;
                road.condition = condition;
            }
            None => roads.push(Road { to, weight, condition }),
        }
    }

    /// Roads leaving `id`, including closed ones, in insertion order.
    pub fn neighbors(&self, id: &str) -> Result<impl Iterator<Item = Neighbor<'_>>> {
        let from = self.index_of(id)?;
        Ok(self.adjacency[from].iter().map(move |road| Neighbor {
            zone: self.zones[road.to].id(),
            weight: road.weight,
            closed: road.condition.closed,
            weather: road.condition.weather,
        }))
    }

    /// Weight of the road `a -> b`, or `+∞` if there is none.
    ///
    /// Closed roads still report their weight; searches skip them.
    pub fn edge_cost(&self, a: &str, b: &str) -> Result<f64> {
        Ok(self
            .road(a, b)?
            .map_or(f64::INFINITY, |(weight, _)| weight))
    }

    /// Weight and condition of the road `a -> b`, if any.
    pub fn road(&self, a: &str, b: &str) -> Result<Option<(f64, RoadCondition)>> {
        let from = self.index_of(a)?;
        let to = self.index_of(b)?;
        Ok(self.adjacency[from]
            .iter()
            .find(|r| r.to == to)
            .map(|r| (r.weight, r.condition)))
    }

    /// Ids of all zones of kind `kind`.
    pub fn zones_of_type(&self, kind: ZoneKind) -> BTreeSet<ZoneId> {
        self.zones
            .iter()
            .filter(|z| z.kind() == kind)
            .map(|z| z.id().clone())
            .collect()
    }

    /// Looks up a zone.
    pub fn zone(&self, id: &str) -> Result<&Zone> {
        self.index_of(id).map(|i| &self.zones[i])
    }

    /// Returns `true` if `id` is a zone of this graph.
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// All zones in insertion order.
    pub fn zones(&self) -> impl Iterator<Item = &Zone> {
        self.zones.iter()
    }

    /// Number of zones.
    pub fn len(&self) -> usize {
        self.zones.len()
    }

    /// Returns `true` if the graph has no zones.
    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// Whether roads are one-way.
    pub fn is_directed(&self) -> bool {
        self.directed
    }

    /// Number of stored directed roads.
    pub fn road_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum()
    }

    /// Sum of road weights along `path`; `+∞` if consecutive zones are not
    /// connected.
    pub fn path_cost(&self, path: &[ZoneId]) -> Result<f64> {
        let mut total = 0.0;
        for pair in path.windows(2) {
            total += self.edge_cost(pair[0].as_str(), pair[1].as_str())?;
        }
        Ok(total)
    }

    pub(crate) fn index_of(&self, id: &str) -> Result<usize> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| DispatchError::UnknownZone(ZoneId::from(id)))
    }

    pub(crate) fn zone_at(&self, index: usize) -> &Zone {
        &self.zones[index]
    }

    pub(crate) fn roads_from(&self, index: usize) -> &[Road] {
        &self.adjacency[index]
    }
}

impl Default for ZoneGraph {
    fn default() -> Self {
        Self::undirected()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FleetInventory, VehicleKind};

    fn triangle(directed: bool) -> ZoneGraph {
        let mut g = ZoneGraph::new(directed);
        g.add_zone(Zone::support("S", 0.0, 0.0, FleetInventory::new().with(VehicleKind::Car, 1)))
            .expect("add S");
        g.add_zone(Zone::normal("A", 0.0, 1.0, 10)).expect("add A");
        g.add_zone(Zone::normal("B", 1.0, 1.0, 20)).expect("add B");
        g.add_road("S", "A", 4.0, RoadCondition::open()).expect("S-A");
        g.add_road("A", "B", 3.0, RoadCondition::closed()).expect("A-B");
        g.add_road("S", "B", 9.0, RoadCondition::open().with_weather(Weather::Rain))
            .expect("S-B");
        g
    }

    #[test]
    fn test_duplicate_zone_rejected() {
        let mut g = triangle(false);
        let err = g.add_zone(Zone::normal("A", 0.0, 0.0, 1)).unwrap_err();
        assert!(matches!(err, DispatchError::DuplicateZone(id) if id.as_str() == "A"));
    }

    #[test]
    fn test_unknown_zone() {
        let g = triangle(false);
        assert!(matches!(g.neighbors("Q"), Err(DispatchError::UnknownZone(_))));
        assert!(matches!(g.edge_cost("S", "Q"), Err(DispatchError::UnknownZone(_))));
        assert!(matches!(g.zone("Q"), Err(DispatchError::UnknownZone(_))));
        assert!(!g.contains("Q"));
    }

    #[test]
    fn test_negative_weight_rejected() {
        let mut g = triangle(false);
        let err = g.add_road("S", "A", -1.0, RoadCondition::open()).unwrap_err();
        assert!(matches!(err, DispatchError::InvalidRoad { .. }));
        assert!(g.add_road("S", "A", f64::NAN, RoadCondition::open()).is_err());
    }

    #[test]
    fn test_undirected_neighbors() {
        let g = triangle(false);
        let from_a: Vec<_> = g.neighbors("A").expect("A").collect();
        assert_eq!(from_a.len(), 2);
        assert_eq!(from_a[0].zone.as_str(), "S");
        assert_eq!(from_a[0].weight, 4.0);
        assert!(from_a[1].closed);
        assert_eq!(g.road_count(), 6);
    }

    #[test]
    fn test_directed_neighbors() {
        let g = triangle(true);
        assert_eq!(g.neighbors("A").expect("A").count(), 1);
        assert_eq!(g.edge_cost("A", "S").expect("known"), f64::INFINITY);
        assert_eq!(g.road_count(), 3);
    }

    #[test]
    fn test_edge_cost_and_conditions() {
        let g = triangle(false);
        assert_eq!(g.edge_cost("S", "B").expect("known"), 9.0);
        // closed roads keep their weight
        assert_eq!(g.edge_cost("B", "A").expect("known"), 3.0);
        let (_, cond) = g.road("B", "S").expect("known").expect("road");
        assert_eq!(cond.weather, Weather::Rain);
    }

    #[test]
    fn test_add_road_replaces() {
        let mut g = triangle(false);
        g.add_road("A", "S", 1.5, RoadCondition::open()).expect("replace");
        assert_eq!(g.edge_cost("S", "A").expect("known"), 1.5);
        assert_eq!(g.road_count(), 6);
    }

    #[test]
    fn test_zones_of_type() {
        let g = triangle(false);
        let normal: Vec<_> = g.zones_of_type(ZoneKind::Normal).into_iter().collect();
        assert_eq!(normal, vec![ZoneId::from("A"), ZoneId::from("B")]);
        assert_eq!(g.zones_of_type(ZoneKind::Support).len(), 1);
        assert!(g.zones_of_type(ZoneKind::Supply).is_empty());
    }

    #[test]
    fn test_path_cost() {
        let g = triangle(false);
        let path = [ZoneId::from("S"), ZoneId::from("A"), ZoneId::from("B")];
        assert!((g.path_cost(&path).expect("known") - 7.0).abs() < 1e-12);
        assert_eq!(g.path_cost(&path[..1]).expect("known"), 0.0);
    }
}
