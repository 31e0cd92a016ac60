//! Builds a [`ZoneGraph`] from zone input records.
//!
//! Edge weights come from a [`DistanceFn`] over zone coordinates. Closures and
//! weather are fixed at build time, either explicitly per road or drawn from
//! a seeded generator so runs are reproducible.

use std::collections::{HashMap, HashSet};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::ZoneGraph;
use crate::distance::{DistanceFn, Haversine};
use crate::error::{DispatchError, Result};
use crate::models::{
    parse_deadline, FleetInventory, RoadCondition, VehicleKind, Weather, Zone, ZoneId, ZoneKind,
};

/// Default chance that a generated road is closed.
pub const DEFAULT_CLOSURE_PROBABILITY: f64 = 0.1;

/// One fleet entry of a support zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleRecord {
    /// Vehicle kind name, e.g. `"truck"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Vehicles available at the start of the run.
    pub available: u32,
}

/// One zone as supplied by the map input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneRecord {
    /// Unique id.
    pub id: ZoneId,
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Normal, supply, or support.
    pub zone_type: ZoneKind,
    /// Vehicle kinds the zone can receive.
    #[serde(default)]
    pub accessibility: Vec<String>,
    /// Fleet hosted by a support zone.
    #[serde(default)]
    pub vehicles: Vec<VehicleRecord>,
    /// Deadline as `YYYY-MM-DD HH:MM:SS`; `"0"` or missing means none.
    #[serde(default)]
    pub critical_time: Option<String>,
    /// Demand.
    #[serde(default)]
    pub population: u64,
    /// Priority.
    #[serde(default)]
    pub priority: f64,
    /// Ids of zones reachable by a direct road.
    #[serde(default)]
    pub accessible_zones: Vec<ZoneId>,
    /// Local weather, used by [`WeatherPolicy::Endpoints`].
    #[serde(default)]
    pub weather: Option<Weather>,
}

impl ZoneRecord {
    fn to_zone(&self) -> Zone {
        let mut zone = Zone::new(self.id.clone(), self.zone_type, self.latitude, self.longitude)
            .with_demand(self.population)
            .with_priority(self.priority)
            .with_accessibility(parse_kinds(&self.id, &self.accessibility));

        if let Some(raw) = self.critical_time.as_deref() {
            match parse_deadline(raw) {
                Some(deadline) => zone = zone.with_deadline(deadline),
                None if raw.trim().is_empty() || raw.trim() == "0" => {}
                None => warn!(zone = %self.id, critical_time = raw, "unparseable deadline, treating as none"),
            }
        }

        let mut inventory = FleetInventory::new();
        for vehicle in &self.vehicles {
            match vehicle.kind.parse::<VehicleKind>() {
                Ok(kind) => inventory = inventory.with(kind, vehicle.available),
                Err(e) => warn!(zone = %self.id, "skipping fleet entry: {e}"),
            }
        }
        zone.with_inventory(inventory)
    }
}

fn parse_kinds(zone: &ZoneId, names: &[String]) -> Vec<VehicleKind> {
    names
        .iter()
        .filter_map(|name| match name.parse::<VehicleKind>() {
            Ok(kind) => Some(kind),
            Err(e) => {
                warn!(zone = %zone, "ignoring accessibility tag: {e}");
                None
            }
        })
        .collect()
}

/// How road closures are decided.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClosurePolicy {
    /// Only explicitly closed roads are closed.
    Explicit,
    /// Each road is closed with `probability`, drawn from a seeded generator.
    Random {
        /// Chance in `[0, 1]`.
        probability: f64,
        /// Generator seed.
        seed: u64,
    },
}

impl ClosurePolicy {
    /// Random closures at [`DEFAULT_CLOSURE_PROBABILITY`].
    pub fn random(seed: u64) -> Self {
        ClosurePolicy::Random {
            probability: DEFAULT_CLOSURE_PROBABILITY,
            seed,
        }
    }
}

/// How road weather is decided.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WeatherPolicy {
    /// Clear unless overridden.
    Clear,
    /// Uniform draw over all weather labels from a seeded generator.
    Random {
        /// Generator seed.
        seed: u64,
    },
    /// Each road takes the weather of one of its two endpoints, chosen by a
    /// seeded generator. Zones without a weather of their own get a uniform
    /// draw first.
    Endpoints {
        /// Generator seed.
        seed: u64,
    },
}

/// Builds a [`ZoneGraph`] from [`ZoneRecord`]s.
///
/// # Examples
///
/// ```
/// use relief_dispatch::graph::GraphBuilder;
/// use relief_dispatch::models::ZoneKind;
///
/// let json = r#"[
///   {"id": "S", "latitude": 38.57, "longitude": -7.91, "zone_type": "support",
///    "vehicles": [{"type": "truck", "available": 2}], "accessible_zones": ["N"]},
///   {"id": "N", "latitude": 38.84, "longitude": -7.58, "zone_type": "normal",
///    "population": 400, "priority": 2, "critical_time": "0", "accessible_zones": ["S"]}
/// ]"#;
/// let graph = GraphBuilder::from_json_str(json).unwrap().build().unwrap();
/// assert_eq!(graph.zones_of_type(ZoneKind::Support).len(), 1);
/// assert!(graph.edge_cost("S", "N").unwrap() > 40.0);
/// ```
pub struct GraphBuilder<D = Haversine> {
    records: Vec<ZoneRecord>,
    distance: D,
    directed: bool,
    closures: ClosurePolicy,
    weather: WeatherPolicy,
    closed: HashSet<(ZoneId, ZoneId)>,
    weather_overrides: HashMap<(ZoneId, ZoneId), Weather>,
}

impl GraphBuilder<Haversine> {
    /// Starts a builder over `records` with great-circle weights.
    pub fn new(records: Vec<ZoneRecord>) -> Self {
        Self {
            records,
            distance: Haversine,
            directed: false,
            closures: ClosurePolicy::Explicit,
            weather: WeatherPolicy::Clear,
            closed: HashSet::new(),
            weather_overrides: HashMap::new(),
        }
    }

    /// Parses a JSON array of zone records.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let records: Vec<ZoneRecord> = serde_json::from_str(json)?;
        Ok(Self::new(records))
    }
}

impl<D: DistanceFn> GraphBuilder<D> {
    /// Uses a different distance function for road weights.
    pub fn with_distance<E: DistanceFn>(self, distance: E) -> GraphBuilder<E> {
        GraphBuilder {
            records: self.records,
            distance,
            directed: self.directed,
            closures: self.closures,
            weather: self.weather,
            closed: self.closed,
            weather_overrides: self.weather_overrides,
        }
    }

    /// Treats `accessible_zones` as one-way roads.
    pub fn directed(mut self, directed: bool) -> Self {
        self.directed = directed;
        self
    }

    /// Sets the closure policy.
    pub fn with_closures(mut self, policy: ClosurePolicy) -> Self {
        self.closures = policy;
        self
    }

    /// Sets the weather policy.
    pub fn with_weather(mut self, policy: WeatherPolicy) -> Self {
        self.weather = policy;
        self
    }

    /// Closes the road between `a` and `b` regardless of policy.
    pub fn close_road(mut self, a: impl Into<ZoneId>, b: impl Into<ZoneId>) -> Self {
        self.closed.insert((a.into(), b.into()));
        self
    }

    /// Fixes the weather on the road between `a` and `b`.
    pub fn road_weather(mut self, a: impl Into<ZoneId>, b: impl Into<ZoneId>, weather: Weather) -> Self {
        self.weather_overrides.insert((a.into(), b.into()), weather);
        self
    }

    fn key(&self, a: ZoneId, b: ZoneId) -> (ZoneId, ZoneId) {
        if !self.directed && b < a {
            (b, a)
        } else {
            (a, b)
        }
    }

    fn is_closed(&self, (a, b): &(ZoneId, ZoneId)) -> bool {
        self.closed.contains(&(a.clone(), b.clone()))
            || (!self.directed && self.closed.contains(&(b.clone(), a.clone())))
    }

    fn weather_override(&self, (a, b): &(ZoneId, ZoneId)) -> Option<Weather> {
        self.weather_overrides
            .get(&(a.clone(), b.clone()))
            .or_else(|| {
                if self.directed {
                    None
                } else {
                    self.weather_overrides.get(&(b.clone(), a.clone()))
                }
            })
            .copied()
    }

    /// Builds the graph.
    ///
    /// Fails with `DuplicateZone` for repeated ids, `UnknownZone` when an
    /// adjacency entry names a zone that was not supplied, and `InvalidConfig`
    /// when a random closure probability is not a number in `[0, 1]`.
    pub fn build(self) -> Result<ZoneGraph> {
        if let ClosurePolicy::Random { probability, .. } = self.closures {
            if !(0.0..=1.0).contains(&probability) {
                return Err(DispatchError::InvalidConfig(format!(
                    "closure probability must be within [0, 1], got {probability}"
                )));
            }
        }

        let mut graph = ZoneGraph::new(self.directed);
        for record in &self.records {
            graph.add_zone(record.to_zone())?;
        }

        let mut closure_rng = match self.closures {
            ClosurePolicy::Random { seed, .. } => Some(StdRng::seed_from_u64(seed)),
            ClosurePolicy::Explicit => None,
        };
        let mut weather_rng = match self.weather {
            WeatherPolicy::Random { seed } | WeatherPolicy::Endpoints { seed } => {
                Some(StdRng::seed_from_u64(seed))
            }
            WeatherPolicy::Clear => None,
        };
        let local_weather: HashMap<&ZoneId, Weather> = match (self.weather, weather_rng.as_mut()) {
            (WeatherPolicy::Endpoints { .. }, Some(rng)) => self
                .records
                .iter()
                .map(|record| (&record.id, record.weather.unwrap_or_else(|| draw_weather(rng))))
                .collect(),
            _ => HashMap::new(),
        };

        let mut seen = HashSet::new();
        for record in &self.records {
            let from = graph.zone(record.id.as_str())?.coordinates();
            for target in &record.accessible_zones {
                let key = self.key(record.id.clone(), target.clone());
                if !seen.insert(key.clone()) {
                    continue;
                }
                let to = graph.zone(target.as_str())?.coordinates();
                let weight = self.distance.distance_km(from, to);

                let mut closed = self.is_closed(&key);
                if let (Some(rng), ClosurePolicy::Random { probability, .. }) =
                    (closure_rng.as_mut(), self.closures)
                {
                    closed |= rng.random_bool(probability);
                }

                let weather = match (self.weather_override(&key), weather_rng.as_mut()) {
                    (Some(w), _) => w,
                    (None, Some(rng)) => match self.weather {
                        WeatherPolicy::Endpoints { .. } => {
                            let ends = [&record.id, target].map(|id| {
                                local_weather.get(id).copied().unwrap_or_default()
                            });
                            ends[usize::from(rng.random_bool(0.5))]
                        }
                        _ => draw_weather(rng),
                    },
                    (None, None) => Weather::Clear,
                };

                debug!(from = %record.id, to = %target, weight, closed, %weather, "road");
                graph.add_road(
                    record.id.as_str(),
                    target.as_str(),
                    weight,
                    RoadCondition { closed, weather },
                )?;
            }
        }
        Ok(graph)
    }
}

fn draw_weather(rng: &mut StdRng) -> Weather {
    Weather::ALL[rng.random_range(0..Weather::ALL.len())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::Euclidean;

    fn record(id: &str, kind: ZoneKind, x: f64, y: f64, adj: &[&str]) -> ZoneRecord {
        ZoneRecord {
            id: ZoneId::from(id),
            latitude: x,
            longitude: y,
            zone_type: kind,
            accessibility: Vec::new(),
            vehicles: Vec::new(),
            critical_time: None,
            population: 0,
            priority: 0.0,
            accessible_zones: adj.iter().map(|a| ZoneId::from(*a)).collect(),
            weather: None,
        }
    }

    fn line() -> Vec<ZoneRecord> {
        vec![
            record("A", ZoneKind::Support, 0.0, 0.0, &["B"]),
            record("B", ZoneKind::Normal, 3.0, 4.0, &["A", "C"]),
            record("C", ZoneKind::Normal, 3.0, 10.0, &["B"]),
        ]
    }

    #[test]
    fn test_weights_from_distance_fn() {
        let g = GraphBuilder::new(line()).with_distance(Euclidean).build().expect("build");
        assert!((g.edge_cost("A", "B").expect("known") - 5.0).abs() < 1e-10);
        assert!((g.edge_cost("C", "B").expect("known") - 6.0).abs() < 1e-10);
        // A-B listed twice, stored once per direction
        assert_eq!(g.road_count(), 4);
    }

    #[test]
    fn test_explicit_closure_and_weather() {
        let g = GraphBuilder::new(line())
            .with_distance(Euclidean)
            .close_road("B", "A")
            .road_weather("C", "B", Weather::Fog)
            .build()
            .expect("build");
        let (_, ab) = g.road("A", "B").expect("known").expect("road");
        assert!(ab.closed);
        let (_, bc) = g.road("B", "C").expect("known").expect("road");
        assert!(!bc.closed);
        assert_eq!(bc.weather, Weather::Fog);
    }

    #[test]
    fn test_random_policies_are_reproducible() {
        let build = |seed| {
            GraphBuilder::new(line())
                .with_distance(Euclidean)
                .with_closures(ClosurePolicy::Random { probability: 0.5, seed })
                .with_weather(WeatherPolicy::Random { seed })
                .build()
                .expect("build")
        };
        let a = build(7);
        let b = build(7);
        for (x, y) in [("A", "B"), ("B", "C")] {
            assert_eq!(a.road(x, y).expect("known"), b.road(x, y).expect("known"));
        }
    }

    #[test]
    fn test_default_random_closure_probability() {
        assert_eq!(
            ClosurePolicy::random(3),
            ClosurePolicy::Random { probability: 0.1, seed: 3 }
        );
    }

    #[test]
    fn test_closure_probability_must_be_a_chance() {
        for probability in [f64::NAN, -0.1, 1.5, f64::INFINITY] {
            let err = GraphBuilder::new(line())
                .with_closures(ClosurePolicy::Random { probability, seed: 1 })
                .build()
                .unwrap_err();
            assert!(matches!(err, DispatchError::InvalidConfig(_)), "{probability}");
        }
    }

    #[test]
    fn test_endpoint_weather() {
        let mut records = line();
        records[0].weather = Some(Weather::Fog);
        records[1].weather = Some(Weather::Fog);
        records[2].weather = Some(Weather::SnowIce);

        for seed in 0..16 {
            let g = GraphBuilder::new(records.clone())
                .with_distance(Euclidean)
                .with_weather(WeatherPolicy::Endpoints { seed })
                .build()
                .expect("build");
            let (_, ab) = g.road("A", "B").expect("known").expect("road");
            assert_eq!(ab.weather, Weather::Fog);
            let (_, bc) = g.road("B", "C").expect("known").expect("road");
            assert!(matches!(bc.weather, Weather::Fog | Weather::SnowIce));
        }
    }

    #[test]
    fn test_zone_weather_from_json() {
        let json = r#"[
            {"id": "S", "latitude": 0.0, "longitude": 0.0, "zone_type": "support",
             "weather": "Nevoeiro", "accessible_zones": ["N"]},
            {"id": "N", "latitude": 0.0, "longitude": 0.1, "zone_type": "normal",
             "weather": "fog"}
        ]"#;
        let g = GraphBuilder::from_json_str(json)
            .expect("parse")
            .with_weather(WeatherPolicy::Endpoints { seed: 5 })
            .build()
            .expect("build");
        let (_, road) = g.road("S", "N").expect("known").expect("road");
        assert_eq!(road.weather, Weather::Fog);
    }

    #[test]
    fn test_certain_closure() {
        let g = GraphBuilder::new(line())
            .with_distance(Euclidean)
            .with_closures(ClosurePolicy::Random { probability: 1.0, seed: 1 })
            .build()
            .expect("build");
        assert!(g.neighbors("B").expect("B").all(|n| n.closed));
    }

    #[test]
    fn test_unknown_adjacency() {
        let mut records = line();
        records[0].accessible_zones.push(ZoneId::from("Z"));
        let err = GraphBuilder::new(records).build().unwrap_err();
        assert!(matches!(err, DispatchError::UnknownZone(id) if id.as_str() == "Z"));
    }

    #[test]
    fn test_record_fields_carried_over() {
        let json = r#"[
            {"id": "S", "latitude": 0.0, "longitude": 0.0, "zone_type": "support",
             "vehicles": [{"id": "t1", "type": "truck", "available": 3},
                          {"type": "boat", "available": 1}],
             "accessible_zones": ["N"]},
            {"id": "N", "latitude": 0.0, "longitude": 0.1, "zone_type": "normal",
             "accessibility": ["helicopter", "car"], "population": 900, "priority": 4,
             "critical_time": "2024-11-20 18:00:00", "accessible_zones": []},
            {"id": "M", "latitude": 0.0, "longitude": 0.2, "zone_type": "normal",
             "critical_time": "soon"}
        ]"#;
        let g = GraphBuilder::from_json_str(json).expect("parse").build().expect("build");

        let s = g.zone("S").expect("S");
        assert_eq!(s.inventory().available(VehicleKind::Truck), 3);
        assert_eq!(s.inventory().total_vehicles(), 3);

        let n = g.zone("N").expect("N");
        assert_eq!(n.demand(), 900);
        assert_eq!(n.priority(), 4.0);
        assert!(n.deadline().is_some());
        assert!(n.accepts(VehicleKind::Car));
        assert!(!n.accepts(VehicleKind::Truck));

        assert!(g.zone("M").expect("M").deadline().is_none());
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            GraphBuilder::from_json_str("[{\"id\": 1}]"),
            Err(DispatchError::Input(_))
        ));
    }
}
