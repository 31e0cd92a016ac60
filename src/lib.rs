//! # relief-dispatch
//!
//! Simulated dispatch of relief supplies over a network of zones: finds
//! routes from support zones to zones in need, picks vehicle fleets that
//! can carry the demand, and schedules the work by urgency across rounds.
//!
//! ## Modules
//!
//! - [`models`] — Zones, vehicle kinds and specs, fleet inventories, road conditions, records
//! - [`distance`] — Geographic distance functions (haversine, euclidean)
//! - [`graph`] — Zone graph and building it from zone records
//! - [`search`] — BFS, DFS, uniform-cost, greedy best-first and A* search
//! - [`fleet`] — Minimum-excess fleet allocation
//! - [`evaluation`] — Weather-adjusted travel time, refuelling and arrival
//! - [`dispatch`] — Urgency ordering, round-based scheduling, result sinks
//!
//! ## Example
//!
//! ```
//! use relief_dispatch::dispatch::{run_dispatch, ResourceMode};
//! use relief_dispatch::graph::ZoneGraph;
//! use relief_dispatch::models::{parse_deadline, FleetInventory, RoadCondition, VehicleCatalog, VehicleKind, Zone};
//! use relief_dispatch::search::Algorithm;
//!
//! let mut g = ZoneGraph::undirected();
//! g.add_zone(Zone::support("S", 38.57, -7.91, FleetInventory::new().with(VehicleKind::Car, 3))).unwrap();
//! g.add_zone(Zone::normal("N", 38.84, -7.58, 250_000).with_priority(4.0)).unwrap();
//! g.add_road("S", "N", 45.0, RoadCondition::open()).unwrap();
//!
//! let start = parse_deadline("2024-11-20 08:00:00").unwrap();
//! let outcome = run_dispatch(&g, &VehicleCatalog::standard(), Algorithm::AStar, ResourceMode::Bounded, start).unwrap();
//!
//! let record = outcome.record_for("N").unwrap();
//! assert_eq!(record.vehicle_count(), 3);
//! ```

pub mod dispatch;
pub mod distance;
pub mod error;
pub mod evaluation;
pub mod fleet;
pub mod graph;
pub mod models;
pub mod search;

pub use error::{DispatchError, Result};
