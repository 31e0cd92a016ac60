//! Zone graph and its construction from input records.

mod builder;
mod zone_graph;

pub use builder::{
    ClosurePolicy, GraphBuilder, VehicleRecord, WeatherPolicy, ZoneRecord, DEFAULT_CLOSURE_PROBABILITY,
};
pub use zone_graph::{Neighbor, ZoneGraph};
