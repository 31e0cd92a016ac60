//! Domain model types for relief dispatch.
//!
//! Zones with demand, priority, and deadlines; vehicle kinds with their
//! catalog specs and per-zone inventories; road conditions; and the records
//! a dispatch run produces.

mod assignment;
mod road;
mod vehicle;
mod zone;

pub use assignment::{AssignmentRecord, LegDetail, Unserviceable, UnserviceableReason, VehicleShipment};
pub use road::{RoadCondition, Weather};
pub use vehicle::{FleetInventory, VehicleCatalog, VehicleKind, VehicleSpec};
pub use zone::{parse_deadline, Zone, ZoneId, ZoneKind, DEADLINE_FORMAT};
