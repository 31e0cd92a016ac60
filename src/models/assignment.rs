//! Committed dispatch records and unserviceable zones.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDateTime;
use serde::Serialize;

use super::{VehicleKind, Weather, ZoneId};

/// Travel detail for one leg of a path, for one vehicle kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegDetail {
    /// Leg origin.
    pub from: ZoneId,
    /// Leg destination.
    pub to: ZoneId,
    /// Weather on the leg.
    pub weather: Weather,
    /// Road length in km.
    pub distance_km: f64,
    /// Cruise speed after the weather multiplier.
    pub adjusted_speed_kmh: f64,
    /// Time spent on the leg.
    pub travel_hours: f64,
}

/// All vehicles of one kind travelling a committed path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VehicleShipment {
    /// Vehicle kind.
    pub kind: VehicleKind,
    /// Number of vehicles of this kind.
    pub quantity: u32,
    /// Leg-by-leg travel.
    pub legs: Vec<LegDetail>,
    /// Zones where the vehicles refuel, in path order.
    pub refuel_stops: Vec<ZoneId>,
    /// Sum of leg times.
    pub travel_hours: f64,
    /// Fuel burned per vehicle.
    pub fuel_used: f64,
    /// When the vehicles reach the destination.
    pub arrival: NaiveDateTime,
}

/// The committed outcome for one normal zone.
///
/// Handed to a [`RecordSink`](crate::dispatch::RecordSink) once the run
/// settles.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssignmentRecord {
    /// Scheduling round (1-based) in which the zone was served.
    pub round: usize,
    /// Support zone the vehicles leave from.
    pub origin: ZoneId,
    /// Zone being served.
    pub destination: ZoneId,
    /// Zones visited, origin first.
    pub path: Vec<ZoneId>,
    /// Demand delivered.
    pub population: u64,
    /// Sum of road lengths along the path.
    pub distance_km: f64,
    /// Vehicles committed, by kind.
    pub vehicles: BTreeMap<VehicleKind, u32>,
    /// Per-kind travel detail.
    pub shipments: Vec<VehicleShipment>,
    /// Travel time of the slowest shipment.
    pub travel_hours: f64,
    /// Simulated time the vehicles left.
    pub dispatched_at: NaiveDateTime,
    /// Simulated arrival of the slowest shipment.
    pub arrival: NaiveDateTime,
    /// Destination's critical deadline, for comparison.
    pub deadline: Option<NaiveDateTime>,
}

impl AssignmentRecord {
    /// Whether the slowest vehicle arrived by the deadline.
    ///
    /// `None` if the destination has no deadline.
    pub fn meets_deadline(&self) -> Option<bool> {
        self.deadline.map(|deadline| self.arrival <= deadline)
    }

    /// Total number of vehicles committed.
    pub fn vehicle_count(&self) -> u32 {
        self.vehicles.values().sum()
    }

    /// Path rendered as `A -> B -> C`.
    pub fn path_label(&self) -> String {
        self.path
            .iter()
            .map(ZoneId::as_str)
            .collect::<Vec<_>>()
            .join(" -> ")
    }
}

/// Why a normal zone could not be served.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnserviceableReason {
    /// No support zone has an open route to the zone.
    NoRoute,
    /// Routes exist but no reachable fleet can carry the demand.
    InsufficientCapacity,
    /// A full bounded round committed nothing.
    NoProgress,
    /// The bounded loop hit its round cap.
    RoundLimit,
}

impl fmt::Display for UnserviceableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            UnserviceableReason::NoRoute => "no open route",
            UnserviceableReason::InsufficientCapacity => "insufficient fleet capacity",
            UnserviceableReason::NoProgress => "no progress in a full round",
            UnserviceableReason::RoundLimit => "round limit reached",
        };
        f.write_str(label)
    }
}

/// A normal zone left unserved when the run settled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Unserviceable {
    /// The zone.
    pub zone: ZoneId,
    /// Why it was not served.
    pub reason: UnserviceableReason,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::parse_deadline;

    fn record(arrival: &str, deadline: Option<&str>) -> AssignmentRecord {
        let arrival = parse_deadline(arrival).expect("valid");
        AssignmentRecord {
            round: 1,
            origin: ZoneId::from("S"),
            destination: ZoneId::from("N"),
            path: vec![ZoneId::from("S"), ZoneId::from("M"), ZoneId::from("N")],
            population: 10,
            distance_km: 5.0,
            vehicles: BTreeMap::from([(VehicleKind::Car, 2), (VehicleKind::Truck, 1)]),
            shipments: Vec::new(),
            travel_hours: 1.0,
            dispatched_at: arrival,
            arrival,
            deadline: deadline.and_then(parse_deadline),
        }
    }

    #[test]
    fn test_meets_deadline() {
        assert_eq!(record("2024-01-01 10:00:00", None).meets_deadline(), None);
        assert_eq!(
            record("2024-01-01 10:00:00", Some("2024-01-01 10:00:00")).meets_deadline(),
            Some(true)
        );
        assert_eq!(
            record("2024-01-01 10:00:01", Some("2024-01-01 10:00:00")).meets_deadline(),
            Some(false)
        );
    }

    #[test]
    fn test_counts_and_label() {
        let r = record("2024-01-01 10:00:00", None);
        assert_eq!(r.vehicle_count(), 3);
        assert_eq!(r.path_label(), "S -> M -> N");
    }

    #[test]
    fn test_reason_serializes_snake_case() {
        let u = Unserviceable {
            zone: ZoneId::from("N"),
            reason: UnserviceableReason::InsufficientCapacity,
        };
        let json = serde_json::to_string(&u).expect("serialize");
        assert_eq!(json, r#"{"zone":"N","reason":"insufficient_capacity"}"#);
    }
}
