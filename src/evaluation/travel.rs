//! Leg-by-leg travel time, refuelling, and arrival for vehicles on a path.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDateTime};

use crate::error::{DispatchError, Result};
use crate::graph::ZoneGraph;
use crate::models::{LegDetail, VehicleCatalog, VehicleKind, VehicleShipment, ZoneId};

/// Travel of one vehicle kind along a path.
#[derive(Debug, Clone, PartialEq)]
pub struct TravelEstimate {
    /// Vehicle kind.
    pub kind: VehicleKind,
    /// Per-leg detail in path order.
    pub legs: Vec<LegDetail>,
    /// Leg origins where the vehicle refuels.
    pub refuel_stops: Vec<ZoneId>,
    /// Sum of leg times.
    pub travel_hours: f64,
    /// Sum of leg distances.
    pub distance_km: f64,
    /// Fuel burned by one vehicle.
    pub fuel_used: f64,
}

impl TravelEstimate {
    /// Turns the estimate into a shipment of `quantity` vehicles leaving at
    /// `departure`.
    pub fn into_shipment(self, quantity: u32, departure: NaiveDateTime) -> VehicleShipment {
        VehicleShipment {
            kind: self.kind,
            quantity,
            arrival: advance(departure, self.travel_hours),
            legs: self.legs,
            refuel_stops: self.refuel_stops,
            travel_hours: self.travel_hours,
            fuel_used: self.fuel_used,
        }
    }
}

/// Travel of a mixed fleet along one path.
#[derive(Debug, Clone, PartialEq)]
pub struct ShipmentPlan {
    /// One entry per vehicle kind, in kind order.
    pub shipments: Vec<VehicleShipment>,
    /// Travel time of the slowest shipment.
    pub travel_hours: f64,
    /// Arrival of the slowest shipment.
    pub arrival: NaiveDateTime,
}

/// Converts paths and vehicle choices into timed travel.
///
/// For each leg the cruise speed is scaled by the road's weather factor and
/// the leg takes `distance / adjusted speed` hours. A vehicle starts with a
/// full tank; when the remaining range is shorter than the next leg it
/// refuels at that leg's origin.
///
/// # Examples
///
/// ```
/// use relief_dispatch::evaluation::TravelTimeEstimator;
/// use relief_dispatch::graph::ZoneGraph;
/// use relief_dispatch::models::{RoadCondition, VehicleCatalog, VehicleKind, Weather, Zone, ZoneId};
///
/// let mut g = ZoneGraph::undirected();
/// g.add_zone(Zone::normal("A", 0.0, 0.0, 0)).unwrap();
/// g.add_zone(Zone::normal("B", 0.0, 1.0, 0)).unwrap();
/// g.add_road("A", "B", 80.0, RoadCondition::open().with_weather(Weather::SnowIce)).unwrap();
///
/// let catalog = VehicleCatalog::standard();
/// let estimator = TravelTimeEstimator::new(&g, &catalog);
/// let path = [ZoneId::from("A"), ZoneId::from("B")];
///
/// // Truck cruises at 40 km/h, halved on snow.
/// let truck = estimator.estimate(&path, VehicleKind::Truck).unwrap();
/// assert_eq!(truck.travel_hours, 4.0);
/// assert!(truck.refuel_stops.is_empty());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct TravelTimeEstimator<'a> {
    graph: &'a ZoneGraph,
    catalog: &'a VehicleCatalog,
}

impl<'a> TravelTimeEstimator<'a> {
    /// Creates an estimator over `graph` with specs from `catalog`.
    pub fn new(graph: &'a ZoneGraph, catalog: &'a VehicleCatalog) -> Self {
        Self { graph, catalog }
    }

    /// Estimates travel of one vehicle of `kind` along `path`.
    ///
    /// Fails with [`DispatchError::UnknownVehicle`] if `kind` is not in the
    /// catalog and [`DispatchError::MissingRoad`] if two consecutive zones
    /// are not connected.
    pub fn estimate(&self, path: &[ZoneId], kind: VehicleKind) -> Result<TravelEstimate> {
        let spec = self.catalog.require(kind)?;
        let range = spec.range_km();

        let mut legs = Vec::with_capacity(path.len().saturating_sub(1));
        let mut refuel_stops = Vec::new();
        let mut remaining = range;
        let mut travel_hours = 0.0;
        let mut distance_km = 0.0;

        for pair in path.windows(2) {
            let (from, to) = (&pair[0], &pair[1]);
            let (distance, condition) =
                self.graph
                    .road(from.as_str(), to.as_str())?
                    .ok_or_else(|| DispatchError::MissingRoad {
                        from: from.clone(),
                        to: to.clone(),
                    })?;

            if remaining < distance {
                refuel_stops.push(from.clone());
                remaining = range;
            }
            remaining -= distance;

            let adjusted_speed_kmh = spec.speed_kmh() * condition.weather.speed_factor();
            let hours = distance / adjusted_speed_kmh;
            travel_hours += hours;
            distance_km += distance;

            legs.push(LegDetail {
                from: from.clone(),
                to: to.clone(),
                weather: condition.weather,
                distance_km: distance,
                adjusted_speed_kmh,
                travel_hours: hours,
            });
        }

        Ok(TravelEstimate {
            kind,
            legs,
            refuel_stops,
            travel_hours,
            distance_km,
            fuel_used: spec.fuel_for(distance_km),
        })
    }

    /// Estimates every kind in `vehicles` along `path`, leaving at
    /// `departure`.
    ///
    /// The plan completes when its slowest shipment arrives. An empty
    /// selection arrives at `departure`.
    pub fn estimate_shipment(
        &self,
        path: &[ZoneId],
        vehicles: &BTreeMap<VehicleKind, u32>,
        departure: NaiveDateTime,
    ) -> Result<ShipmentPlan> {
        let mut shipments = Vec::with_capacity(vehicles.len());
        let mut travel_hours: f64 = 0.0;
        for (&kind, &quantity) in vehicles.iter().filter(|&(_, &q)| q > 0) {
            let estimate = self.estimate(path, kind)?;
            travel_hours = travel_hours.max(estimate.travel_hours);
            shipments.push(estimate.into_shipment(quantity, departure));
        }

        let arrival = shipments
            .iter()
            .map(|s| s.arrival)
            .max()
            .unwrap_or(departure);

        Ok(ShipmentPlan {
            shipments,
            travel_hours,
            arrival,
        })
    }
}

/// `at` plus `hours`, saturating at the latest representable time.
pub fn advance(at: NaiveDateTime, hours: f64) -> NaiveDateTime {
    // about 30 000 years
    const MAX_MILLIS: f64 = 1.0e15;
    let millis = (hours * 3_600_000.0).round();
    if !millis.is_finite() || millis.abs() > MAX_MILLIS {
        return if millis < 0.0 {
            NaiveDateTime::MIN
        } else {
            NaiveDateTime::MAX
        };
    }
    at.checked_add_signed(Duration::milliseconds(millis as i64))
        .unwrap_or(NaiveDateTime::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{parse_deadline, RoadCondition, VehicleSpec, Weather, Zone};

    fn ids(path: &[&str]) -> Vec<ZoneId> {
        path.iter().map(|&s| ZoneId::from(s)).collect()
    }

    fn line() -> ZoneGraph {
        let mut g = ZoneGraph::undirected();
        for id in ["A", "B", "C", "D"] {
            g.add_zone(Zone::normal(id, 0.0, 0.0, 0)).expect("zone");
        }
        g.add_road("A", "B", 60.0, RoadCondition::open()).expect("road");
        g.add_road("B", "C", 60.0, RoadCondition::open().with_weather(Weather::Rain))
            .expect("road");
        g.add_road("C", "D", 30.0, RoadCondition::open().with_weather(Weather::Fog))
            .expect("road");
        g
    }

    fn catalog() -> VehicleCatalog {
        VehicleCatalog::new()
            .with_spec(
                VehicleKind::Car,
                VehicleSpec::new(100, 100.0, 60.0).with_fuel_efficiency(0.1),
            )
            .with_spec(VehicleKind::Truck, VehicleSpec::new(1000, 500.0, 30.0))
    }

    fn t0() -> NaiveDateTime {
        parse_deadline("2024-11-20 08:00:00").expect("valid")
    }

    #[test]
    fn test_weather_adjusted_legs() {
        let (g, cat) = (line(), catalog());
        let est = TravelTimeEstimator::new(&g, &cat)
            .estimate(&ids(&["A", "B", "C", "D"]), VehicleKind::Car)
            .expect("estimate");

        assert_eq!(est.legs.len(), 3);
        assert_eq!(est.legs[0].adjusted_speed_kmh, 60.0);
        assert!((est.legs[1].adjusted_speed_kmh - 51.0).abs() < 1e-9);
        assert!((est.legs[2].adjusted_speed_kmh - 42.0).abs() < 1e-9);
        assert_eq!(est.legs[1].weather, Weather::Rain);

        let expected = 1.0 + 60.0 / 51.0 + 30.0 / 42.0;
        assert!((est.travel_hours - expected).abs() < 1e-9);
        assert_eq!(est.distance_km, 150.0);
        assert!((est.fuel_used - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_refuel_at_leg_origin() {
        let (g, cat) = (line(), catalog());
        // car range 100: 60 then 60 forces a refuel at B; 40 left covers C-D
        let est = TravelTimeEstimator::new(&g, &cat)
            .estimate(&ids(&["A", "B", "C", "D"]), VehicleKind::Car)
            .expect("estimate");
        assert_eq!(est.refuel_stops, ids(&["B"]));

        let truck = TravelTimeEstimator::new(&g, &cat)
            .estimate(&ids(&["A", "B", "C", "D"]), VehicleKind::Truck)
            .expect("estimate");
        assert!(truck.refuel_stops.is_empty());
    }

    #[test]
    fn test_single_zone_path() {
        let (g, cat) = (line(), catalog());
        let est = TravelTimeEstimator::new(&g, &cat)
            .estimate(&ids(&["A"]), VehicleKind::Car)
            .expect("estimate");
        assert!(est.legs.is_empty());
        assert_eq!(est.travel_hours, 0.0);
    }

    #[test]
    fn test_errors() {
        let (g, cat) = (line(), catalog());
        let estimator = TravelTimeEstimator::new(&g, &cat);
        assert!(matches!(
            estimator.estimate(&ids(&["A", "C"]), VehicleKind::Car),
            Err(DispatchError::MissingRoad { .. })
        ));
        assert!(matches!(
            estimator.estimate(&ids(&["A", "B"]), VehicleKind::Helicopter),
            Err(DispatchError::UnknownVehicle(VehicleKind::Helicopter))
        ));
        assert!(matches!(
            estimator.estimate(&ids(&["A", "Q"]), VehicleKind::Car),
            Err(DispatchError::UnknownZone(_))
        ));
    }

    #[test]
    fn test_slowest_shipment_gates_arrival() {
        let (g, cat) = (line(), catalog());
        let vehicles = BTreeMap::from([(VehicleKind::Car, 2), (VehicleKind::Truck, 1)]);
        let plan = TravelTimeEstimator::new(&g, &cat)
            .estimate_shipment(&ids(&["A", "B"]), &vehicles, t0())
            .expect("plan");

        assert_eq!(plan.shipments.len(), 2);
        assert_eq!(plan.shipments[0].kind, VehicleKind::Car);
        assert_eq!(plan.shipments[0].quantity, 2);
        // truck: 60 km at 30 km/h
        assert_eq!(plan.travel_hours, 2.0);
        assert_eq!(plan.arrival, parse_deadline("2024-11-20 10:00:00").expect("valid"));
        assert_eq!(plan.shipments[0].arrival, parse_deadline("2024-11-20 09:00:00").expect("valid"));
    }

    #[test]
    fn test_empty_shipment_arrives_immediately() {
        let (g, cat) = (line(), catalog());
        let plan = TravelTimeEstimator::new(&g, &cat)
            .estimate_shipment(&ids(&["A", "B"]), &BTreeMap::new(), t0())
            .expect("plan");
        assert!(plan.shipments.is_empty());
        assert_eq!(plan.arrival, t0());
    }

    #[test]
    fn test_advance_saturates() {
        assert_eq!(advance(t0(), 1.5), parse_deadline("2024-11-20 09:30:00").expect("valid"));
        assert_eq!(advance(t0(), f64::INFINITY), NaiveDateTime::MAX);
    }
}
