//! Vehicle kinds, their fixed specifications, and per-zone fleet inventories.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DispatchError, Result};

/// Tag identifying a vehicle type.
///
/// Behaviour differs only by data, so a kind is looked up in a
/// [`VehicleCatalog`] rather than carrying its own methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleKind {
    /// Light road vehicle.
    Car,
    /// Heavy road vehicle.
    Truck,
    /// Airborne; short range, fast.
    Helicopter,
}

impl VehicleKind {
    /// All kinds in catalog order.
    pub const ALL: [VehicleKind; 3] = [VehicleKind::Car, VehicleKind::Truck, VehicleKind::Helicopter];

    /// Lowercase name used in input documents.
    pub fn as_str(self) -> &'static str {
        match self {
            VehicleKind::Car => "car",
            VehicleKind::Truck => "truck",
            VehicleKind::Helicopter => "helicopter",
        }
    }
}

impl fmt::Display for VehicleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VehicleKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        VehicleKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown vehicle kind `{s}`"))
    }
}

/// Static specification shared by every vehicle of one kind.
///
/// # Examples
///
/// ```
/// use relief_dispatch::models::VehicleSpec;
///
/// let spec = VehicleSpec::new(1_000, 500.0, 40.0).with_fuel_efficiency(0.2);
/// assert_eq!(spec.capacity(), 1_000);
/// assert_eq!(spec.range_km(), 500.0);
/// assert!((spec.fuel_for(100.0) - 20.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VehicleSpec {
    capacity: u64,
    range_km: f64,
    fuel_efficiency: f64,
    speed_kmh: f64,
    fuel_capacity: f64,
}

impl VehicleSpec {
    /// Creates a spec with the given load capacity, range, and cruise speed.
    ///
    /// Fuel efficiency and tank size default to zero.
    pub fn new(capacity: u64, range_km: f64, speed_kmh: f64) -> Self {
        Self {
            capacity,
            range_km,
            fuel_efficiency: 0.0,
            speed_kmh,
            fuel_capacity: 0.0,
        }
    }

    /// Sets fuel consumption per km.
    pub fn with_fuel_efficiency(mut self, per_km: f64) -> Self {
        self.fuel_efficiency = per_km;
        self
    }

    /// Sets tank size.
    pub fn with_fuel_capacity(mut self, capacity: f64) -> Self {
        self.fuel_capacity = capacity;
        self
    }

    /// Load units carried per vehicle.
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Kilometres travelled on a full tank.
    pub fn range_km(&self) -> f64 {
        self.range_km
    }

    /// Fuel consumed per kilometre.
    pub fn fuel_efficiency(&self) -> f64 {
        self.fuel_efficiency
    }

    /// Cruise speed in clear weather.
    pub fn speed_kmh(&self) -> f64 {
        self.speed_kmh
    }

    /// Tank size.
    pub fn fuel_capacity(&self) -> f64 {
        self.fuel_capacity
    }

    /// Fuel burned over `distance_km`.
    pub fn fuel_for(&self, distance_km: f64) -> f64 {
        distance_km * self.fuel_efficiency
    }
}

/// Lookup table from [`VehicleKind`] to [`VehicleSpec`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VehicleCatalog {
    specs: BTreeMap<VehicleKind, VehicleSpec>,
}

impl VehicleCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// The stock fleet: cars, trucks, and helicopters.
    pub fn standard() -> Self {
        Self::new()
            .with_spec(
                VehicleKind::Car,
                VehicleSpec::new(100_000, 2_000.0, 60.0)
                    .with_fuel_efficiency(0.05)
                    .with_fuel_capacity(100.0),
            )
            .with_spec(
                VehicleKind::Truck,
                VehicleSpec::new(500_000, 2_000.0, 40.0)
                    .with_fuel_efficiency(0.15)
                    .with_fuel_capacity(300.0),
            )
            .with_spec(
                VehicleKind::Helicopter,
                VehicleSpec::new(50_000, 300.0, 150.0)
                    .with_fuel_efficiency(0.25)
                    .with_fuel_capacity(75.0),
            )
    }

    /// Adds or replaces the spec for `kind`.
    pub fn with_spec(mut self, kind: VehicleKind, spec: VehicleSpec) -> Self {
        self.specs.insert(kind, spec);
        self
    }

    /// Spec for `kind`, if registered.
    pub fn spec(&self, kind: VehicleKind) -> Option<&VehicleSpec> {
        self.specs.get(&kind)
    }

    /// Spec for `kind`, failing with [`DispatchError::UnknownVehicle`].
    pub fn require(&self, kind: VehicleKind) -> Result<&VehicleSpec> {
        self.spec(kind).ok_or(DispatchError::UnknownVehicle(kind))
    }

    /// Registered kinds and specs in kind order.
    pub fn iter(&self) -> impl Iterator<Item = (VehicleKind, &VehicleSpec)> {
        self.specs.iter().map(|(kind, spec)| (*kind, spec))
    }
}

/// Remaining vehicle counts at one support zone.
///
/// Counts never go below zero: [`take`](Self::take) either removes the whole
/// request or nothing.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeMap;
/// use relief_dispatch::models::{FleetInventory, VehicleKind};
///
/// let mut fleet = FleetInventory::new().with(VehicleKind::Car, 2);
/// let request = BTreeMap::from([(VehicleKind::Car, 3)]);
/// assert!(!fleet.take(&request));
/// assert_eq!(fleet.available(VehicleKind::Car), 2);
///
/// let request = BTreeMap::from([(VehicleKind::Car, 2)]);
/// assert!(fleet.take(&request));
/// assert!(fleet.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FleetInventory {
    counts: BTreeMap<VehicleKind, u32>,
}

impl FleetInventory {
    /// Creates an empty inventory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `count` vehicles of `kind`.
    pub fn with(mut self, kind: VehicleKind, count: u32) -> Self {
        *self.counts.entry(kind).or_insert(0) += count;
        self
    }

    /// Overwrites the count for `kind`.
    pub fn set(&mut self, kind: VehicleKind, count: u32) {
        self.counts.insert(kind, count);
    }

    /// Vehicles of `kind` currently available.
    pub fn available(&self, kind: VehicleKind) -> u32 {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    /// Non-zero entries in kind order.
    pub fn iter(&self) -> impl Iterator<Item = (VehicleKind, u32)> + '_ {
        self.counts
            .iter()
            .filter(|&(_, &count)| count > 0)
            .map(|(kind, count)| (*kind, *count))
    }

    /// Total number of vehicles across kinds.
    pub fn total_vehicles(&self) -> u64 {
        self.counts.values().map(|&c| u64::from(c)).sum()
    }

    /// Returns `true` if no vehicle of any kind is left.
    pub fn is_empty(&self) -> bool {
        self.counts.values().all(|&c| c == 0)
    }

    /// Returns `true` if every requested quantity is available.
    pub fn covers(&self, request: &BTreeMap<VehicleKind, u32>) -> bool {
        request
            .iter()
            .all(|(kind, &qty)| self.available(*kind) >= qty)
    }

    /// Removes the requested vehicles, all or nothing.
    ///
    /// Returns `false` and leaves the inventory unchanged if any kind is short.
    pub fn take(&mut self, request: &BTreeMap<VehicleKind, u32>) -> bool {
        if !self.covers(request) {
            return false;
        }
        for (kind, &qty) in request {
            if let Some(count) = self.counts.get_mut(kind) {
                *count -= qty;
            }
        }
        true
    }

    /// Resets every count to the configured `maximum`.
    pub fn replenish_from(&mut self, maximum: &FleetInventory) {
        self.counts.clone_from(&maximum.counts);
    }

    /// Keeps only the kinds for which `keep` returns `true`.
    pub fn filtered(&self, mut keep: impl FnMut(VehicleKind) -> bool) -> FleetInventory {
        FleetInventory {
            counts: self
                .counts
                .iter()
                .filter(|(kind, _)| keep(**kind))
                .map(|(kind, count)| (*kind, *count))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parse_and_display() {
        assert_eq!("Truck".parse::<VehicleKind>(), Ok(VehicleKind::Truck));
        assert_eq!(" helicopter".parse::<VehicleKind>(), Ok(VehicleKind::Helicopter));
        assert!("boat".parse::<VehicleKind>().is_err());
        assert_eq!(VehicleKind::Car.to_string(), "car");
    }

    #[test]
    fn test_kind_serde_lowercase() {
        let json = serde_json::to_string(&VehicleKind::Helicopter).expect("serialize");
        assert_eq!(json, "\"helicopter\"");
        let kind: VehicleKind = serde_json::from_str("\"truck\"").expect("deserialize");
        assert_eq!(kind, VehicleKind::Truck);
    }

    #[test]
    fn test_standard_catalog() {
        let catalog = VehicleCatalog::standard();
        let truck = catalog.spec(VehicleKind::Truck).expect("truck");
        assert_eq!(truck.capacity(), 500_000);
        assert_eq!(truck.speed_kmh(), 40.0);
        let heli = catalog.require(VehicleKind::Helicopter).expect("heli");
        assert_eq!(heli.range_km(), 300.0);
        assert_eq!(catalog.iter().count(), 3);
    }

    #[test]
    fn test_catalog_override_and_missing() {
        let catalog = VehicleCatalog::new().with_spec(VehicleKind::Car, VehicleSpec::new(500, 100.0, 50.0));
        assert_eq!(catalog.require(VehicleKind::Car).expect("car").capacity(), 500);
        assert!(matches!(
            catalog.require(VehicleKind::Truck),
            Err(DispatchError::UnknownVehicle(VehicleKind::Truck))
        ));
    }

    #[test]
    fn test_inventory_counts() {
        let fleet = FleetInventory::new()
            .with(VehicleKind::Car, 2)
            .with(VehicleKind::Car, 1)
            .with(VehicleKind::Truck, 0);
        assert_eq!(fleet.available(VehicleKind::Car), 3);
        assert_eq!(fleet.available(VehicleKind::Helicopter), 0);
        assert_eq!(fleet.total_vehicles(), 3);
        assert_eq!(fleet.iter().collect::<Vec<_>>(), vec![(VehicleKind::Car, 3)]);
        assert!(!fleet.is_empty());
        assert!(FleetInventory::new().with(VehicleKind::Truck, 0).is_empty());
    }

    #[test]
    fn test_take_is_all_or_nothing() {
        let mut fleet = FleetInventory::new()
            .with(VehicleKind::Car, 1)
            .with(VehicleKind::Truck, 1);
        let request = BTreeMap::from([(VehicleKind::Car, 1), (VehicleKind::Truck, 2)]);
        assert!(!fleet.take(&request));
        assert_eq!(fleet.available(VehicleKind::Car), 1);

        let request = BTreeMap::from([(VehicleKind::Car, 1), (VehicleKind::Truck, 1)]);
        assert!(fleet.take(&request));
        assert!(fleet.is_empty());
    }

    #[test]
    fn test_replenish_restores_maximum() {
        let maximum = FleetInventory::new().with(VehicleKind::Truck, 2);
        let mut live = maximum.clone();
        assert!(live.take(&BTreeMap::from([(VehicleKind::Truck, 2)])));
        live.replenish_from(&maximum);
        assert_eq!(live, maximum);
    }

    #[test]
    fn test_filtered() {
        let fleet = FleetInventory::new()
            .with(VehicleKind::Car, 1)
            .with(VehicleKind::Helicopter, 4);
        let air = fleet.filtered(|k| k == VehicleKind::Helicopter);
        assert_eq!(air.available(VehicleKind::Helicopter), 4);
        assert_eq!(air.available(VehicleKind::Car), 0);
    }
}
