//! Zone identity, classification, and per-zone attributes.

use std::borrow::Borrow;
use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{FleetInventory, VehicleKind};

/// Timestamp layout used for critical deadlines.
pub const DEADLINE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Stable identifier of a zone.
///
/// Ids are assigned once by whoever builds the graph; the engine never mints
/// new ones. Ordering is lexicographic and is used for deterministic
/// tie-breaking.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZoneId(String);

impl ZoneId {
    /// Creates an id from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ZoneId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ZoneId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ZoneId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for ZoneId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Role of a zone in the relief network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneKind {
    /// Needs supplies.
    Normal,
    /// Supply source. Tagged only; never allocates.
    Supply,
    /// Hosts a vehicle fleet.
    Support,
}

/// Parses a critical deadline.
///
/// Returns `None` for empty strings, the `"0"` placeholder, and anything that
/// does not match [`DEADLINE_FORMAT`]. An unparseable deadline means "no
/// deadline", never an error.
///
/// # Examples
///
/// ```
/// use relief_dispatch::models::parse_deadline;
///
/// assert!(parse_deadline("2024-11-20 18:00:00").is_some());
/// assert!(parse_deadline("0").is_none());
/// assert!(parse_deadline("tomorrow").is_none());
/// ```
pub fn parse_deadline(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() || raw == "0" {
        return None;
    }
    NaiveDateTime::parse_from_str(raw, DEADLINE_FORMAT).ok()
}

/// A node of the zone graph.
///
/// Static attributes are fixed once the graph is built. The inventory stored
/// here is the configured maximum; the scheduler keeps its own live copy.
///
/// # Examples
///
/// ```
/// use relief_dispatch::models::{FleetInventory, VehicleKind, Zone, ZoneKind};
///
/// let depot = Zone::support("S", 41.15, -8.61, FleetInventory::new().with(VehicleKind::Truck, 2));
/// assert_eq!(depot.kind(), ZoneKind::Support);
/// assert_eq!(depot.inventory().available(VehicleKind::Truck), 2);
///
/// let village = Zone::normal("N", 41.30, -8.40, 400).with_priority(3.0);
/// assert_eq!(village.demand(), 400);
/// assert!(village.deadline().is_none());
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct Zone {
    id: ZoneId,
    kind: ZoneKind,
    latitude: f64,
    longitude: f64,
    accessibility: BTreeSet<VehicleKind>,
    demand: u64,
    priority: f64,
    deadline: Option<NaiveDateTime>,
    inventory: FleetInventory,
}

impl Zone {
    /// Creates a zone of the given kind with no demand, priority, or fleet.
    pub fn new(id: impl Into<ZoneId>, kind: ZoneKind, latitude: f64, longitude: f64) -> Self {
        Self {
            id: id.into(),
            kind,
            latitude,
            longitude,
            accessibility: BTreeSet::new(),
            demand: 0,
            priority: 0.0,
            deadline: None,
            inventory: FleetInventory::new(),
        }
    }

    /// A zone in need of `demand` units.
    pub fn normal(id: impl Into<ZoneId>, latitude: f64, longitude: f64, demand: u64) -> Self {
        Self::new(id, ZoneKind::Normal, latitude, longitude).with_demand(demand)
    }

    /// A support zone hosting `inventory`.
    pub fn support(
        id: impl Into<ZoneId>,
        latitude: f64,
        longitude: f64,
        inventory: FleetInventory,
    ) -> Self {
        Self::new(id, ZoneKind::Support, latitude, longitude).with_inventory(inventory)
    }

    /// A supply zone.
    pub fn supply(id: impl Into<ZoneId>, latitude: f64, longitude: f64) -> Self {
        Self::new(id, ZoneKind::Supply, latitude, longitude)
    }

    /// Sets the demand (population to serve).
    pub fn with_demand(mut self, demand: u64) -> Self {
        self.demand = demand;
        self
    }

    /// Sets the priority. Negative values are clamped to zero.
    pub fn with_priority(mut self, priority: f64) -> Self {
        self.priority = if priority.is_finite() { priority.max(0.0) } else { 0.0 };
        self
    }

    /// Sets the critical deadline.
    pub fn with_deadline(mut self, deadline: NaiveDateTime) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Restricts which vehicle kinds the zone can receive.
    pub fn with_accessibility(mut self, kinds: impl IntoIterator<Item = VehicleKind>) -> Self {
        self.accessibility = kinds.into_iter().collect();
        self
    }

    /// Sets the configured fleet.
    pub fn with_inventory(mut self, inventory: FleetInventory) -> Self {
        self.inventory = inventory;
        self
    }

    /// Zone id.
    pub fn id(&self) -> &ZoneId {
        &self.id
    }

    /// Zone kind.
    pub fn kind(&self) -> ZoneKind {
        self.kind
    }

    /// Latitude in degrees.
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in degrees.
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// `(latitude, longitude)` pair.
    pub fn coordinates(&self) -> (f64, f64) {
        (self.latitude, self.longitude)
    }

    /// Vehicle kinds this zone can receive. Empty means unrestricted.
    pub fn accessibility(&self) -> &BTreeSet<VehicleKind> {
        &self.accessibility
    }

    /// Returns `true` if a vehicle of `kind` can reach this zone.
    pub fn accepts(&self, kind: VehicleKind) -> bool {
        self.accessibility.is_empty() || self.accessibility.contains(&kind)
    }

    /// Units of supplies needed.
    pub fn demand(&self) -> u64 {
        self.demand
    }

    /// Priority (higher = more urgent).
    pub fn priority(&self) -> f64 {
        self.priority
    }

    /// Critical deadline, if any.
    pub fn deadline(&self) -> Option<NaiveDateTime> {
        self.deadline
    }

    /// Configured fleet (support zones only).
    pub fn inventory(&self) -> &FleetInventory {
        &self.inventory
    }

    /// Hours from `now` until the deadline, floored at zero.
    ///
    /// `None` when the zone has no deadline.
    pub fn hours_until_deadline(&self, now: NaiveDateTime) -> Option<f64> {
        self.deadline.map(|deadline| {
            let seconds = (deadline - now).num_milliseconds() as f64 / 1000.0;
            (seconds / 3600.0).max(0.0)
        })
    }
}
