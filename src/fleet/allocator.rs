//! Minimum-excess vehicle selection.
//!
//! # Algorithm
//!
//! Chooses how many vehicles of each kind to send so that total capacity
//! covers the demand. The objective is lexicographic: first minimize excess
//! capacity (allocated capacity minus demand), then minimize the number of
//! vehicles.
//!
//! Solved as a bounded knapsack over achievable capacity sums:
//!
//! 1. Capacities and demand are divided by the gcd of the capacities in play
//!    (demand rounded up), which preserves every achievable sum.
//! 2. Each kind's available count is split into power-of-two chunks so the
//!    bounded problem becomes a 0/1 problem whose chunk subsets reproduce
//!    every count from zero to the available total.
//! 3. `best[s]` holds the fewest vehicles whose capacities sum to exactly
//!    `s`, for `s` up to `demand + max capacity`. No optimal selection can
//!    exceed that bound: dropping any vehicle from it would still cover the
//!    demand otherwise.
//! 4. The smallest `s >= demand` with a finite count wins and the chosen
//!    chunks are read back from a per-chunk take table.
//!
//! # Complexity
//!
//! O(C · S) time and space, where C is the number of chunks
//! (Σ log₂ count per kind) and S is the scaled bound `demand + max capacity`.

use std::collections::BTreeMap;

use crate::models::{FleetInventory, VehicleCatalog, VehicleKind};

/// The available fleet cannot carry the demand even if fully committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("demand {demand} exceeds available capacity {available_capacity}")]
pub struct InsufficientCapacity {
    /// Units requested.
    pub demand: u64,
    /// Capacity of every usable vehicle combined.
    pub available_capacity: u64,
}

/// Vehicles chosen to carry one demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    quantities: BTreeMap<VehicleKind, u32>,
    capacity: u64,
    demand: u64,
}

impl Allocation {
    /// An allocation with no vehicles.
    pub fn empty(demand: u64) -> Self {
        Self {
            quantities: BTreeMap::new(),
            capacity: 0,
            demand,
        }
    }

    /// Vehicles per kind. Kinds with zero vehicles are absent.
    pub fn quantities(&self) -> &BTreeMap<VehicleKind, u32> {
        &self.quantities
    }

    /// Vehicles of `kind`.
    pub fn quantity(&self, kind: VehicleKind) -> u32 {
        self.quantities.get(&kind).copied().unwrap_or(0)
    }

    /// Combined capacity of the chosen vehicles.
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Demand the allocation was computed for.
    pub fn demand(&self) -> u64 {
        self.demand
    }

    /// Capacity beyond the demand.
    pub fn excess(&self) -> u64 {
        self.capacity.saturating_sub(self.demand)
    }

    /// Total number of vehicles.
    pub fn vehicle_count(&self) -> u32 {
        self.quantities.values().sum()
    }

    /// Returns `true` if no vehicles were chosen.
    pub fn is_empty(&self) -> bool {
        self.quantities.is_empty()
    }
}

/// A group of `count` vehicles of one kind, taken or left as a unit.
#[derive(Debug, Clone, Copy)]
struct Chunk {
    kind: VehicleKind,
    count: u32,
    weight: usize,
}

/// Selects vehicles from an inventory using specs from a catalog.
///
/// Kinds that are absent from the catalog or have zero capacity are ignored.
///
/// # Examples
///
/// ```
/// use relief_dispatch::fleet::FleetAllocator;
/// use relief_dispatch::models::{FleetInventory, VehicleCatalog, VehicleKind, VehicleSpec};
///
/// let catalog = VehicleCatalog::new().with_spec(VehicleKind::Car, VehicleSpec::new(500, 100.0, 60.0));
/// let fleet = FleetInventory::new().with(VehicleKind::Car, 2);
///
/// let alloc = FleetAllocator::new(&catalog).allocate(900, &fleet).unwrap();
/// assert_eq!(alloc.quantity(VehicleKind::Car), 2);
/// assert_eq!(alloc.excess(), 100);
///
/// assert!(FleetAllocator::new(&catalog).allocate(1_001, &fleet).is_err());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct FleetAllocator<'c> {
    catalog: &'c VehicleCatalog,
}

impl<'c> FleetAllocator<'c> {
    /// Creates an allocator over `catalog`.
    pub fn new(catalog: &'c VehicleCatalog) -> Self {
        Self { catalog }
    }

    /// Total capacity of the usable vehicles in `inventory`.
    pub fn available_capacity(&self, inventory: &FleetInventory) -> u64 {
        self.usable(inventory)
            .map(|(_, capacity, count)| capacity.saturating_mul(u64::from(count)))
            .fold(0u64, u64::saturating_add)
    }

    /// Chooses vehicles for `demand`.
    ///
    /// Demand 0 yields the empty allocation. Identical inputs always yield
    /// the identical allocation.
    pub fn allocate(
        &self,
        demand: u64,
        inventory: &FleetInventory,
    ) -> Result<Allocation, InsufficientCapacity> {
        if demand == 0 {
            return Ok(Allocation::empty(0));
        }

        let available_capacity = self.available_capacity(inventory);
        if available_capacity < demand {
            return Err(InsufficientCapacity {
                demand,
                available_capacity,
            });
        }

        let kinds: Vec<(VehicleKind, u64, u32)> = self.usable(inventory).collect();
        let unit = kinds.iter().fold(0, |g, &(_, capacity, _)| gcd(g, capacity));
        let target = demand.div_ceil(unit) as usize;
        let max_weight = kinds
            .iter()
            .map(|&(_, capacity, _)| (capacity / unit) as usize)
            .max()
            .unwrap_or(0);
        let bound = target + max_weight;

        let chunks = split_into_chunks(&kinds, unit, bound);

        const UNREACHABLE: u64 = u64::MAX;
        let width = bound + 1;
        let mut best = vec![UNREACHABLE; width];
        let mut take = vec![false; chunks.len() * width];
        best[0] = 0;

        for (i, chunk) in chunks.iter().enumerate() {
            for s in (chunk.weight..=bound).rev() {
                let before = best[s - chunk.weight];
                if before == UNREACHABLE {
                    continue;
                }
                let candidate = before + u64::from(chunk.count);
                if candidate < best[s] {
                    best[s] = candidate;
                    take[i * width + s] = true;
                }
            }
        }

        // Feasible because the full fleet covers the demand; see module docs.
        let Some(sum) = (target..=bound).find(|&s| best[s] != UNREACHABLE) else {
            return Err(InsufficientCapacity {
                demand,
                available_capacity,
            });
        };

        let mut quantities = BTreeMap::new();
        let mut s = sum;
        for (i, chunk) in chunks.iter().enumerate().rev() {
            if take[i * width + s] {
                *quantities.entry(chunk.kind).or_insert(0) += chunk.count;
                s -= chunk.weight;
            }
        }

        let capacity = quantities
            .iter()
            .map(|(&kind, &count)| self.capacity_of(kind) * u64::from(count))
            .sum();

        Ok(Allocation {
            quantities,
            capacity,
            demand,
        })
    }

    /// `(kind, capacity, count)` for every kind that can carry load.
    fn usable<'a>(
        &'a self,
        inventory: &'a FleetInventory,
    ) -> impl Iterator<Item = (VehicleKind, u64, u32)> + 'a {
        inventory.iter().filter_map(move |(kind, count)| {
            let capacity = self.catalog.spec(kind)?.capacity();
            (capacity > 0).then_some((kind, capacity, count))
        })
    }

    fn capacity_of(&self, kind: VehicleKind) -> u64 {
        self.catalog.spec(kind).map_or(0, |spec| spec.capacity())
    }
}

/// Binary splitting of bounded counts into 0/1 chunks.
///
/// Counts beyond what could ever fit under `bound` are dropped first.
fn split_into_chunks(kinds: &[(VehicleKind, u64, u32)], unit: u64, bound: usize) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    for &(kind, capacity, count) in kinds {
        let weight = (capacity / unit) as usize;
        let useful = u32::try_from(bound / weight).unwrap_or(u32::MAX);
        let mut remaining = count.min(useful);
        let mut size = 1u32;
        while remaining > 0 {
            let take = size.min(remaining);
            chunks.push(Chunk {
                kind,
                count: take,
                weight: weight * take as usize,
            });
            remaining -= take;
            size = size.saturating_mul(2);
        }
    }
    chunks
}

fn gcd(a: u64, b: u64) -> u64 {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}
