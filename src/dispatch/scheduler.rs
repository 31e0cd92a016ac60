//! Round-based dispatch of vehicle fleets to zones in need.
//!
//! # Lifecycle
//!
//! ```text
//! Idle -> ZonesClassified -> Ordered -> Allocating { round } -> Settled
//! ```
//!
//! Each round evaluates every pending zone against every support zone
//! (search, then allocation) using a snapshot of inventories taken at round
//! start. Evaluation is read-only and may run on the rayon pool. Commits are
//! then applied one zone at a time in urgency order: each zone's candidates
//! are re-allocated and re-ranked against live inventory before one is taken.

use std::collections::BTreeMap;

use chrono::{Local, NaiveDateTime};
use rayon::prelude::*;
use tracing::{debug, info};

use super::config::{DispatchConfig, ResourceMode};
use super::outcome::DispatchOutcome;
use super::urgency::order_by_urgency;
use crate::error::{DispatchError, Result};
use crate::evaluation::{advance, TravelTimeEstimator};
use crate::fleet::{Allocation, FleetAllocator};
use crate::graph::ZoneGraph;
use crate::models::{
    AssignmentRecord, FleetInventory, Unserviceable, UnserviceableReason, VehicleCatalog, Zone,
    ZoneId, ZoneKind,
};
use crate::search::{Algorithm, Pathfinder};

/// Where a scheduler is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Nothing done yet.
    Idle,
    /// Support, supply, and normal zones identified.
    ZonesClassified,
    /// Normal zones sorted by urgency.
    Ordered,
    /// The given round (1-based) has been executed.
    Allocating {
        /// Round number.
        round: usize,
    },
    /// Finished; the outcome is final.
    Settled,
}

/// A feasible way to serve one zone from one support zone.
#[derive(Debug, Clone)]
struct Candidate {
    support: ZoneId,
    path: Vec<ZoneId>,
    cost: f64,
    allocation: Allocation,
}

/// Every feasible candidate for one zone, best first.
#[derive(Debug)]
struct ZoneEvaluation {
    zone: ZoneId,
    candidates: Vec<Candidate>,
    reachable: bool,
}

impl ZoneEvaluation {
    fn failure(&self) -> UnserviceableReason {
        if self.reachable {
            UnserviceableReason::InsufficientCapacity
        } else {
            UnserviceableReason::NoRoute
        }
    }
}

/// Orders zones in need, picks fleets and routes for them, and commits the
/// assignments round by round.
///
/// # Examples
///
/// ```
/// use relief_dispatch::dispatch::{DispatchScheduler, ResourceMode, SchedulerState};
/// use relief_dispatch::graph::ZoneGraph;
/// use relief_dispatch::models::{parse_deadline, FleetInventory, RoadCondition, VehicleCatalog, VehicleKind, Zone};
/// use relief_dispatch::search::Algorithm;
///
/// let mut g = ZoneGraph::undirected();
/// g.add_zone(Zone::support("S", 0.0, 0.0, FleetInventory::new().with(VehicleKind::Truck, 1))).unwrap();
/// g.add_zone(Zone::normal("N", 0.0, 0.1, 400)).unwrap();
/// g.add_road("S", "N", 50.0, RoadCondition::open()).unwrap();
///
/// let catalog = VehicleCatalog::standard();
/// let start = parse_deadline("2024-11-20 08:00:00").unwrap();
/// let mut scheduler = DispatchScheduler::new(&g, &catalog, Algorithm::AStar, ResourceMode::Bounded)
///     .starting_at(start);
///
/// let outcome = scheduler.run().unwrap();
/// assert_eq!(scheduler.state(), SchedulerState::Settled);
/// assert_eq!(outcome.records[0].path_label(), "S -> N");
/// ```
pub struct DispatchScheduler<'a> {
    graph: &'a ZoneGraph,
    catalog: &'a VehicleCatalog,
    algorithm: Algorithm,
    mode: ResourceMode,
    config: DispatchConfig,
    start: Option<NaiveDateTime>,
    state: SchedulerState,
    started_at: NaiveDateTime,
    clock: NaiveDateTime,
    supports: Vec<ZoneId>,
    baseline: BTreeMap<ZoneId, FleetInventory>,
    inventory: BTreeMap<ZoneId, FleetInventory>,
    normals: Vec<ZoneId>,
    pending: Vec<ZoneId>,
    records: Vec<AssignmentRecord>,
    unserviceable: Vec<Unserviceable>,
    rounds: usize,
}

impl<'a> DispatchScheduler<'a> {
    /// Creates an idle scheduler with the default configuration.
    pub fn new(
        graph: &'a ZoneGraph,
        catalog: &'a VehicleCatalog,
        algorithm: Algorithm,
        mode: ResourceMode,
    ) -> Self {
        Self {
            graph,
            catalog,
            algorithm,
            mode,
            config: DispatchConfig::default(),
            start: None,
            state: SchedulerState::Idle,
            started_at: NaiveDateTime::MIN,
            clock: NaiveDateTime::MIN,
            supports: Vec::new(),
            baseline: BTreeMap::new(),
            inventory: BTreeMap::new(),
            normals: Vec::new(),
            pending: Vec::new(),
            records: Vec::new(),
            unserviceable: Vec::new(),
            rounds: 0,
        }
    }

    /// Replaces the configuration.
    pub fn with_config(mut self, config: DispatchConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the simulated clock origin used when the configuration has none.
    pub fn starting_at(mut self, start: NaiveDateTime) -> Self {
        self.start = Some(start);
        self
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Simulated clock.
    pub fn clock(&self) -> NaiveDateTime {
        self.clock
    }

    /// Zones still waiting, in urgency order.
    pub fn pending(&self) -> &[ZoneId] {
        &self.pending
    }

    /// Live inventory of a support zone.
    pub fn inventory(&self, support: &str) -> Option<&FleetInventory> {
        self.inventory.get(support)
    }

    /// Assignments committed so far.
    pub fn records(&self) -> &[AssignmentRecord] {
        &self.records
    }

    /// Runs every remaining transition and returns the outcome.
    pub fn run(&mut self) -> Result<DispatchOutcome> {
        while self.state != SchedulerState::Settled {
            self.step()?;
        }
        Ok(self.outcome())
    }

    /// Performs one lifecycle transition and returns the new state.
    ///
    /// From `Ordered` or `Allocating`, one step executes one round.
    pub fn step(&mut self) -> Result<SchedulerState> {
        match self.state {
            SchedulerState::Idle => {
                self.config.validate()?;
                self.classify();
                self.state = SchedulerState::ZonesClassified;
            }
            SchedulerState::ZonesClassified => {
                self.order()?;
                self.state = SchedulerState::Ordered;
            }
            SchedulerState::Ordered | SchedulerState::Allocating { .. } => {
                if self.pending.is_empty() {
                    self.settle();
                } else {
                    let round = self.rounds + 1;
                    self.state = SchedulerState::Allocating { round };
                    self.allocate_round(round)?;
                }
            }
            SchedulerState::Settled => {}
        }
        Ok(self.state)
    }

    /// Snapshot of the run so far. Final once the state is `Settled`.
    pub fn outcome(&self) -> DispatchOutcome {
        DispatchOutcome {
            algorithm: self.algorithm,
            mode: self.mode,
            records: self.records.clone(),
            unserviceable: self.unserviceable.clone(),
            rounds: self.rounds,
            started_at: self.started_at,
            finished_at: self.clock,
        }
    }

    fn classify(&mut self) {
        self.started_at = self
            .config
            .start_time
            .or(self.start)
            .unwrap_or_else(|| Local::now().naive_local());
        self.clock = self.started_at;

        self.supports = self.graph.zones_of_type(ZoneKind::Support).into_iter().collect();
        self.normals = self.graph.zones_of_type(ZoneKind::Normal).into_iter().collect();
        let supplies = self.graph.zones_of_type(ZoneKind::Supply).len();

        self.baseline = self
            .supports
            .iter()
            .filter_map(|id| self.graph.zone(id.as_str()).ok())
            .map(|zone| (zone.id().clone(), zone.inventory().clone()))
            .collect();
        self.inventory = self.baseline.clone();

        info!(
            supports = self.supports.len(),
            supplies,
            normals = self.normals.len(),
            algorithm = %self.algorithm,
            mode = %self.mode,
            "zones classified"
        );
    }

    fn order(&mut self) -> Result<()> {
        let zones = self
            .normals
            .iter()
            .map(|id| self.graph.zone(id.as_str()))
            .collect::<Result<Vec<&Zone>>>()?;
        let ranked = order_by_urgency(zones, self.clock, &self.config.urgency);
        for (id, score) in &ranked {
            debug!(zone = %id, urgency = score, "ranked");
        }
        self.pending = ranked.into_iter().map(|(id, _)| id).collect();
        Ok(())
    }

    fn allocate_round(&mut self, round: usize) -> Result<()> {
        self.rounds = round;
        let round_start = self.clock;
        let snapshot = self.inventory.clone();

        let evaluations: Vec<ZoneEvaluation> = if self.config.parallel {
            self.pending
                .par_iter()
                .map(|zone| self.evaluate(zone, &snapshot))
                .collect::<Result<_>>()?
        } else {
            self.pending
                .iter()
                .map(|zone| self.evaluate(zone, &snapshot))
                .collect::<Result<_>>()?
        };

        let mut still_pending = Vec::new();
        let mut round_hours: f64 = 0.0;
        let mut committed = 0usize;

        for evaluation in evaluations {
            match self.commit(&evaluation, round, round_start)? {
                Some(hours) => {
                    round_hours = round_hours.max(hours);
                    committed += 1;
                }
                None => still_pending.push(evaluation),
            }
        }

        if committed > 0 {
            self.clock = advance(round_start, round_hours);
        }
        self.pending = still_pending.iter().map(|e| e.zone.clone()).collect();

        info!(
            round,
            committed,
            pending = self.pending.len(),
            clock = %self.clock,
            "round finished"
        );

        match self.mode {
            ResourceMode::Unlimited => {
                for evaluation in &still_pending {
                    self.reject(&evaluation.zone, evaluation.failure());
                }
                self.settle();
            }
            ResourceMode::Bounded if self.pending.is_empty() => self.settle(),
            ResourceMode::Bounded if committed == 0 => {
                for evaluation in &still_pending {
                    let reason = match evaluation.failure() {
                        UnserviceableReason::NoRoute => UnserviceableReason::NoRoute,
                        _ => UnserviceableReason::NoProgress,
                    };
                    self.reject(&evaluation.zone, reason);
                }
                self.settle();
            }
            ResourceMode::Bounded if round >= self.config.max_rounds => {
                for evaluation in &still_pending {
                    self.reject(&evaluation.zone, UnserviceableReason::RoundLimit);
                }
                self.settle();
            }
            ResourceMode::Bounded => self.replenish(),
        }
        Ok(())
    }

    /// Finds every feasible candidate for `zone` against `snapshot`.
    fn evaluate(
        &self,
        zone: &ZoneId,
        snapshot: &BTreeMap<ZoneId, FleetInventory>,
    ) -> Result<ZoneEvaluation> {
        let target = self.graph.zone(zone.as_str())?;
        let finder = Pathfinder::new(self.graph, self.algorithm);
        let allocator = FleetAllocator::new(self.catalog);

        let mut candidates = Vec::new();
        let mut reachable = false;
        for support in &self.supports {
            let Some(inventory) = snapshot.get(support).filter(|inv| !inv.is_empty()) else {
                continue;
            };
            let result = finder.search(support.as_str(), zone.as_str())?;
            let Some(path) = result.path else {
                continue;
            };
            reachable = true;

            let usable = self.usable_fleet(inventory, target, &path)?;
            match allocator.allocate(target.demand(), &usable) {
                Ok(allocation) => {
                    debug!(
                        zone = %zone,
                        support = %support,
                        cost = result.cost,
                        vehicles = allocation.vehicle_count(),
                        excess = allocation.excess(),
                        "feasible candidate"
                    );
                    candidates.push(Candidate {
                        support: support.clone(),
                        path,
                        cost: result.cost,
                        allocation,
                    });
                }
                Err(shortfall) => {
                    debug!(zone = %zone, support = %support, %shortfall, "candidate rejected");
                }
            }
        }

        candidates.sort_by(|a, b| {
            a.cost
                .total_cmp(&b.cost)
                .then_with(|| a.allocation.vehicle_count().cmp(&b.allocation.vehicle_count()))
                .then_with(|| a.support.cmp(&b.support))
        });

        Ok(ZoneEvaluation {
            zone: zone.clone(),
            candidates,
            reachable,
        })
    }

    /// Vehicles from `inventory` that may serve `target` along `path`.
    fn usable_fleet(
        &self,
        inventory: &FleetInventory,
        target: &Zone,
        path: &[ZoneId],
    ) -> Result<FleetInventory> {
        let longest_leg = if self.config.enforce_leg_range {
            let mut longest: f64 = 0.0;
            for pair in path.windows(2) {
                longest = longest.max(self.graph.edge_cost(pair[0].as_str(), pair[1].as_str())?);
            }
            longest
        } else {
            0.0
        };

        Ok(inventory.filtered(|kind| {
            let accessible = !self.config.respect_accessibility || target.accepts(kind);
            let in_range = !self.config.enforce_leg_range
                || self
                    .catalog
                    .spec(kind)
                    .is_some_and(|spec| spec.range_km() >= longest_leg);
            accessible && in_range
        }))
    }

    /// Commits the best candidate that still fits live inventory.
    ///
    /// Returns the shipment's travel hours, or `None` if nothing fits.
    fn commit(
        &mut self,
        evaluation: &ZoneEvaluation,
        round: usize,
        departure: NaiveDateTime,
    ) -> Result<Option<f64>> {
        let target = self.graph.zone(evaluation.zone.as_str())?;

        let chosen = match self.mode {
            ResourceMode::Unlimited => evaluation
                .candidates
                .first()
                .map(|candidate| (candidate, candidate.allocation.clone())),
            ResourceMode::Bounded => self.rank_live(evaluation, target)?,
        };
        let Some((candidate, allocation)) = chosen else {
            return Ok(None);
        };

        if self.mode == ResourceMode::Bounded {
            let taken = self
                .inventory
                .get_mut(&candidate.support)
                .is_some_and(|live| live.take(allocation.quantities()));
            if !taken {
                return Ok(None);
            }
        }

        let estimator = TravelTimeEstimator::new(self.graph, self.catalog);
        let plan = estimator.estimate_shipment(&candidate.path, allocation.quantities(), departure)?;

        debug!(
            zone = %evaluation.zone,
            support = %candidate.support,
            vehicles = allocation.vehicle_count(),
            hours = plan.travel_hours,
            "committed"
        );

        self.records.push(AssignmentRecord {
            round,
            origin: candidate.support.clone(),
            destination: evaluation.zone.clone(),
            path: candidate.path.clone(),
            population: target.demand(),
            distance_km: candidate.cost,
            vehicles: allocation.quantities().clone(),
            shipments: plan.shipments,
            travel_hours: plan.travel_hours,
            dispatched_at: departure,
            arrival: plan.arrival,
            deadline: target.deadline(),
        });
        Ok(Some(plan.travel_hours))
    }

    /// Re-allocates every snapshot candidate from live inventory and returns
    /// the best by (cost, live vehicle count, support id).
    ///
    /// Live inventory only shrinks within a round, so a candidate that failed
    /// against the snapshot cannot succeed here.
    fn rank_live<'e>(
        &self,
        evaluation: &'e ZoneEvaluation,
        target: &Zone,
    ) -> Result<Option<(&'e Candidate, Allocation)>> {
        let allocator = FleetAllocator::new(self.catalog);
        let mut live_candidates = Vec::with_capacity(evaluation.candidates.len());

        for candidate in &evaluation.candidates {
            let live = self
                .inventory
                .get(&candidate.support)
                .ok_or_else(|| DispatchError::UnknownZone(candidate.support.clone()))?;
            let usable = self.usable_fleet(live, target, &candidate.path)?;
            match allocator.allocate(target.demand(), &usable) {
                Ok(allocation) => live_candidates.push((candidate, allocation)),
                Err(shortfall) => {
                    debug!(
                        zone = %target.id(),
                        support = %candidate.support,
                        %shortfall,
                        "inventory taken earlier this round"
                    );
                }
            }
        }

        Ok(live_candidates.into_iter().min_by(|(a, a_alloc), (b, b_alloc)| {
            a.cost
                .total_cmp(&b.cost)
                .then_with(|| a_alloc.vehicle_count().cmp(&b_alloc.vehicle_count()))
                .then_with(|| a.support.cmp(&b.support))
        }))
    }

    fn replenish(&mut self) {
        for (support, live) in &mut self.inventory {
            if let Some(maximum) = self.baseline.get(support) {
                live.replenish_from(maximum);
            }
        }
        debug!(supports = self.inventory.len(), "inventories replenished");
    }

    fn reject(&mut self, zone: &ZoneId, reason: UnserviceableReason) {
        info!(zone = %zone, %reason, "unserviceable");
        self.unserviceable.push(Unserviceable {
            zone: zone.clone(),
            reason,
        });
    }

    fn settle(&mut self) {
        self.pending.clear();
        self.state = SchedulerState::Settled;
        info!(
            served = self.records.len(),
            unserviceable = self.unserviceable.len(),
            rounds = self.rounds,
            "dispatch settled"
        );
    }
}
