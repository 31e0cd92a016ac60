//! Urgency-ordered, round-based dispatch.
//!
//! [`run_dispatch`] and its variants are the engine's entry points: one call
//! per algorithm and resource mode, no interactive I/O. [`DispatchScheduler`]
//! exposes the same run step by step.

mod config;
mod outcome;
mod scheduler;
mod sink;
mod urgency;

pub use config::{DispatchConfig, ResourceMode, UrgencyWeights};
pub use outcome::DispatchOutcome;
pub use scheduler::{DispatchScheduler, SchedulerState};
pub use sink::{JsonSink, MemorySink, RecordSink};
pub use urgency::{order_by_urgency, urgency};

use chrono::NaiveDateTime;

use crate::error::Result;
use crate::graph::ZoneGraph;
use crate::models::VehicleCatalog;
use crate::search::Algorithm;

/// Runs a full dispatch with the default configuration, starting the
/// simulated clock at `start`.
pub fn run_dispatch(
    graph: &ZoneGraph,
    catalog: &VehicleCatalog,
    algorithm: Algorithm,
    mode: ResourceMode,
    start: NaiveDateTime,
) -> Result<DispatchOutcome> {
    run_dispatch_with(
        graph,
        catalog,
        algorithm,
        mode,
        DispatchConfig::default().with_start_time(start),
    )
}

/// Runs a full dispatch with an explicit configuration.
///
/// Without `config.start_time` the clock starts at the current local time.
pub fn run_dispatch_with(
    graph: &ZoneGraph,
    catalog: &VehicleCatalog,
    algorithm: Algorithm,
    mode: ResourceMode,
    config: DispatchConfig,
) -> Result<DispatchOutcome> {
    DispatchScheduler::new(graph, catalog, algorithm, mode)
        .with_config(config)
        .run()
}

/// Runs a full dispatch selecting the algorithm and mode by name.
///
/// Fails with [`DispatchError::UnknownAlgorithm`](crate::DispatchError::UnknownAlgorithm)
/// or [`DispatchError::UnknownMode`](crate::DispatchError::UnknownMode)
/// before any work is done.
///
/// # Examples
///
/// ```
/// use relief_dispatch::dispatch::run_dispatch_named;
/// use relief_dispatch::graph::ZoneGraph;
/// use relief_dispatch::models::{parse_deadline, VehicleCatalog};
/// use relief_dispatch::DispatchError;
///
/// let g = ZoneGraph::undirected();
/// let catalog = VehicleCatalog::standard();
/// let start = parse_deadline("2024-11-20 08:00:00").unwrap();
///
/// let outcome = run_dispatch_named(&g, &catalog, "ucs", "bounded", start).unwrap();
/// assert!(outcome.records.is_empty());
///
/// let err = run_dispatch_named(&g, &catalog, "UCS", "forever", start).unwrap_err();
/// assert!(matches!(err, DispatchError::UnknownMode(_)));
/// ```
pub fn run_dispatch_named(
    graph: &ZoneGraph,
    catalog: &VehicleCatalog,
    algorithm: &str,
    mode: &str,
    start: NaiveDateTime,
) -> Result<DispatchOutcome> {
    let algorithm: Algorithm = algorithm.parse()?;
    let mode: ResourceMode = mode.parse()?;
    run_dispatch(graph, catalog, algorithm, mode, start)
}
