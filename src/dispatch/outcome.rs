//! Result of a settled dispatch run.

use chrono::NaiveDateTime;
use serde::Serialize;

use super::config::ResourceMode;
use super::sink::RecordSink;
use crate::error::Result;
use crate::models::{AssignmentRecord, Unserviceable, ZoneId};
use crate::search::Algorithm;

/// Everything a run produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatchOutcome {
    /// Search strategy used for every candidate.
    pub algorithm: Algorithm,
    /// Inventory behaviour.
    pub mode: ResourceMode,
    /// Committed assignments in commit order.
    pub records: Vec<AssignmentRecord>,
    /// Zones left unserved, in urgency order.
    pub unserviceable: Vec<Unserviceable>,
    /// Rounds executed.
    pub rounds: usize,
    /// Simulated clock when the run started.
    pub started_at: NaiveDateTime,
    /// Simulated clock when the run settled.
    pub finished_at: NaiveDateTime,
}

impl DispatchOutcome {
    /// The assignment serving `zone`, if any.
    pub fn record_for(&self, zone: &str) -> Option<&AssignmentRecord> {
        self.records.iter().find(|r| r.destination.as_str() == zone)
    }

    /// Returns `true` if `zone` was left unserved.
    pub fn is_unserviceable(&self, zone: &str) -> bool {
        self.unserviceable.iter().any(|u| u.zone.as_str() == zone)
    }

    /// Ids of served zones in commit order.
    pub fn served(&self) -> impl Iterator<Item = &ZoneId> {
        self.records.iter().map(|r| &r.destination)
    }

    /// Returns `true` if every zone in need was served.
    pub fn is_complete(&self) -> bool {
        self.unserviceable.is_empty()
    }

    /// Records that arrived after the destination's deadline.
    pub fn late(&self) -> impl Iterator<Item = &AssignmentRecord> {
        self.records
            .iter()
            .filter(|r| r.meets_deadline() == Some(false))
    }

    /// Feeds every record to `sink`, then finishes it.
    pub fn drain_into<S: RecordSink + ?Sized>(&self, sink: &mut S) -> Result<()> {
        for record in &self.records {
            sink.accept(record)?;
        }
        for zone in &self.unserviceable {
            sink.reject(zone)?;
        }
        sink.finish()
    }
}
