//! Destinations for settled dispatch results.

use std::io::Write;

use serde::Serialize;

use crate::error::Result;
use crate::models::{AssignmentRecord, Unserviceable};

/// Receives the records of a settled run.
pub trait RecordSink {
    /// Accepts one committed assignment.
    fn accept(&mut self, record: &AssignmentRecord) -> Result<()>;

    /// Accepts one zone that could not be served.
    fn reject(&mut self, zone: &Unserviceable) -> Result<()>;

    /// Called once after the last record.
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Collects records in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    /// Accepted assignments, in delivery order.
    pub records: Vec<AssignmentRecord>,
    /// Rejected zones, in delivery order.
    pub rejected: Vec<Unserviceable>,
    finished: bool,
}

impl MemorySink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether [`RecordSink::finish`] has been called.
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl RecordSink for MemorySink {
    fn accept(&mut self, record: &AssignmentRecord) -> Result<()> {
        self.records.push(record.clone());
        Ok(())
    }

    fn reject(&mut self, zone: &Unserviceable) -> Result<()> {
        self.rejected.push(zone.clone());
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.finished = true;
        Ok(())
    }
}

#[derive(Serialize)]
struct Document<'a> {
    assignments: &'a [AssignmentRecord],
    unserviceable: &'a [Unserviceable],
}

/// Buffers records and writes them as one pretty-printed JSON document on
/// [`finish`](RecordSink::finish).
///
/// # Examples
///
/// ```
/// use relief_dispatch::dispatch::{JsonSink, RecordSink};
/// use relief_dispatch::models::{Unserviceable, UnserviceableReason};
///
/// let mut sink = JsonSink::new(Vec::new());
/// sink.reject(&Unserviceable { zone: "N".into(), reason: UnserviceableReason::NoRoute }).unwrap();
/// sink.finish().unwrap();
///
/// let text = String::from_utf8(sink.into_inner()).unwrap();
/// assert!(text.contains("\"no_route\""));
/// ```
pub struct JsonSink<W: Write> {
    writer: W,
    records: Vec<AssignmentRecord>,
    rejected: Vec<Unserviceable>,
}

impl<W: Write> JsonSink<W> {
    /// Creates a sink writing to `writer`.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            records: Vec::new(),
            rejected: Vec::new(),
        }
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> RecordSink for JsonSink<W> {
    fn accept(&mut self, record: &AssignmentRecord) -> Result<()> {
        self.records.push(record.clone());
        Ok(())
    }

    fn reject(&mut self, zone: &Unserviceable) -> Result<()> {
        self.rejected.push(zone.clone());
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        let document = Document {
            assignments: &self.records,
            unserviceable: &self.rejected,
        };
        serde_json::to_writer_pretty(&mut self.writer, &document).map_err(std::io::Error::from)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}
