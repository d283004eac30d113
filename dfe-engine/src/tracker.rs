// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Define the [`Track`] trait and a number of trackers.
//!
//! A tracker is handed every [`SymbolRecord`] produced by a simulation run.
//! Trackers only observe; they cannot influence adaptation.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::simulation::SymbolRecord;
use crate::types::{SimError, SimResult};

/// Destination for text trackers.
pub type Writer = Box<dyn Write + Send>;

/// A tracker that can be attached to a simulation.
pub type Tracker = Box<dyn Track + Send>;

/// This is the interface that is supported by all trackers.
pub trait Track {
    /// Record one simulated symbol.
    fn symbol(&mut self, record: &SymbolRecord) -> SimResult;

    /// Called at the end of each run. Buffered output must be flushed.
    fn shutdown(&mut self) -> SimResult;
}

/// A tracker that does nothing.
///
/// This can be useful for benchmarks that want to have minimum overheads.
pub struct DevNullTracker;

impl Track for DevNullTracker {
    fn symbol(&mut self, _record: &SymbolRecord) -> SimResult {
        Ok(())
    }
    fn shutdown(&mut self) -> SimResult {
        Ok(())
    }
}

/// A simple text tracker writing one line per symbol.
pub struct TextTracker {
    writer: Writer,
}

impl TextTracker {
    /// Create a new [`TextTracker`] writing to `writer`.
    pub fn new(writer: Writer) -> Self {
        Self { writer }
    }
}

fn io_error(e: std::io::Error) -> SimError {
    SimError::Configuration(format!("Tracker write failed: {e}"))
}

impl Track for TextTracker {
    fn symbol(&mut self, record: &SymbolRecord) -> SimResult {
        let taps = record
            .taps
            .iter()
            .map(|c| format!("{c:.4}"))
            .collect::<Vec<_>>()
            .join(", ");
        writeln!(
            self.writer,
            "{}: tx {} sample {:.4} rx {} error {} mode {} adapted {} taps [{taps}]",
            record.index,
            record.tx,
            record.sample,
            record.decision.symbol,
            record.decision.error,
            record.speculation,
            record.decision.adapted,
        )
        .map_err(io_error)
    }

    fn shutdown(&mut self) -> SimResult {
        self.writer.flush().map_err(io_error)
    }
}

/// Create a text tracker that writes to a new file at `path`.
pub fn build_file_tracker(path: &Path) -> Result<Tracker, SimError> {
    let file = fs::File::create(path).map_err(|e| {
        SimError::Configuration(format!("Unable to create {}: {e}", path.display()))
    })?;
    Ok(Box::new(TextTracker::new(Box::new(BufWriter::new(file)))))
}

/// Create a tracker that discards everything.
#[must_use]
pub fn dev_null_tracker() -> Tracker {
    Box::new(DevNullTracker)
}
