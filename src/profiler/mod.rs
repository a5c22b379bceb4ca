//! Call-timing instrumentation
//!
//! Records how much wall time designated operations consume across a run.
//! Instrumentation is plain composition: a wrapper type implements the same
//! trait as its delegate and records elapsed time around each call (see
//! [`TimedFetcher`]). The collected state can be written out as a small
//! per-operation report.

mod timed;

pub use timed::TimedFetcher;

use chrono::{DateTime, Local};
use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Accumulated timings for one operation
#[derive(Debug, Clone, Copy, Default)]
pub struct OperationTiming {
    /// How many times the operation was invoked
    pub calls: u64,

    /// Total elapsed wall time across all invocations
    pub total: Duration,
}

/// Shared accumulator of operation timings
///
/// Wrappers record into this from any task; the report is read once at the
/// end of the run.
#[derive(Debug, Default)]
pub struct ProfilingState {
    records: Mutex<BTreeMap<String, OperationTiming>>,
}

impl ProfilingState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one invocation of `operation` that took `elapsed`
    pub fn record(&self, operation: &str, elapsed: Duration) {
        let mut records = self.records.lock().unwrap();
        let timing = records.entry(operation.to_string()).or_default();
        timing.calls += 1;
        timing.total += elapsed;
    }

    /// Returns the accumulated timing for one operation, if any was recorded
    pub fn timing(&self, operation: &str) -> Option<OperationTiming> {
        self.records.lock().unwrap().get(operation).copied()
    }

    /// Writes one line per recorded operation
    fn write(&self, writer: &mut dyn Write) -> std::io::Result<()> {
        let records = self.records.lock().unwrap();
        for (operation, timing) in records.iter() {
            writeln!(
                writer,
                "{} called {} times, total duration {:?}",
                operation, timing.calls, timing.total
            )?;
        }
        Ok(())
    }
}

/// Collects operation timings for one run and writes the report
pub struct Profiler {
    state: Arc<ProfilingState>,
    started_at: DateTime<Local>,
}

impl Profiler {
    pub fn new() -> Self {
        Self {
            state: Arc::new(ProfilingState::new()),
            started_at: Local::now(),
        }
    }

    /// Handle to the shared timing state, for wrappers to record into
    pub fn state(&self) -> Arc<ProfilingState> {
        Arc::clone(&self.state)
    }

    /// Writes the profiling report to the given writer
    pub fn write_report(&self, writer: &mut dyn Write) -> std::io::Result<()> {
        writeln!(writer, "Run at {}", self.started_at.to_rfc2822())?;
        self.state.write(writer)?;
        writeln!(writer)?;
        Ok(())
    }

    /// Appends the profiling report to the file at `path`
    ///
    /// Existing report data in the file is preserved.
    pub fn write_report_to_path(&self, path: &Path) -> std::io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        self.write_report(&mut file)
    }
}

impl Default for Profiler {
    fn default() -> Self {
        Self::new()
    }
}
