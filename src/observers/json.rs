//! JSON observer for serializing snapshots and reports.
//!
//! This module provides [`JsonObserver`], which serializes a [`Snapshot`] or a
//! final [`Report`] with serde. One document is produced per call, so a
//! stream of samples is naturally newline-delimited JSON.
//!
//! # Feature Flag
//!
//! This module requires the `json` feature:
//!
//! ```toml
//! [dependencies]
//! ordini = { version = "0.1", features = ["json"] }
//! ```
//!
//! # Examples
//!
//! ```rust,ignore
//! use ordini::observers::json::JsonObserver;
//!
//! let json = JsonObserver::new().to_json(&snapshot)?;
//! // {"elapsed_ms":200,"samples":[{"discipline":"unsynchronized","value":512331},...]}
//!
//! let json = JsonObserver::new().pretty(true).report_to_json(&report)?;
//! ```

use serde::Serialize;

use crate::coordinator::{Outcome, Report};
use crate::discipline::Discipline;
use crate::observers::Result;
use crate::snapshot::Snapshot;

#[derive(Debug, Clone, Default)]
struct Encoding {
    pretty: bool,
    // Adds a wall-clock `timestamp_ms` to every document.
    include_timestamp: bool,
}

/// A snapshot document, optionally stamped with wall-clock time.
#[derive(Serialize)]
struct SnapshotDocument<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp_ms: Option<u64>,
    #[serde(flatten)]
    snapshot: &'a Snapshot,
}

/// Flat representation of a final report.
#[derive(Serialize)]
struct ReportDocument<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp_ms: Option<u64>,
    threads: usize,
    iterations: u64,
    yield_now: bool,
    expected: u64,
    elapsed_ms: u64,
    samples: usize,
    disciplines: &'a [Discipline],
    outcomes: Vec<Outcome>,
    consistent: bool,
}

/// An observer that serializes snapshots and reports to JSON.
///
/// # Examples
///
/// ```rust,ignore
/// use ordini::observers::json::JsonObserver;
///
/// let observer = JsonObserver::new().pretty(true).include_timestamp(true);
/// println!("{}", observer.report_to_json(&report)?);
/// ```
#[derive(Debug, Clone, Default)]
pub struct JsonObserver {
    encoding: Encoding,
}

impl JsonObserver {
    /// Creates a new JSON observer with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables pretty-printing.
    pub fn pretty(mut self, enabled: bool) -> Self {
        self.encoding.pretty = enabled;
        self
    }

    /// Enables or disables the wall-clock timestamp.
    pub fn include_timestamp(mut self, enabled: bool) -> Self {
        self.encoding.include_timestamp = enabled;
        self
    }

    fn timestamp(&self) -> Option<u64> {
        self.encoding.include_timestamp.then(current_timestamp_ms)
    }

    fn encode<T: Serialize>(&self, value: &T) -> Result<String> {
        let json = if self.encoding.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        Ok(json)
    }

    /// Serializes a snapshot to a JSON string.
    pub fn to_json(&self, snapshot: &Snapshot) -> Result<String> {
        self.encode(&SnapshotDocument {
            timestamp_ms: self.timestamp(),
            snapshot,
        })
    }

    /// Serializes a final report to a JSON string.
    ///
    /// The document carries the run parameters, the expected count and one
    /// outcome per discipline with its observed value and lost increments.
    pub fn report_to_json(&self, report: &Report) -> Result<String> {
        let outcomes = report.outcomes();
        let consistent = !outcomes.iter().any(Outcome::is_violation);
        self.encode(&ReportDocument {
            timestamp_ms: self.timestamp(),
            threads: report.config.threads(),
            iterations: report.config.iterations(),
            yield_now: report.config.yield_now(),
            expected: report.expected,
            elapsed_ms: report.elapsed.as_millis() as u64,
            samples: report.samples,
            disciplines: report.config.disciplines(),
            outcomes,
            consistent,
        })
    }
}

/// Returns the current timestamp in milliseconds since Unix epoch.
fn current_timestamp_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
