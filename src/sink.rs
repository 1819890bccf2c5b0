//! Reporting sinks.
//!
//! The harness never prints on its own: intermediate snapshots and the final
//! [`Report`] go to a [`ReportSink`]. Two sinks ship with the crate:
//!
//! - [`Recorder`] keeps everything in memory, for tests and post-processing.
//! - [`ConsoleSink`] (feature `table`) renders with a table or JSON observer
//!   and writes to any `io::Write`.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::coordinator::Report;
use crate::snapshot::Snapshot;

#[cfg(feature = "table")]
pub use console::{ConsoleFormat, ConsoleSink};

/// Destination of the snapshots and of the final report of a run.
///
/// `sample` is called from the sampler thread while workers run; `report`
/// is called once, from the coordinating thread, after every worker joined.
pub trait ReportSink: Send + Sync {
    /// Receives an intermediate snapshot.
    fn sample(&self, snapshot: &Snapshot);

    /// Receives the final report.
    fn report(&self, report: &Report);
}

/// A sink that records every snapshot and the final report.
///
/// # Examples
///
/// ```rust
/// use ordini::config::RunConfig;
/// use ordini::coordinator::Coordinator;
/// use ordini::sink::Recorder;
///
/// let recorder = Recorder::new();
/// Coordinator::new(RunConfig::new(2, 10)?).run(&recorder);
///
/// let report = recorder.report().expect("final report");
/// assert_eq!(report.expected, 20);
/// # Ok::<(), ordini::error::ConfigError>(())
/// ```
#[derive(Debug, Default)]
pub struct Recorder {
    samples: Mutex<Vec<Snapshot>>,
    report: Mutex<Option<Report>>,
}

impl Recorder {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// The intermediate snapshots received so far, oldest first.
    pub fn samples(&self) -> Vec<Snapshot> {
        lock(&self.samples).clone()
    }

    /// The final report, if one was received.
    pub fn report(&self) -> Option<Report> {
        lock(&self.report).clone()
    }
}

impl ReportSink for Recorder {
    fn sample(&self, snapshot: &Snapshot) {
        lock(&self.samples).push(snapshot.clone());
    }

    fn report(&self, report: &Report) {
        *lock(&self.report) = Some(report.clone());
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(feature = "table")]
mod console {
    use std::io::Write;
    use std::sync::Mutex;

    use tracing::warn;

    use super::{lock, ReportSink};
    use crate::coordinator::Report;
    use crate::observers::table::TableObserver;
    use crate::observers::{ObserverError, Result};
    use crate::snapshot::Snapshot;

    #[cfg(feature = "json")]
    use crate::observers::json::JsonObserver;

    /// How a [`ConsoleSink`] renders snapshots and reports.
    #[derive(Debug, Clone)]
    pub enum ConsoleFormat {
        /// Tabular output.
        Table(TableObserver),
        /// One JSON document per snapshot or report.
        #[cfg(feature = "json")]
        Json(JsonObserver),
    }

    impl Default for ConsoleFormat {
        fn default() -> Self {
            ConsoleFormat::Table(TableObserver::new())
        }
    }

    impl ConsoleFormat {
        fn render(&self, snapshot: &Snapshot) -> Result<String> {
            match self {
                ConsoleFormat::Table(observer) => Ok(observer.render(snapshot)),
                #[cfg(feature = "json")]
                ConsoleFormat::Json(observer) => observer.to_json(snapshot),
            }
        }

        fn render_report(&self, report: &Report) -> Result<String> {
            match self {
                ConsoleFormat::Table(observer) => Ok(observer.render_report(report)),
                #[cfg(feature = "json")]
                ConsoleFormat::Json(observer) => observer.report_to_json(report),
            }
        }
    }

    /// A sink writing rendered snapshots and the final report to `W`.
    ///
    /// Rendering or write failures are logged and dropped: a broken console
    /// never aborts a run.
    ///
    /// ```rust,ignore
    /// use ordini::sink::{ConsoleFormat, ConsoleSink};
    ///
    /// let sink = ConsoleSink::new(std::io::stdout(), ConsoleFormat::default());
    /// ```
    #[derive(Debug)]
    pub struct ConsoleSink<W> {
        out: Mutex<W>,
        format: ConsoleFormat,
    }

    impl<W: Write + Send> ConsoleSink<W> {
        /// Creates a sink writing to `out`.
        pub fn new(out: W, format: ConsoleFormat) -> Self {
            Self {
                out: Mutex::new(out),
                format,
            }
        }

        /// Consumes the sink and returns the writer.
        pub fn into_inner(self) -> W {
            self.out
                .into_inner()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
        }

        /// Writes one rendered document followed by a newline, then flushes.
        pub fn write(&self, text: &str) -> Result<()> {
            let mut out = lock(&self.out);
            writeln!(out, "{}", text)?;
            out.flush()?;
            Ok(())
        }

        fn emit(&self, rendered: Result<String>) {
            if let Err(err) = rendered.and_then(|text| self.write(&text)) {
                let stage = if matches!(err, ObserverError::Io(_)) {
                    "write"
                } else {
                    "render"
                };
                warn!(error = %err, stage, "failed to emit counters");
            }
        }
    }

    impl<W: Write + Send> ReportSink for ConsoleSink<W> {
        fn sample(&self, snapshot: &Snapshot) {
            self.emit(self.format.render(snapshot));
        }

        fn report(&self, report: &Report) {
            self.emit(self.format.render_report(report));
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::discipline::Discipline;
        use crate::snapshot::CounterSample;

        #[test]
        fn test_sample_writes_table() {
            let sink = ConsoleSink::new(Vec::new(), ConsoleFormat::default());
            let snapshot = Snapshot::new(0, vec![CounterSample::new(Discipline::Mutex, 12)]);
            sink.sample(&snapshot);

            let out = String::from_utf8(sink.into_inner()).unwrap();
            assert!(out.contains("mutex"));
            assert!(out.contains("12"));
            assert!(out.ends_with('\n'));
        }

        struct Broken;

        impl Write for Broken {
            fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::other("closed"))
            }

            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        #[test]
        fn test_write_failure_is_observer_error() {
            let sink = ConsoleSink::new(Broken, ConsoleFormat::default());
            let err = sink.write("mutex 1").unwrap_err();
            assert!(matches!(err, ObserverError::Io(_)));
            assert_eq!(err.to_string(), "io error: closed");
        }

        #[test]
        fn test_write_failure_is_swallowed() {
            let sink = ConsoleSink::new(Broken, ConsoleFormat::default());
            sink.sample(&Snapshot::new(0, vec![]));
        }

        #[cfg(feature = "json")]
        #[test]
        fn test_sample_writes_json() {
            let sink = ConsoleSink::new(Vec::new(), ConsoleFormat::Json(JsonObserver::new()));
            let snapshot = Snapshot::new(3, vec![CounterSample::new(Discipline::Relaxed, 5)]);
            sink.sample(&snapshot);

            let out = String::from_utf8(sink.into_inner()).unwrap();
            assert!(out.contains(r#""discipline":"relaxed""#));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discipline::Discipline;
    use crate::snapshot::CounterSample;

    #[test]
    fn test_recorder_collects_samples_in_order() {
        let recorder = Recorder::new();
        for i in 0..3 {
            recorder.sample(&Snapshot::new(
                i,
                vec![CounterSample::new(Discipline::SeqCst, i * 10)],
            ));
        }
        let samples = recorder.samples();
        assert_eq!(samples.len(), 3);
        assert_eq!(samples[2].get(Discipline::SeqCst), Some(20));
        assert!(recorder.report().is_none());
    }
}
