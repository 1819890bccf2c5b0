//! Periodic sampling of the counter bank while workers run.
//!
//! The [`Sampler`] takes a [`Snapshot`](crate::snapshot::Snapshot) of every
//! configured counter once per period and forwards it to a
//! [`ReportSink`]. Its reads race with the workers' writes, so intermediate
//! values are illustrative only.
//!
//! Shutdown is cooperative. Instead of polling a boolean between sleeps, the
//! sampler waits on a [`StopSignal`] with a timeout equal to its period: a
//! stop request wakes it immediately, and once a stop is observed no further
//! snapshot is taken. Dropping the [`StopHandle`] stops the sampler as well.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::time::{Duration, Instant};

use tracing::debug;

use crate::bank::CounterBank;
use crate::sink::ReportSink;

/// Creates a connected stop handle and signal.
pub fn stop_signal() -> (StopHandle, StopSignal) {
    let (tx, rx) = mpsc::channel();
    (StopHandle(tx), StopSignal(rx))
}

/// The requesting side of a sampler stop.
#[derive(Debug)]
pub struct StopHandle(Sender<()>);

impl StopHandle {
    /// Asks the sampler to stop.
    pub fn stop(self) {
        // A gone receiver means the sampler has already exited.
        let _ = self.0.send(());
    }
}

/// The observing side of a sampler stop.
#[derive(Debug)]
pub struct StopSignal(Receiver<()>);

impl StopSignal {
    /// Returns `true` if a stop was requested or the handle was dropped.
    pub fn is_stopped(&self) -> bool {
        !matches!(self.0.try_recv(), Err(TryRecvError::Empty))
    }

    /// Waits up to `timeout` for a stop, returning `true` if one arrived.
    pub fn wait(&self, timeout: Duration) -> bool {
        !matches!(self.0.recv_timeout(timeout), Err(RecvTimeoutError::Timeout))
    }
}

/// Observer thread body reading the bank on a fixed period.
#[derive(Debug)]
pub struct Sampler<'a> {
    bank: &'a CounterBank,
    period: Duration,
    started: Instant,
}

impl<'a> Sampler<'a> {
    /// Creates a sampler over `bank`. Snapshot timestamps are relative to `started`.
    pub fn new(bank: &'a CounterBank, period: Duration, started: Instant) -> Self {
        Self {
            bank,
            period,
            started,
        }
    }

    /// Samples until `stop` fires and returns the number of snapshots taken.
    pub fn run(&self, sink: &dyn ReportSink, stop: StopSignal) -> usize {
        let mut taken = 0;
        while !stop.is_stopped() {
            sink.sample(&self.bank.snapshot(self.started.elapsed()));
            taken += 1;
            if stop.wait(self.period) {
                break;
            }
        }
        debug!(samples = taken, "sampler stopped");
        taken
    }
}
