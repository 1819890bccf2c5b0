//! The counter bank: every shared counter of one run.
//!
//! A [`CounterBank`] is built by the coordinator with all counters at zero,
//! lent by shared reference to the workers and the sampler for the duration
//! of the run, and dropped after the final snapshot. There is no process-wide
//! state, so two runs never share a counter.

use std::fmt::Debug;
use std::time::Duration;

use crate::counters::Counter;
use crate::discipline::Discipline;
use crate::snapshot::{CounterSample, Snapshot};

/// One counter per discipline.
///
/// The bank always holds a counter for every discipline so that
/// [`increment`](CounterBank::increment) and [`load`](CounterBank::load) are
/// total. Only the configured disciplines appear in snapshots.
///
/// # Examples
///
/// ```rust
/// use ordini::bank::CounterBank;
/// use ordini::discipline::Discipline;
/// use std::time::Duration;
///
/// let bank = CounterBank::new(&[Discipline::Mutex, Discipline::Relaxed]);
/// bank.increment(Discipline::Mutex);
///
/// let snapshot = bank.snapshot(Duration::ZERO);
/// assert_eq!(snapshot.len(), 2);
/// assert_eq!(snapshot.get(Discipline::Mutex), Some(1));
/// assert_eq!(snapshot.get(Discipline::Relaxed), Some(0));
/// ```
pub struct CounterBank {
    counters: Vec<Box<dyn Counter>>,
    active: Vec<Discipline>,
}

impl CounterBank {
    /// Creates a bank whose snapshots cover `disciplines`, all counters at zero.
    pub fn new(disciplines: &[Discipline]) -> Self {
        Self {
            counters: Discipline::ALL.into_iter().map(Discipline::counter).collect(),
            active: disciplines.to_vec(),
        }
    }

    /// The disciplines covered by snapshots.
    pub fn disciplines(&self) -> &[Discipline] {
        &self.active
    }

    /// The counter updated under `discipline`.
    #[inline]
    pub fn counter(&self, discipline: Discipline) -> &dyn Counter {
        self.counters[discipline.index()].as_ref()
    }

    /// Adds one to the counter of `discipline` using its update rule.
    #[inline]
    pub fn increment(&self, discipline: Discipline) {
        self.counter(discipline).increment();
    }

    /// Reads the counter of `discipline` using its load rule.
    #[inline]
    pub fn load(&self, discipline: Discipline) -> u64 {
        self.counter(discipline).value()
    }

    /// Reads every configured counter, one after the other.
    pub fn snapshot(&self, elapsed: Duration) -> Snapshot {
        let samples = self
            .active
            .iter()
            .map(|&d| CounterSample::new(d, self.load(d)))
            .collect();
        Snapshot::new(elapsed.as_millis() as u64, samples)
    }
}

impl Default for CounterBank {
    /// A bank covering every discipline.
    fn default() -> Self {
        Self::new(&Discipline::ALL)
    }
}

impl Debug for CounterBank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.active.iter().map(|&d| self.counter(d)))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_zero() {
        let bank = CounterBank::default();
        for d in Discipline::ALL {
            assert_eq!(bank.load(d), 0);
        }
    }

    #[test]
    fn test_increment_touches_one_counter() {
        let bank = CounterBank::default();
        bank.increment(Discipline::Release);
        bank.increment(Discipline::Release);
        for d in Discipline::ALL {
            let expected = if d == Discipline::Release { 2 } else { 0 };
            assert_eq!(bank.load(d), expected, "{}", d);
        }
    }

    #[test]
    fn test_counter_names_match_disciplines() {
        let bank = CounterBank::default();
        for d in Discipline::ALL {
            assert_eq!(bank.counter(d).name(), d.name());
        }
    }

    #[test]
    fn test_snapshot_covers_configured_disciplines_only() {
        let bank = CounterBank::new(&[Discipline::Unsynchronized, Discipline::Acquire]);
        bank.increment(Discipline::SeqCst);
        bank.increment(Discipline::Acquire);

        let snapshot = bank.snapshot(Duration::from_millis(1500));
        assert_eq!(snapshot.elapsed_ms, 1500);
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.get(Discipline::Unsynchronized), Some(0));
        assert_eq!(snapshot.get(Discipline::Acquire), Some(1));
        assert_eq!(snapshot.get(Discipline::SeqCst), None);
    }

    #[test]
    fn test_banks_are_independent() {
        let first = CounterBank::default();
        let second = CounterBank::default();
        first.increment(Discipline::Mutex);
        assert_eq!(first.load(Discipline::Mutex), 1);
        assert_eq!(second.load(Discipline::Mutex), 0);
    }

    #[test]
    fn test_debug() {
        let bank = CounterBank::new(&[Discipline::Mutex]);
        bank.increment(Discipline::Mutex);
        assert_eq!(format!("{:?}", bank), "[mutex{ 1 }]");
    }
}
