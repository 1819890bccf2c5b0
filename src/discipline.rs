//! Synchronization disciplines exercised by the harness.
//!
//! A [`Discipline`] names the rule used to update one shared counter. The
//! whole harness is driven by the declarative list [`Discipline::ALL`]: the
//! worker group, the sampler and every observer iterate it uniformly instead
//! of carrying a hand-written block per counter.
//!
//! | Discipline | Update rule | Final value |
//! |------------|-------------|-------------|
//! | `unsynchronized` | load, add one, store | `<= threads × iterations` |
//! | `mutex` | read-modify-write under a lock | exact |
//! | `seq_cst` | `fetch_add(1, SeqCst)` | exact |
//! | `relaxed` | `fetch_add(1, Relaxed)` | exact |
//! | `release` | `fetch_add(1, Release)` | exact |
//! | `acquire` | `fetch_add(1, Acquire)` | exact |
//!
//! Every atomic discipline reaches the exact count: a read-modify-write is
//! atomic whatever its ordering tag. The tag only constrains how *other*
//! memory operations become visible around the increment, and a bare counter
//! publishes nothing else.

use std::fmt::{self, Display};
use std::str::FromStr;
use std::sync::atomic::Ordering;

use crate::counters::{Counter, Locked, Ordered, Racy};
use crate::error::ConfigError;

/// A synchronization strategy applied to a counter's increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum Discipline {
    /// Plain load and store with no exclusion. Loses updates under contention.
    Unsynchronized,
    /// Read-modify-write performed while holding a mutex.
    Mutex,
    /// Atomic fetch-and-add with `Ordering::SeqCst`.
    SeqCst,
    /// Atomic fetch-and-add with `Ordering::Relaxed`.
    Relaxed,
    /// Atomic fetch-and-add with `Ordering::Release`.
    Release,
    /// Atomic fetch-and-add with `Ordering::Acquire`.
    Acquire,
}

impl Discipline {
    /// Every discipline, in report order.
    pub const ALL: [Discipline; 6] = [
        Discipline::Unsynchronized,
        Discipline::Mutex,
        Discipline::SeqCst,
        Discipline::Relaxed,
        Discipline::Release,
        Discipline::Acquire,
    ];

    /// Stable label used in reports and on the command line.
    pub const fn name(self) -> &'static str {
        match self {
            Discipline::Unsynchronized => "unsynchronized",
            Discipline::Mutex => "mutex",
            Discipline::SeqCst => "seq_cst",
            Discipline::Relaxed => "relaxed",
            Discipline::Release => "release",
            Discipline::Acquire => "acquire",
        }
    }

    /// The memory order tag of an atomic discipline.
    ///
    /// Returns `None` for the unsynchronized and mutex disciplines, which do
    /// not increment through a single atomic read-modify-write.
    pub const fn ordering(self) -> Option<Ordering> {
        match self {
            Discipline::Unsynchronized | Discipline::Mutex => None,
            Discipline::SeqCst => Some(Ordering::SeqCst),
            Discipline::Relaxed => Some(Ordering::Relaxed),
            Discipline::Release => Some(Ordering::Release),
            Discipline::Acquire => Some(Ordering::Acquire),
        }
    }

    /// Whether the final value is guaranteed to equal the number of increments.
    pub const fn is_exact(self) -> bool {
        !matches!(self, Discipline::Unsynchronized)
    }

    /// Position of this discipline in [`Discipline::ALL`].
    pub(crate) const fn index(self) -> usize {
        self as usize
    }

    /// Builds a zeroed counter implementing this discipline's update rule.
    pub fn counter(self) -> Box<dyn Counter> {
        let name = self.name();
        match self {
            Discipline::Unsynchronized => Box::new(Racy::new().with_name(name)),
            Discipline::Mutex => Box::new(Locked::new().with_name(name)),
            Discipline::SeqCst => Box::new(Ordered::seq_cst().with_name(name)),
            Discipline::Relaxed => Box::new(Ordered::relaxed().with_name(name)),
            Discipline::Release => Box::new(Ordered::release().with_name(name)),
            Discipline::Acquire => Box::new(Ordered::acquire().with_name(name)),
        }
    }
}

impl Display for Discipline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Discipline {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim().to_ascii_lowercase().replace('-', "_");
        Discipline::ALL
            .into_iter()
            .find(|d| d.name() == label)
            .ok_or_else(|| ConfigError::UnknownDiscipline(s.to_string()))
    }
}
