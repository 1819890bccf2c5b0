//! The unsynchronized counter.
//!
//! [`Racy`] reproduces the classic `counter++` data race: an increment is a
//! load followed by a separate store, so two workers that load the same value
//! both store `value + 1` and one update is lost.
//!
//! A plain `u64` mutated from several threads is undefined behavior in Rust.
//! The race is instead expressed with a relaxed atomic load and a relaxed
//! atomic store: each access is well defined, but nothing makes the pair
//! atomic, which is exactly the lost-update window being demonstrated.

use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam_utils::CachePadded;

use crate::counters::Counter;

/// A counter whose increments are not atomic.
///
/// The final value after `n` concurrent increments is at most `n`, and under
/// contention usually less. Because a stale store can land after newer ones,
/// successive reads may even observe the value going backwards.
///
/// # Examples
///
/// Single-threaded use never loses an update:
///
/// ```rust
/// use ordini::counters::{Counter, Racy};
///
/// let counter = Racy::new();
/// for _ in 0..1000 {
///     counter.increment();
/// }
/// assert_eq!(counter.value(), 1000);
/// ```
pub struct Racy {
    name: &'static str,
    value: CachePadded<AtomicU64>,
}

impl Racy {
    /// Creates a new counter initialized to zero.
    pub const fn new() -> Self {
        Racy {
            name: "",
            value: CachePadded::new(AtomicU64::new(0)),
        }
    }

    /// Sets the name of this counter, returning `self` for method chaining.
    pub const fn with_name(self, name: &'static str) -> Self {
        Self { name, ..self }
    }
}

impl Counter for Racy {
    #[inline]
    fn name(&self) -> &str {
        self.name
    }

    /// Loads, adds one, and stores back with no exclusion in between.
    #[inline]
    fn increment(&self) {
        let current = self.value.load(Ordering::Relaxed);
        self.value.store(current.wrapping_add(1), Ordering::Relaxed);
    }

    #[inline]
    fn value(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }
}

impl Default for Racy {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for Racy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{{ {} }}", self.name, self.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let counter = Racy::new();
        assert_eq!(counter.value(), 0);
        assert_eq!(counter.name(), "");
    }

    #[test]
    fn test_increment_single_thread() {
        let counter = Racy::new();
        counter.increment();
        counter.increment();
        counter.increment();
        assert_eq!(counter.value(), 3);
    }

    #[test]
    fn test_multiple_threads_upper_bound() {
        use std::thread;

        let counter = Racy::new();
        thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    for _ in 0..10_000 {
                        counter.increment();
                    }
                });
            }
        });

        let value = counter.value();
        assert!(value >= 1);
        assert!(value <= 40_000);
    }

    #[test]
    fn test_with_name() {
        let counter = Racy::new().with_name("racy");
        assert_eq!(counter.name(), "racy");
    }

    #[test]
    fn test_debug() {
        let counter = Racy::new().with_name("racy");
        counter.increment();
        assert_eq!(format!("{:?}", counter), "racy{ 1 }");
    }
}
