//! The lock-protected counter.

use std::fmt::Debug;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crossbeam_utils::CachePadded;

use crate::counters::Counter;

/// A counter whose every read-modify-write runs under a mutex.
///
/// Updates are linearizable: the final value always equals the number of
/// increments performed. The guard is scoped to the update, so the lock is
/// released on every exit path, unwinding included.
///
/// # Examples
///
/// ```rust
/// use ordini::counters::{Counter, Locked};
/// use std::thread;
///
/// let counter = Locked::new();
/// thread::scope(|s| {
///     for _ in 0..4 {
///         s.spawn(|| {
///             for _ in 0..1000 {
///                 counter.increment();
///             }
///         });
///     }
/// });
/// assert_eq!(counter.value(), 4000);
/// ```
pub struct Locked {
    name: &'static str,
    value: CachePadded<Mutex<u64>>,
}

impl Locked {
    /// Creates a new counter initialized to zero.
    pub const fn new() -> Self {
        Locked {
            name: "",
            value: CachePadded::new(Mutex::new(0)),
        }
    }

    /// Sets the name of this counter, returning `self` for method chaining.
    pub const fn with_name(self, name: &'static str) -> Self {
        Self { name, ..self }
    }

    /// Acquires the lock.
    ///
    /// A poisoned lock is recovered: the protected `u64` is written in a
    /// single store and can never be observed half-updated.
    #[inline]
    fn lock(&self) -> MutexGuard<'_, u64> {
        self.value.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Counter for Locked {
    #[inline]
    fn name(&self) -> &str {
        self.name
    }

    #[inline]
    fn increment(&self) {
        let mut guard = self.lock();
        *guard = guard.wrapping_add(1);
    }

    #[inline]
    fn value(&self) -> u64 {
        *self.lock()
    }
}

impl Default for Locked {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for Locked {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{{ {} }}", self.name, self.value())
    }
}
