//! Atomic counters tagged with a memory ordering.
//!
//! [`Ordered`] increments with a single `fetch_add(1, order)`. The tag never
//! changes the arithmetic: every ordering yields the exact count. It only
//! decides which *other* memory operations become visible to a thread that
//! synchronizes with the increment, and a bare counter publishes nothing.

use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam_utils::CachePadded;

use crate::counters::Counter;

/// Returns the ordering used to read a counter incremented with `order`.
///
/// `Release` and `AcqRel` are not valid for a plain load, so they degrade to
/// the acquire half that a load can legally carry (`Relaxed` for `Release`).
pub const fn load_ordering(order: Ordering) -> Ordering {
    match order {
        Ordering::Release => Ordering::Relaxed,
        Ordering::AcqRel => Ordering::Acquire,
        other => other,
    }
}

/// An atomic counter incremented with a fixed memory ordering.
///
/// # Examples
///
/// ```rust
/// use ordini::counters::{Counter, Ordered};
/// use std::sync::atomic::Ordering;
///
/// let counter = Ordered::new(Ordering::Release);
/// counter.increment();
/// assert_eq!(counter.value(), 1);
/// assert_eq!(counter.order(), Ordering::Release);
/// ```
pub struct Ordered {
    name: &'static str,
    order: Ordering,
    value: CachePadded<AtomicU64>,
}

impl Ordered {
    /// Creates a counter initialized to zero that increments with `order`.
    pub const fn new(order: Ordering) -> Self {
        Ordered {
            name: "",
            order,
            value: CachePadded::new(AtomicU64::new(0)),
        }
    }

    /// Creates a sequentially consistent counter.
    pub const fn seq_cst() -> Self {
        Self::new(Ordering::SeqCst)
    }

    /// Creates a relaxed counter.
    pub const fn relaxed() -> Self {
        Self::new(Ordering::Relaxed)
    }

    /// Creates a counter incremented with release semantics.
    pub const fn release() -> Self {
        Self::new(Ordering::Release)
    }

    /// Creates a counter incremented with acquire semantics.
    pub const fn acquire() -> Self {
        Self::new(Ordering::Acquire)
    }

    /// Sets the name of this counter, returning `self` for method chaining.
    pub const fn with_name(self, name: &'static str) -> Self {
        Self { name, ..self }
    }

    /// The ordering used by `increment()`.
    pub const fn order(&self) -> Ordering {
        self.order
    }
}

impl Counter for Ordered {
    #[inline]
    fn name(&self) -> &str {
        self.name
    }

    #[inline]
    fn increment(&self) {
        self.value.fetch_add(1, self.order);
    }

    #[inline]
    fn value(&self) -> u64 {
        self.value.load(load_ordering(self.order))
    }
}

impl Default for Ordered {
    /// Creates a sequentially consistent counter with no name.
    fn default() -> Self {
        Self::seq_cst()
    }
}

impl Debug for Ordered {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}[{:?}]{{ {} }}", self.name, self.order, self.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    const ORDERS: [Ordering; 5] = [
        Ordering::SeqCst,
        Ordering::Relaxed,
        Ordering::Release,
        Ordering::Acquire,
        Ordering::AcqRel,
    ];

    #[test]
    fn test_load_ordering_is_valid_for_loads() {
        for order in ORDERS {
            let counter = Ordered::new(order);
            // Release/AcqRel loads would panic.
            assert_eq!(counter.value(), 0);
        }
        assert_eq!(load_ordering(Ordering::Release), Ordering::Relaxed);
        assert_eq!(load_ordering(Ordering::AcqRel), Ordering::Acquire);
        assert_eq!(load_ordering(Ordering::SeqCst), Ordering::SeqCst);
    }

    #[test]
    fn test_every_ordering_counts_exactly() {
        for order in ORDERS {
            let counter = Ordered::new(order);
            thread::scope(|s| {
                for _ in 0..4 {
                    s.spawn(|| {
                        for _ in 0..10_000 {
                            counter.increment();
                        }
                    });
                }
            });
            assert_eq!(counter.value(), 40_000, "ordering {:?}", order);
        }
    }

    #[test]
    fn test_constructors() {
        assert_eq!(Ordered::seq_cst().order(), Ordering::SeqCst);
        assert_eq!(Ordered::relaxed().order(), Ordering::Relaxed);
        assert_eq!(Ordered::release().order(), Ordering::Release);
        assert_eq!(Ordered::acquire().order(), Ordering::Acquire);
        assert_eq!(Ordered::default().order(), Ordering::SeqCst);
    }

    #[test]
    fn test_debug() {
        let counter = Ordered::acquire().with_name("acquire");
        counter.increment();
        assert_eq!(format!("{:?}", counter), "acquire[Acquire]{ 1 }");
    }
}
