//! Shared counters, one per synchronization discipline.
//!
//! Every counter implements [`Counter`], so the rest of the harness can drive
//! and observe them through `&dyn Counter` without knowing which rule sits
//! behind `increment()`.
//!
//! | Type | Discipline | Increment |
//! |------|------------|-----------|
//! | [`Racy`] | unsynchronized | relaxed load, then relaxed store of `value + 1` |
//! | [`Locked`] | mutex | `*guard += 1` under a `std::sync::Mutex` |
//! | [`Ordered`] | atomic | `fetch_add(1, order)` with a fixed `order` |
//!
//! # Layout
//!
//! Each counter keeps its value in a [`crossbeam_utils::CachePadded`] cell,
//! so counters of different disciplines never share a cache line. Contention
//! observed on one counter therefore comes from its own writers only.
//!
//! ```text
//!   workers (unsynchronized) ──► [ Racy    ] ░░░░ padding ░░░░
//!   workers (mutex)          ──► [ Locked  ] ░░░░ padding ░░░░
//!   workers (seq_cst)        ──► [ Ordered ] ░░░░ padding ░░░░
//!   ...                                │
//!                                      ▼
//!                             sampler reads value()
//! ```

mod locked;
mod ordered;
mod racy;

pub use locked::Locked;
pub use ordered::{load_ordering, Ordered};
pub use racy::Racy;

use std::fmt::{Debug, Display};

/// A shared counter updated under one synchronization discipline.
///
/// # Examples
///
/// ```rust
/// use ordini::counters::{Counter, Ordered};
///
/// let counter = Ordered::relaxed().with_name("hits");
/// counter.increment();
/// counter.increment();
///
/// let counter: &dyn Counter = &counter;
/// assert_eq!(counter.value(), 2);
/// assert_eq!(counter.to_string(), "hits:2");
/// ```
pub trait Counter: Debug + Send + Sync {
    /// Returns the label of this counter, or an empty string if unnamed.
    fn name(&self) -> &str;

    /// Adds one to the counter using this counter's update rule.
    fn increment(&self);

    /// Reads the current value using this counter's load rule.
    ///
    /// The read carries no freshness guarantee while writers are active.
    fn value(&self) -> u64;
}

impl Display for dyn Counter + '_ {
    /// Formats the counter as `name:value` if named, or just `value` otherwise.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if !self.name().is_empty() {
            write!(f, "{}:{}", self.name(), self.value())
        } else {
            write!(f, "{}", self.value())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dyn_format_unnamed() {
        let counter = Locked::new();
        counter.increment();
        assert_eq!(format!("{}", &counter as &dyn Counter), "1");
    }

    #[test]
    fn test_dyn_format_named() {
        let counter = Racy::new().with_name("plain");
        counter.increment();
        counter.increment();
        assert_eq!(format!("{}", &counter as &dyn Counter), "plain:2");
    }
}
