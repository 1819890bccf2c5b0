//! Worker threads hammering the counters.
//!
//! For each discipline a [`WorkerGroup`] spawns `threads` workers, and each
//! worker calls `increment()` on that discipline's counter exactly
//! `iterations` times in a tight loop. Workers do not coordinate with each
//! other beyond what the counter's own discipline provides, and signal
//! completion simply by returning.
//!
//! Workers run on scoped threads, so they borrow the [`CounterBank`] owned by
//! the caller instead of sharing it through an `Arc`.

use std::panic;
use std::thread::{self, Scope, ScopedJoinHandle};

use crate::bank::CounterBank;
use crate::config::RunConfig;
use crate::counters::Counter;
use crate::discipline::Discipline;

/// The increment loop of a single worker.
///
/// With `yield_now` the worker gives up the processor after every increment,
/// which only widens the interleaving of workers.
#[inline]
pub fn work(counter: &dyn Counter, iterations: u64, yield_now: bool) {
    for _ in 0..iterations {
        counter.increment();
        if yield_now {
            thread::yield_now();
        }
    }
}

/// A set of running workers.
pub struct WorkerGroup<'scope> {
    handles: Vec<ScopedJoinHandle<'scope, ()>>,
}

impl<'scope> WorkerGroup<'scope> {
    /// Creates an empty group.
    pub fn new() -> Self {
        Self {
            handles: Vec::new(),
        }
    }

    /// Spawns `threads` workers incrementing `counter` `iterations` times each.
    pub fn spawn<'env>(
        &mut self,
        scope: &'scope Scope<'scope, 'env>,
        counter: &'env dyn Counter,
        threads: usize,
        iterations: u64,
        yield_now: bool,
    ) {
        self.handles.reserve(threads);
        for _ in 0..threads {
            self.handles
                .push(scope.spawn(move || work(counter, iterations, yield_now)));
        }
    }

    /// Spawns the workers of every configured discipline at once.
    pub fn spawn_all<'env>(
        scope: &'scope Scope<'scope, 'env>,
        bank: &'env CounterBank,
        config: &RunConfig,
    ) -> Self {
        let mut group = Self::new();
        for &discipline in config.disciplines() {
            group.spawn(
                scope,
                bank.counter(discipline),
                config.threads(),
                config.iterations(),
                config.yield_now(),
            );
        }
        group
    }

    /// Number of workers in the group.
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Returns `true` if the group has no worker.
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Blocks until every worker has terminated.
    ///
    /// Increments cannot fail, so a panicking worker is a bug: its panic is
    /// propagated to the caller once all other workers are joined.
    pub fn join(self) {
        let mut panicked = None;
        for handle in self.handles {
            if let Err(payload) = handle.join() {
                panicked.get_or_insert(payload);
            }
        }
        if let Some(payload) = panicked {
            panic::resume_unwind(payload);
        }
    }

    /// Runs `threads` workers on the counter of `discipline` and waits for them.
    ///
    /// ```rust
    /// use ordini::bank::CounterBank;
    /// use ordini::discipline::Discipline;
    /// use ordini::worker::WorkerGroup;
    ///
    /// let bank = CounterBank::default();
    /// WorkerGroup::run(&bank, Discipline::SeqCst, 4, 100, false);
    /// assert_eq!(bank.load(Discipline::SeqCst), 400);
    /// ```
    pub fn run(
        bank: &CounterBank,
        discipline: Discipline,
        threads: usize,
        iterations: u64,
        yield_now: bool,
    ) {
        thread::scope(|s| {
            let mut group = WorkerGroup::new();
            group.spawn(s, bank.counter(discipline), threads, iterations, yield_now);
            group.join();
        });
    }
}

impl Default for WorkerGroup<'_> {
    fn default() -> Self {
        Self::new()
    }
}
