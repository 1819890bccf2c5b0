//! Run configuration.
//!
//! A [`RunConfig`] carries the two numbers that define a run, thread count and
//! iteration count, plus the knobs the harness exposes around them: the
//! optional per-increment yield, the sampling period, and the set of
//! disciplines to exercise.
//!
//! Invalid input is never fatal. [`RunConfig::resolve`] substitutes the
//! documented defaults (`threads = 3`, `iterations = 1_000_000`) and emits a
//! warning instead.

use std::time::Duration;

use tracing::warn;

use crate::discipline::Discipline;
use crate::error::{ConfigError, Result};

/// Default number of workers per discipline.
pub const DEFAULT_THREADS: usize = 3;

/// Default number of increments per worker.
pub const DEFAULT_ITERATIONS: u64 = 1_000_000;

/// Default interval between two sampler snapshots.
pub const DEFAULT_SAMPLE_PERIOD: Duration = Duration::from_millis(200);

/// Parameters of a single harness run.
///
/// # Examples
///
/// ```rust
/// use ordini::config::RunConfig;
/// use ordini::discipline::Discipline;
///
/// let config = RunConfig::new(4, 100)?
///     .with_yield_now(true)
///     .with_disciplines(&[Discipline::Mutex, Discipline::Relaxed])?;
///
/// assert_eq!(config.expected(), 400);
/// # Ok::<(), ordini::error::ConfigError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "RawRunConfig")
)]
pub struct RunConfig {
    threads: usize,
    iterations: u64,
    yield_now: bool,
    sample_period: Duration,
    disciplines: Vec<Discipline>,
}

impl RunConfig {
    /// Creates a configuration exercising every discipline.
    ///
    /// Both values must be strictly positive and their product must fit in
    /// a `u64`.
    pub fn new(threads: usize, iterations: u64) -> Result<Self> {
        if threads == 0 {
            return Err(ConfigError::NotPositive { flag: "threads" });
        }
        if iterations == 0 {
            return Err(ConfigError::NotPositive { flag: "iterations" });
        }
        (threads as u64)
            .checked_mul(iterations)
            .ok_or(ConfigError::Overflow {
                threads,
                iterations,
            })?;

        Ok(Self {
            threads,
            iterations,
            yield_now: false,
            sample_period: DEFAULT_SAMPLE_PERIOD,
            disciplines: Discipline::ALL.to_vec(),
        })
    }

    /// Resolves a configuration from raw command-line values.
    ///
    /// If either value is missing or invalid, both fall back to the defaults,
    /// a warning is logged, and the reason is returned alongside the config.
    ///
    /// ```rust
    /// use ordini::config::RunConfig;
    ///
    /// let (config, fallback) = RunConfig::resolve(Some("8"), None);
    /// assert!(fallback.is_some());
    /// assert_eq!(config.threads(), 3);
    /// assert_eq!(config.iterations(), 1_000_000);
    /// ```
    pub fn resolve(threads: Option<&str>, iterations: Option<&str>) -> (Self, Option<ConfigError>) {
        match Self::parse(threads, iterations) {
            Ok(config) => (config, None),
            Err(err) => {
                warn!(
                    error = %err,
                    threads = DEFAULT_THREADS,
                    iterations = DEFAULT_ITERATIONS,
                    "invalid run configuration, using defaults"
                );
                (Self::default(), Some(err))
            }
        }
    }

    fn parse(threads: Option<&str>, iterations: Option<&str>) -> Result<Self> {
        let threads = parse_flag("threads", threads)?;
        let iterations = parse_flag("iterations", iterations)?;
        let threads = usize::try_from(threads).map_err(|_| ConfigError::Overflow {
            threads: usize::MAX,
            iterations,
        })?;
        Self::new(threads, iterations)
    }

    /// Yield the processor after every increment.
    ///
    /// This is a scheduling hint that widens the interleaving of workers. It
    /// makes lost updates more likely on the unsynchronized counter and has
    /// no effect on correctness.
    pub fn with_yield_now(mut self, enabled: bool) -> Self {
        self.yield_now = enabled;
        self
    }

    /// Sets the interval between two sampler snapshots.
    pub fn with_sample_period(mut self, period: Duration) -> Self {
        self.sample_period = period;
        self
    }

    /// Restricts the run to the given disciplines.
    ///
    /// Duplicates are removed and the report order of [`Discipline::ALL`] is
    /// kept. An empty list is rejected.
    pub fn with_disciplines(mut self, disciplines: &[Discipline]) -> Result<Self> {
        let selected: Vec<Discipline> = Discipline::ALL
            .into_iter()
            .filter(|d| disciplines.contains(d))
            .collect();
        if selected.is_empty() {
            return Err(ConfigError::NoDisciplines);
        }
        self.disciplines = selected;
        Ok(self)
    }

    /// Workers spawned per discipline.
    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Increments performed by each worker.
    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    /// Whether workers yield after every increment.
    pub fn yield_now(&self) -> bool {
        self.yield_now
    }

    /// Interval between two sampler snapshots.
    pub fn sample_period(&self) -> Duration {
        self.sample_period
    }

    /// Disciplines exercised by the run, in report order.
    pub fn disciplines(&self) -> &[Discipline] {
        &self.disciplines
    }

    /// The value a perfectly synchronized counter reaches: `threads × iterations`.
    pub fn expected(&self) -> u64 {
        // Checked in `new`.
        self.threads as u64 * self.iterations
    }

    /// Total worker threads across all disciplines.
    pub fn worker_count(&self) -> usize {
        self.threads * self.disciplines.len()
    }
}

impl Default for RunConfig {
    /// `threads = 3`, `iterations = 1_000_000`, all disciplines.
    fn default() -> Self {
        Self {
            threads: DEFAULT_THREADS,
            iterations: DEFAULT_ITERATIONS,
            yield_now: false,
            sample_period: DEFAULT_SAMPLE_PERIOD,
            disciplines: Discipline::ALL.to_vec(),
        }
    }
}

/// Unvalidated wire form of a [`RunConfig`].
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawRunConfig {
    threads: usize,
    iterations: u64,
    yield_now: bool,
    sample_period: Duration,
    disciplines: Vec<Discipline>,
}

#[cfg(feature = "serde")]
impl TryFrom<RawRunConfig> for RunConfig {
    type Error = ConfigError;

    fn try_from(raw: RawRunConfig) -> Result<Self> {
        RunConfig::new(raw.threads, raw.iterations)?
            .with_yield_now(raw.yield_now)
            .with_sample_period(raw.sample_period)
            .with_disciplines(&raw.disciplines)
    }
}

fn parse_flag(flag: &'static str, raw: Option<&str>) -> Result<u64> {
    let raw = raw.ok_or(ConfigError::Missing { flag })?;
    let value = raw
        .trim()
        .replace('_', "")
        .parse::<u64>()
        .map_err(|source| ConfigError::Invalid {
            flag,
            value: raw.to_string(),
            source,
        })?;
    if value == 0 {
        return Err(ConfigError::NotPositive { flag });
    }
    Ok(value)
}
